//! Cleanup configuration
//!
//! Defaults come from `dockbench_common::defaults` and are resolved once at
//! startup. Each resource kind gets a [`KindPolicy`] built from the config;
//! nothing downstream reads global state.

use crate::docker::DockerEndpoint;
use crate::error::ConfigError;
use crate::resource::KindPolicy;
use dockbench_common::defaults::{
    default_cleanup_threads, default_deletion_timeout_secs, default_list_attempts,
    default_max_attempts, default_poll_interval_ms,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration for a cleanup run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanupConfig {
    /// Budget for a single resource to disappear after its delete request
    #[serde(default = "default_deletion_timeout_secs")]
    pub deletion_timeout_secs: u64,

    /// Interval between deletion status checks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Concurrent delete workers per resource kind
    #[serde(default = "default_cleanup_threads")]
    pub cleanup_threads: usize,

    /// Delete attempts per resource, also the bound on failed status checks
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Attempts when listing a resource kind
    #[serde(default = "default_list_attempts")]
    pub list_attempts: u32,

    /// Docker endpoint (`unix:///path`, `tcp://host:port`, `http://host:port`)
    #[serde(default)]
    pub docker_host: Option<String>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            deletion_timeout_secs: default_deletion_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            cleanup_threads: default_cleanup_threads(),
            max_attempts: default_max_attempts(),
            list_attempts: default_list_attempts(),
            docker_host: None,
        }
    }
}

impl CleanupConfig {
    /// Load and validate a JSON config file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field for values cleanup cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deletion_timeout_secs == 0 {
            return Err(ConfigError::ZeroDeletionTimeout);
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.poll_interval_ms > self.deletion_timeout_secs.saturating_mul(1000) {
            return Err(ConfigError::PollIntervalTooLong {
                poll_ms: self.poll_interval_ms,
                timeout_secs: self.deletion_timeout_secs,
            });
        }
        if self.cleanup_threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.list_attempts == 0 {
            return Err(ConfigError::ZeroListAttempts);
        }
        if let Some(host) = &self.docker_host {
            if DockerEndpoint::parse(host).is_none() {
                return Err(ConfigError::InvalidDockerHost(host.clone()));
            }
        }
        Ok(())
    }

    /// Policy applied to every built-in resource kind
    pub fn kind_policy(&self) -> KindPolicy {
        KindPolicy {
            max_attempts: self.max_attempts,
            list_attempts: self.list_attempts,
            delete_timeout: Duration::from_secs(self.deletion_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            workers: self.cleanup_threads,
        }
    }

    /// Endpoint to connect to, falling back to the local defaults
    pub fn endpoint(&self) -> DockerEndpoint {
        self.docker_host
            .as_deref()
            .and_then(DockerEndpoint::parse)
            .unwrap_or(DockerEndpoint::Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CleanupConfig::default();
        assert_eq!(config.deletion_timeout_secs, 600);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.cleanup_threads, 20);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.list_attempts, 3);
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint(), DockerEndpoint::Local);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: CleanupConfig =
            serde_json::from_str(r#"{"cleanup_threads": 4, "docker_host": "tcp://10.0.0.5:2375"}"#)
                .unwrap();
        assert_eq!(config.cleanup_threads, 4);
        assert_eq!(config.deletion_timeout_secs, 600);
        assert_eq!(
            config.endpoint(),
            DockerEndpoint::Http("tcp://10.0.0.5:2375".to_string())
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<CleanupConfig, _> = serde_json::from_str(r#"{"threads": 4}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let cases: Vec<(CleanupConfig, &str)> = vec![
            (
                CleanupConfig {
                    deletion_timeout_secs: 0,
                    ..Default::default()
                },
                "deletion_timeout_secs",
            ),
            (
                CleanupConfig {
                    poll_interval_ms: 0,
                    ..Default::default()
                },
                "poll_interval_ms",
            ),
            (
                CleanupConfig {
                    cleanup_threads: 0,
                    ..Default::default()
                },
                "cleanup_threads",
            ),
            (
                CleanupConfig {
                    max_attempts: 0,
                    ..Default::default()
                },
                "max_attempts",
            ),
            (
                CleanupConfig {
                    list_attempts: 0,
                    ..Default::default()
                },
                "list_attempts",
            ),
        ];

        for (config, field) in cases {
            let err = config.validate().unwrap_err();
            assert!(
                err.to_string().contains(field),
                "expected error about {field}, got: {err}"
            );
        }
    }

    #[test]
    fn test_validate_poll_interval_within_timeout() {
        let config = CleanupConfig {
            deletion_timeout_secs: 1,
            poll_interval_ms: 5000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::PollIntervalTooLong { .. })
        ));
    }

    #[test]
    fn test_validate_docker_host() {
        let config = CleanupConfig {
            docker_host: Some("ftp://nope".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDockerHost(_))
        ));
    }

    #[test]
    fn test_kind_policy() {
        let config = CleanupConfig {
            deletion_timeout_secs: 30,
            poll_interval_ms: 250,
            cleanup_threads: 2,
            ..Default::default()
        };
        let policy = config.kind_policy();
        assert_eq!(policy.delete_timeout, Duration::from_secs(30));
        assert_eq!(policy.poll_interval, Duration::from_millis(250));
        assert_eq!(policy.workers, 2);
        assert_eq!(policy.max_attempts, 3);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_attempts": 5, "poll_interval_ms": 200}}"#).unwrap();

        let config = CleanupConfig::load(file.path()).unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.poll_interval_ms, 200);
    }

    #[test]
    fn test_load_errors() {
        let missing = CleanupConfig::load(Path::new("/nonexistent/dockbench.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let garbage = CleanupConfig::load(file.path());
        assert!(matches!(garbage, Err(ConfigError::Parse { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"cleanup_threads": 0}}"#).unwrap();
        let invalid = CleanupConfig::load(file.path());
        assert!(matches!(invalid, Err(ConfigError::ZeroThreads)));
    }
}
