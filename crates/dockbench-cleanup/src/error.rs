//! Configuration-time errors
//!
//! Cleanup itself never fails: every error raised while a pass runs is
//! logged and counted. Only mistakes a caller can fix before starting a run
//! are returned as typed errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from building or querying the resource kind registry
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A kind with this name is already registered
    #[error("Resource kind '{0}' is already registered")]
    DuplicateKind(String),

    /// One or more requested kind names are not registered
    #[error("Unknown resource kinds: {}", .0.join(", "))]
    UnknownKinds(Vec<String>),
}

/// Errors from loading or validating a `CleanupConfig`
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("deletion_timeout_secs must be greater than zero")]
    ZeroDeletionTimeout,

    #[error("poll_interval_ms must be greater than zero")]
    ZeroPollInterval,

    #[error("poll_interval_ms ({poll_ms}ms) must not exceed deletion_timeout_secs ({timeout_secs}s)")]
    PollIntervalTooLong { poll_ms: u64, timeout_secs: u64 },

    #[error("cleanup_threads must be at least 1")]
    ZeroThreads,

    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("list_attempts must be at least 1")]
    ZeroListAttempts,

    #[error("docker_host '{0}' is not a unix socket path or http(s)/tcp URL")]
    InvalidDockerHost(String),

    #[error("Failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kinds_lists_names() {
        let err = RegistryError::UnknownKinds(vec!["volume".to_string(), "secret".to_string()]);
        assert_eq!(err.to_string(), "Unknown resource kinds: volume, secret");
    }

    #[test]
    fn duplicate_kind_display() {
        let err = RegistryError::DuplicateKind("image".to_string());
        assert_eq!(err.to_string(), "Resource kind 'image' is already registered");
    }
}
