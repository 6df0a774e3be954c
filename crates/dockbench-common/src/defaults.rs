//! Default configuration values for cleanup
//!
//! These constants are resolved once into a `CleanupConfig` at startup and
//! threaded through to every resource kind from there.

/// Default wall-clock budget for a single resource to disappear after its
/// delete request succeeded (seconds)
pub const DEFAULT_DELETION_TIMEOUT_SECS: u64 = 600;

/// Default interval between deletion status checks (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default number of concurrent delete workers per resource kind
pub const DEFAULT_CLEANUP_THREADS: usize = 20;

/// Default number of delete attempts per resource
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default number of attempts when listing a resource kind
pub const DEFAULT_LIST_ATTEMPTS: u32 = 3;

// Serde default functions for struct field defaults

/// Returns the default deletion timeout
pub fn default_deletion_timeout_secs() -> u64 {
    DEFAULT_DELETION_TIMEOUT_SECS
}

/// Returns the default poll interval
pub fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Returns the default worker count
pub fn default_cleanup_threads() -> usize {
    DEFAULT_CLEANUP_THREADS
}

/// Returns the default delete attempts
pub fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Returns the default list attempts
pub fn default_list_attempts() -> u32 {
    DEFAULT_LIST_ATTEMPTS
}
