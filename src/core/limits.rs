/// Capacity used by a bounded set when none is given
pub const DEFAULT_MAXLEN: usize = 10_000;

/// Shared bound on both tracked file name sets of a controller
pub const DEFAULT_MAX_TRACKED_FILES: usize = 10_000;

/// Seconds between two autosave passes
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// File the controller state is stored in when not configured otherwise
pub const DEFAULT_STATE_FILE: &str = "controller.persist";

/// Log level used when not configured otherwise
pub const DEFAULT_LOG_LEVEL: &str = "info";
