/// Tracked file name state and its text encoding
pub mod controller_persist;

/// Storing persisted text blobs
pub mod persist;

/// Restart request flag
pub mod restart;

pub mod autosave;

use flexi_logger::{Duplicate, FileSpec, Logger};
use log::{info, warn};
use std::{
    path::Path,
    sync::{Arc, Once},
};
use tokio::sync::Mutex;

use crate::{bounded_set::BoundedSetError, controller::controller_persist::ControllerPersist};

/// Controller state behind the single lock every reader and writer must take
pub type SharedControllerPersist = Arc<Mutex<ControllerPersist>>;

static LOGGER_INIT: Once = Once::new();

/// Start file logging under `log_dir`, duplicated to stderr unless `disable_stdout`.
/// Only the first call in a process has any effect.
pub fn init_logging(log_dir: &Path, level: &str, disable_stdout: bool) {
    LOGGER_INIT.call_once(|| {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!("Failed to create log directory {:?}: {e}", log_dir);
            return;
        }

        let logger = match Logger::try_with_str(level) {
            Ok(logger) => logger.log_to_file(FileSpec::default().directory(log_dir)),
            Err(e) => {
                eprintln!("Invalid log specification '{level}': {e}");
                return;
            }
        };

        let logger = if disable_stdout {
            logger
        } else {
            logger.duplicate_to_stderr(Duplicate::Info)
        };

        if let Ok(handle) = logger.start() {
            // Keep the logger running for the rest of the process
            std::mem::forget(handle);
            info!("Logger initialized in {:?}", log_dir);
        }
    });
}

/// Load the stored controller state, or start fresh when there is none or it cannot be used.
pub fn load_or_fresh(path: &Path, max_tracked_files: usize) -> Result<ControllerPersist, BoundedSetError> {
    if !path.exists() {
        info!("No controller state at {:?}, starting fresh", path);
        return ControllerPersist::new(max_tracked_files);
    }

    match ControllerPersist::from_file(path, max_tracked_files) {
        Ok(persist) => Ok(persist),
        Err(e) => {
            warn!("Ignoring unusable controller state at {:?}: {e}", path);
            ControllerPersist::new(max_tracked_files)
        }
    }
}

/// Wrap a controller state for sharing with the autosave task
pub fn share(persist: ControllerPersist) -> SharedControllerPersist {
    Arc::new(Mutex::new(persist))
}
