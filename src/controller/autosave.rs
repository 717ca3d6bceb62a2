use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, info, warn};
use tokio::{task::JoinHandle, time::sleep};

use crate::controller::{
    SharedControllerPersist,
    persist::{self, PersistError},
    restart::RestartSignal,
};

/// Periodically write the controller state to `path` until `stop` is set, then save one last time.
/// The state is serialized while holding its lock; the file is written after the lock is released.
/// Unchanged state is not rewritten.
pub fn spawn_autosave(
    state: SharedControllerPersist,
    path: PathBuf,
    interval: Duration,
    stop: RestartSignal,
) -> JoinHandle<Result<(), PersistError>> {
    tokio::spawn(async move {
        let mut last_saved: Option<String> = None;

        loop {
            let stopping = tokio::select! {
                _ = sleep(interval) => false,
                _ = stop.wait_requested() => true,
            };

            let saved = save_if_changed(&state, &path, &mut last_saved).await;

            if stopping {
                info!("Autosave stopped, final save to {:?}", path);
                return saved;
            }
            if let Err(e) = saved {
                warn!("Failed to save controller state to {:?}: {e}", path);
            }
        }
    })
}

async fn save_if_changed(
    state: &SharedControllerPersist,
    path: &Path,
    last_saved: &mut Option<String>,
) -> Result<(), PersistError> {
    let content = state.lock().await.serialize()?;

    if last_saved.as_deref() == Some(content.as_str()) {
        debug!("Controller state unchanged, skipping save");
        return Ok(());
    }

    persist::write_atomic(path, &content)?;
    debug!("Saved controller state to {:?}", path);
    *last_saved = Some(content);

    Ok(())
}
