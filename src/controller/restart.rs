use std::sync::Arc;

use log::info;
use tokio::sync::watch;

/// Restart request flag shared between the web handler that sets it and the controller loop
/// that polls or awaits it. Clones share the same flag.
#[derive(Clone)]
pub struct RestartSignal {
    requested: Arc<watch::Sender<bool>>,
}

impl RestartSignal {
    pub fn new() -> Self {
        Self {
            requested: Arc::new(watch::channel(false).0),
        }
    }

    /// Request a restart. Setting an already set flag does nothing.
    pub fn set(&self) {
        if !self.requested.send_replace(true) {
            info!("Received a restart request");
        }
    }

    pub fn is_requested(&self) -> bool {
        *self.requested.borrow()
    }

    /// Wait until a restart is requested. Returns immediately if it already was.
    pub async fn wait_requested(&self) {
        let mut receiver = self.requested.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = receiver.wait_for(|requested| *requested).await;
    }
}

impl Default for RestartSignal {
    fn default() -> Self {
        Self::new()
    }
}
