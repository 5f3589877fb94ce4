// src/state/store.rs

//! State Store - copy-on-write holder for the current [`ApplicationState`]
use std::sync::Arc;
use tokio::sync::watch;

use super::ApplicationState;
use crate::log_debug;

pub type StateReceiver = watch::Receiver<Arc<ApplicationState>>;

/// Every `set` swaps in a whole new snapshot; readers holding an older
/// `Arc` keep seeing the values they read.
#[derive(Debug, Clone)]
pub struct StateStore {
    sender: Arc<watch::Sender<Arc<ApplicationState>>>,
}

impl StateStore {
    pub fn new(initial: ApplicationState) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn get(&self) -> Arc<ApplicationState> {
        self.sender.borrow().clone()
    }

    pub fn set(&self, next: ApplicationState) {
        let next = Arc::new(next);
        self.sender.send_replace(next.clone());
        log_snapshot(&next);
    }

    /// Read-modify-write under the store's lock. `f` returns `None` to leave
    /// the current snapshot in place. Returns whether a new snapshot was stored.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&ApplicationState) -> Option<ApplicationState>,
    {
        let mut stored = None;
        self.sender.send_if_modified(|current| match f(current) {
            Some(next) => {
                let next = Arc::new(next);
                *current = next.clone();
                stored = Some(next);
                true
            }
            None => false,
        });

        // logged outside the channel lock
        match stored {
            Some(next) => {
                log_snapshot(&next);
                true
            }
            None => false,
        }
    }

    /// Receiver that wakes whenever a new snapshot is stored.
    pub fn subscribe(&self) -> StateReceiver {
        self.sender.subscribe()
    }
}

fn log_snapshot(state: &ApplicationState) {
    log_debug!("state -> {}", serde_json::to_string(state).unwrap_or_default());
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(ApplicationState::default())
    }
}
