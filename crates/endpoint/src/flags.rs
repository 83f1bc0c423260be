//! Per-endpoint flag board.
//!
//! An explicit state object the host passes around rather than a global
//! string-keyed flag store. Each flag sits behind a watch channel so
//! downstream logic can await edges instead of polling.

use tokio::sync::watch;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{EndpointName, Flag};

/// Boolean flag state for one endpoint.
///
/// Flag ownership: `joined` and `changed` are written by the dispatcher,
/// `ready` and the clearing of `changed` belong to the tracker.
#[derive(Debug)]
pub struct FlagBoard {
    endpoint: EndpointName,
    joined: watch::Sender<bool>,
    ready: watch::Sender<bool>,
    changed: watch::Sender<bool>,
}

impl FlagBoard {
    /// Create a flag board with all flags cleared.
    pub fn new(endpoint: EndpointName) -> Self {
        let (joined, _) = watch::channel(false);
        let (ready, _) = watch::channel(false);
        let (changed, _) = watch::channel(false);
        Self {
            endpoint,
            joined,
            ready,
            changed,
        }
    }

    /// Get the endpoint this board belongs to.
    pub fn endpoint(&self) -> &EndpointName {
        &self.endpoint
    }

    fn sender(&self, flag: Flag) -> &watch::Sender<bool> {
        match flag {
            Flag::Joined => &self.joined,
            Flag::Ready => &self.ready,
            Flag::Changed => &self.changed,
        }
    }

    /// Whether a flag is currently set.
    pub fn is_set(&self, flag: Flag) -> bool {
        *self.sender(flag).borrow()
    }

    /// Set a flag.
    pub fn set(&self, flag: Flag) {
        self.toggle(flag, true);
    }

    /// Clear a flag.
    pub fn clear(&self, flag: Flag) {
        self.toggle(flag, false);
    }

    /// Set a flag to an explicit value. Idempotent; watchers are only
    /// notified on an actual edge.
    pub fn toggle(&self, flag: Flag, value: bool) {
        let modified = self.sender(flag).send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
        if modified {
            debug!(
                flag = %flag.qualified(&self.endpoint),
                value,
                "flag toggled"
            );
        }
    }

    /// Subscribe to edges of a flag.
    pub fn subscribe(&self, flag: Flag) -> watch::Receiver<bool> {
        self.sender(flag).subscribe()
    }

    /// Wait until a flag holds the given value.
    ///
    /// Returns immediately if it already does.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the board is dropped while
    /// waiting.
    pub async fn wait(&self, flag: Flag, value: bool) -> Result<()> {
        let mut rx = self.subscribe(flag);
        rx.wait_for(|current| *current == value)
            .await
            .map_err(|_| Error::ChannelClosed)?;
        Ok(())
    }
}
