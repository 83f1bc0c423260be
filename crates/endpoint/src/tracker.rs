//! Readiness tracking over a single relation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::dispatch::EndpointHandler;
use crate::flags::FlagBoard;
use crate::relation::RelationSlot;
use crate::types::{Credentials, EndpointName, Flag};

/// Derives the `ready` flag for an endpoint from received relation data.
///
/// Readiness is a pure function of currently visible state, recomputed on
/// every `changed` signal: the relation must exist and its counterpart
/// must have delivered a non-empty credentials value.
#[derive(Debug)]
pub struct ReadinessTracker {
    endpoint: EndpointName,
    slot: Arc<RelationSlot>,
    flags: Arc<FlagBoard>,
}

impl ReadinessTracker {
    /// Create a tracker over a relation slot and flag board.
    ///
    /// Usually obtained from [`RelationDispatcher::register`]; construct
    /// directly when wiring a custom event loop.
    ///
    /// [`RelationDispatcher::register`]: crate::dispatch::RelationDispatcher::register
    pub fn new(endpoint: EndpointName, slot: Arc<RelationSlot>, flags: Arc<FlagBoard>) -> Self {
        Self {
            endpoint,
            slot,
            flags,
        }
    }

    /// Get the endpoint name.
    pub fn endpoint(&self) -> &EndpointName {
        &self.endpoint
    }

    /// Get the flag board, e.g. to subscribe to the `ready` edge.
    pub fn flags(&self) -> &FlagBoard {
        &self.flags
    }

    /// Whether the counterpart has delivered non-empty credentials.
    ///
    /// False when no relation exists; never an error.
    pub async fn is_ready(&self) -> bool {
        self.slot
            .credentials()
            .await
            .is_some_and(|creds| creds.is_present())
    }

    /// Get the received credentials value.
    ///
    /// None when no relation exists or the counterpart has not published
    /// the key. Meaningful only once the `ready` flag is set.
    pub async fn credentials(&self) -> Option<Credentials> {
        self.slot.credentials().await
    }

    /// Stage a value for delivery to the counterpart.
    ///
    /// A no-op (logged at warn level) when no relation exists.
    pub async fn publish(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if !self.slot.publish(key.clone(), value).await {
            warn!(
                endpoint = %self.endpoint,
                key,
                "publish with no relation, value dropped"
            );
        }
    }

    /// Snapshot of the data staged for the counterpart.
    ///
    /// Empty when no relation exists.
    pub async fn published(&self) -> BTreeMap<String, Value> {
        self.slot
            .snapshot()
            .await
            .map(|relation| relation.to_publish().clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EndpointHandler for ReadinessTracker {
    async fn on_changed(&self) {
        let ready = self.is_ready().await;
        debug!(endpoint = %self.endpoint, ready, "re-evaluating readiness");
        self.flags.toggle(Flag::Ready, ready);
        // The changed edge is consumed by this evaluation.
        self.flags.clear(Flag::Changed);
    }

    async fn on_not_joined(&self) {
        // Readiness cannot outlive the relation, even with stale data around.
        self.flags.clear(Flag::Ready);
    }
}
