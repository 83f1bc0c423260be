//! Event delivery to registered endpoints.
//!
//! [`RelationDispatcher`] is the in-process stand-in for the hosting
//! framework: it owns the relation slots, writes the framework-side flags
//! (`joined`, `changed`), and calls the registered handler for each event.
//! A host with its own event loop can skip it and drive an
//! [`EndpointHandler`] directly.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::event::RelationEvent;
use crate::flags::FlagBoard;
use crate::relation::{Relation, RelationSlot};
use crate::tracker::ReadinessTracker;
use crate::types::{EndpointName, Flag};

/// Callbacks an endpoint implements to react to relation signals.
#[async_trait]
pub trait EndpointHandler: Send + Sync {
    /// Relation data changed for this endpoint.
    async fn on_changed(&self);

    /// The relation is absent or no longer joined.
    async fn on_not_joined(&self);
}

struct Registration {
    slot: Arc<RelationSlot>,
    flags: Arc<FlagBoard>,
    handler: Arc<dyn EndpointHandler>,
}

/// Dispatches relation events to registered endpoints, one at a time.
pub struct RelationDispatcher {
    endpoints: RwLock<HashMap<EndpointName, Registration>>,
    // Serializes delivery: each event runs to completion before the next.
    delivery: Mutex<()>,
}

impl RelationDispatcher {
    /// Create a new dispatcher with no endpoints.
    pub fn new() -> Self {
        Self {
            endpoints: RwLock::new(HashMap::new()),
            delivery: Mutex::new(()),
        }
    }

    /// Register an endpoint and get its readiness tracker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EndpointAlreadyRegistered`] if the name is taken.
    pub async fn register(&self, endpoint: EndpointName) -> Result<Arc<ReadinessTracker>> {
        let mut endpoints = self.endpoints.write().await;
        if endpoints.contains_key(&endpoint) {
            return Err(Error::EndpointAlreadyRegistered(endpoint.to_string()));
        }

        let slot = RelationSlot::new_arc();
        let flags = Arc::new(FlagBoard::new(endpoint.clone()));
        let tracker = Arc::new(ReadinessTracker::new(
            endpoint.clone(),
            slot.clone(),
            flags.clone(),
        ));

        debug!(endpoint = %endpoint, "endpoint registered");
        endpoints.insert(
            endpoint,
            Registration {
                slot,
                flags,
                handler: tracker.clone(),
            },
        );
        Ok(tracker)
    }

    /// Deliver one event, running its handler to completion before the
    /// next dispatch proceeds.
    ///
    /// Events for unregistered endpoints or stale relation IDs are logged
    /// and ignored; only a conflicting join is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RelationConflict`] when a `Joined` event carries a
    /// different relation ID than the one already installed.
    pub async fn dispatch(&self, event: RelationEvent) -> Result<()> {
        let _serialized = self.delivery.lock().await;

        let (slot, flags, handler) = {
            let endpoints = self.endpoints.read().await;
            match endpoints.get(event.endpoint()) {
                Some(reg) => (reg.slot.clone(), reg.flags.clone(), reg.handler.clone()),
                None => {
                    warn!(
                        endpoint = %event.endpoint(),
                        event_type = event.event_type(),
                        "event for unregistered endpoint ignored"
                    );
                    return Ok(());
                }
            }
        };

        debug!(
            endpoint = %event.endpoint(),
            event_type = event.event_type(),
            relation_id = %event.relation_id(),
            "dispatching event"
        );

        match event {
            RelationEvent::Joined {
                relation_id, unit, ..
            } => {
                slot.install(Relation::new(relation_id, unit)).await?;
                flags.set(Flag::Joined);
            }
            RelationEvent::Changed {
                relation_id,
                received,
                ..
            } => {
                if !slot.update_received(relation_id, received).await {
                    warn!(
                        relation_id = %relation_id,
                        "changed event for unknown relation ignored"
                    );
                    return Ok(());
                }
                flags.set(Flag::Changed);
                handler.on_changed().await;
            }
            RelationEvent::Broken { relation_id, .. } => {
                if !slot.clear(relation_id).await {
                    warn!(
                        relation_id = %relation_id,
                        "broken event for unknown relation ignored"
                    );
                    return Ok(());
                }
                flags.clear(Flag::Joined);
                handler.on_not_joined().await;
            }
        }
        Ok(())
    }
}

impl Default for RelationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
