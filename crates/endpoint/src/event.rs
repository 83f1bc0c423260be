//! Relation lifecycle events.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{EndpointName, EventId, RelationId};

/// Lifecycle events delivered to a relation endpoint.
///
/// `Changed` carries the full current received map, not a delta; the
/// transport presents whatever the counterpart has published right now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelationEvent {
    /// A relation to a counterpart unit was established.
    Joined {
        event_id: EventId,
        endpoint: EndpointName,
        relation_id: RelationId,
        unit: String,
        timestamp: DateTime<Utc>,
    },
    /// The counterpart's published data changed.
    Changed {
        event_id: EventId,
        endpoint: EndpointName,
        relation_id: RelationId,
        received: BTreeMap<String, Value>,
        timestamp: DateTime<Utc>,
    },
    /// The relation was broken.
    Broken {
        event_id: EventId,
        endpoint: EndpointName,
        relation_id: RelationId,
        timestamp: DateTime<Utc>,
    },
}

impl RelationEvent {
    /// Create a new Joined event.
    pub fn joined(endpoint: EndpointName, relation_id: RelationId, unit: impl Into<String>) -> Self {
        Self::Joined {
            event_id: EventId::new(),
            endpoint,
            relation_id,
            unit: unit.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new Changed event carrying the current received data.
    pub fn changed(
        endpoint: EndpointName,
        relation_id: RelationId,
        received: BTreeMap<String, Value>,
    ) -> Self {
        Self::Changed {
            event_id: EventId::new(),
            endpoint,
            relation_id,
            received,
            timestamp: Utc::now(),
        }
    }

    /// Create a new Broken event.
    pub fn broken(endpoint: EndpointName, relation_id: RelationId) -> Self {
        Self::Broken {
            event_id: EventId::new(),
            endpoint,
            relation_id,
            timestamp: Utc::now(),
        }
    }

    /// Get the event ID.
    pub fn event_id(&self) -> EventId {
        match self {
            Self::Joined { event_id, .. }
            | Self::Changed { event_id, .. }
            | Self::Broken { event_id, .. } => *event_id,
        }
    }

    /// Get the endpoint name.
    pub fn endpoint(&self) -> &EndpointName {
        match self {
            Self::Joined { endpoint, .. }
            | Self::Changed { endpoint, .. }
            | Self::Broken { endpoint, .. } => endpoint,
        }
    }

    /// Get the relation ID.
    pub fn relation_id(&self) -> RelationId {
        match self {
            Self::Joined { relation_id, .. }
            | Self::Changed { relation_id, .. }
            | Self::Broken { relation_id, .. } => *relation_id,
        }
    }

    /// Get the timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Joined { timestamp, .. }
            | Self::Changed { timestamp, .. }
            | Self::Broken { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "joined",
            Self::Changed { .. } => "changed",
            Self::Broken { .. } => "broken",
        }
    }
}
