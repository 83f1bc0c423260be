//! Relation data model and the single-relation slot.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::types::{Credentials, RelationId};

/// Key under which the counterpart delivers credentials.
pub const CREDENTIALS_KEY: &str = "credentials";

/// A framework-managed data channel to exactly one counterpart unit.
///
/// `received` holds data published by the counterpart; `to_publish` holds
/// data this side wants delivered to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    id: RelationId,
    counterpart: String,
    received: BTreeMap<String, Value>,
    to_publish: BTreeMap<String, Value>,
}

impl Relation {
    /// Create a new relation to the given counterpart unit.
    pub fn new(id: RelationId, counterpart: impl Into<String>) -> Self {
        Self {
            id,
            counterpart: counterpart.into(),
            received: BTreeMap::new(),
            to_publish: BTreeMap::new(),
        }
    }

    /// Get the relation ID.
    pub fn id(&self) -> RelationId {
        self.id
    }

    /// Get the counterpart unit name.
    pub fn counterpart(&self) -> &str {
        &self.counterpart
    }

    /// Borrow the received data.
    pub fn received(&self) -> &BTreeMap<String, Value> {
        &self.received
    }

    /// Replace the received data with a fresh snapshot from the transport.
    pub fn replace_received(&mut self, data: BTreeMap<String, Value>) {
        self.received = data;
    }

    /// Get the credentials value, if the counterpart delivered one.
    pub fn credentials(&self) -> Option<Credentials> {
        self.received
            .get(CREDENTIALS_KEY)
            .cloned()
            .map(Credentials::new)
    }

    /// Stage a value for delivery to the counterpart.
    pub fn publish(&mut self, key: impl Into<String>, value: Value) {
        self.to_publish.insert(key.into(), value);
    }

    /// Borrow the staged outbound data.
    pub fn to_publish(&self) -> &BTreeMap<String, Value> {
        &self.to_publish
    }
}

/// Shared holder for the single relation of an endpoint.
///
/// The dispatcher writes it on lifecycle events; the tracker only reads.
/// At most one relation may be installed at a time.
#[derive(Debug, Default)]
pub struct RelationSlot {
    inner: RwLock<Option<Relation>>,
}

impl RelationSlot {
    /// Create a new empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty slot wrapped in an Arc.
    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Install a relation.
    ///
    /// A repeat join for the same relation ID refreshes the counterpart
    /// name and keeps already-received data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RelationConflict`] if a different relation is
    /// already installed.
    pub async fn install(&self, relation: Relation) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner.as_mut() {
            None => {
                *inner = Some(relation);
                Ok(())
            }
            Some(existing) if existing.id() == relation.id() => {
                existing.counterpart = relation.counterpart;
                Ok(())
            }
            Some(existing) => Err(Error::relation_conflict(existing.id(), relation.id())),
        }
    }

    /// Replace the received data of the installed relation.
    ///
    /// Returns false if no relation is installed or the ID does not match.
    pub async fn update_received(
        &self,
        relation_id: RelationId,
        data: BTreeMap<String, Value>,
    ) -> bool {
        let mut inner = self.inner.write().await;
        match inner.as_mut() {
            Some(relation) if relation.id() == relation_id => {
                relation.replace_received(data);
                true
            }
            _ => false,
        }
    }

    /// Remove the installed relation.
    ///
    /// Returns false if no relation is installed or the ID does not match.
    pub async fn clear(&self, relation_id: RelationId) -> bool {
        let mut inner = self.inner.write().await;
        match inner.as_ref() {
            Some(relation) if relation.id() == relation_id => {
                *inner = None;
                true
            }
            _ => false,
        }
    }

    /// Whether a relation is installed.
    pub async fn is_installed(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Clone the installed relation, if any.
    pub async fn snapshot(&self) -> Option<Relation> {
        self.inner.read().await.clone()
    }

    /// Get the credentials of the installed relation, if any.
    pub async fn credentials(&self) -> Option<Credentials> {
        self.inner
            .read()
            .await
            .as_ref()
            .and_then(Relation::credentials)
    }

    /// Stage a value on the installed relation's outbound data.
    ///
    /// Returns false if no relation is installed.
    pub async fn publish(&self, key: impl Into<String>, value: Value) -> bool {
        let mut inner = self.inner.write().await;
        match inner.as_mut() {
            Some(relation) => {
                relation.publish(key, value);
                true
            }
            None => false,
        }
    }
}
