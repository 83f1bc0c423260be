//! Relation endpoint with reactive readiness flags.
//!
//! An endpoint observes lifecycle events for a single relation to a
//! counterpart unit and publishes three boolean flags:
//!
//! - **`endpoint.{name}.joined`** — the relation is connected. Written by
//!   the dispatcher when the relation is established, cleared when it
//!   breaks.
//! - **`endpoint.{name}.ready`** — the counterpart has delivered a
//!   non-empty `credentials` value. Derived by the [`ReadinessTracker`]
//!   on every data change.
//! - **`endpoint.{name}.changed`** — data changed since the last
//!   evaluation. Set by the dispatcher, cleared by the tracker once
//!   consumed.
//!
//! # Example
//!
//! ```ignore
//! use tether_endpoint::{EndpointName, RelationDispatcher, RelationEvent, RelationId};
//! use std::collections::BTreeMap;
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = RelationDispatcher::new();
//!     let endpoint = EndpointName::new("openstack").unwrap();
//!     let tracker = dispatcher.register(endpoint.clone()).await.unwrap();
//!
//!     let relation_id = RelationId::new();
//!     dispatcher
//!         .dispatch(RelationEvent::joined(endpoint.clone(), relation_id, "integrator/0"))
//!         .await
//!         .unwrap();
//!
//!     let data = BTreeMap::from([("credentials".into(), "tok-123".into())]);
//!     dispatcher
//!         .dispatch(RelationEvent::changed(endpoint, relation_id, data))
//!         .await
//!         .unwrap();
//!
//!     assert!(tracker.is_ready().await);
//!     println!("credentials: {:?}", tracker.credentials().await);
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod dispatch;
pub mod error;
pub mod event;
pub mod flags;
pub mod relation;
pub mod tracker;
pub mod types;

// Re-export main types
pub use dispatch::{EndpointHandler, RelationDispatcher};
pub use error::{Error, Result};
pub use event::RelationEvent;
pub use flags::FlagBoard;
pub use relation::{Relation, RelationSlot, CREDENTIALS_KEY};
pub use tracker::ReadinessTracker;
pub use types::{Credentials, EndpointName, EventId, Flag, RelationId};
