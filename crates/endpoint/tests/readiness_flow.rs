//! End-to-end readiness scenarios through the public API.
//!
//! Covers the full flag lifecycle: join, credential delivery, revocation,
//! and relation breakage, driven through the dispatcher the way a hosting
//! application would.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tether_endpoint::{
    EndpointName, Flag, RelationDispatcher, RelationEvent, RelationId, CREDENTIALS_KEY,
};

fn endpoint() -> EndpointName {
    EndpointName::new("openstack").unwrap()
}

fn with_credentials(value: Value) -> BTreeMap<String, Value> {
    BTreeMap::from([(CREDENTIALS_KEY.to_string(), value)])
}

#[tokio::test]
async fn fresh_endpoint_is_unjoined_and_not_ready() {
    let dispatcher = RelationDispatcher::new();
    let tracker = dispatcher.register(endpoint()).await.unwrap();

    assert!(!tracker.flags().is_set(Flag::Joined));
    assert!(!tracker.is_ready().await);
    assert!(tracker.credentials().await.is_none());
}

#[tokio::test]
async fn join_then_credentials_makes_ready() {
    let dispatcher = RelationDispatcher::new();
    let tracker = dispatcher.register(endpoint()).await.unwrap();
    let relation_id = RelationId::new();

    dispatcher
        .dispatch(RelationEvent::joined(endpoint(), relation_id, "integrator/0"))
        .await
        .unwrap();
    assert!(tracker.flags().is_set(Flag::Joined));
    assert!(!tracker.is_ready().await);

    dispatcher
        .dispatch(RelationEvent::changed(
            endpoint(),
            relation_id,
            with_credentials(json!("tok-123")),
        ))
        .await
        .unwrap();

    assert!(tracker.is_ready().await);
    assert!(tracker.flags().is_set(Flag::Ready));
    assert!(!tracker.flags().is_set(Flag::Changed));
    assert_eq!(
        tracker.credentials().await.unwrap().value(),
        &json!("tok-123")
    );
}

#[tokio::test]
async fn changed_without_credentials_key_stays_not_ready() {
    let dispatcher = RelationDispatcher::new();
    let tracker = dispatcher.register(endpoint()).await.unwrap();
    let relation_id = RelationId::new();

    dispatcher
        .dispatch(RelationEvent::joined(endpoint(), relation_id, "integrator/0"))
        .await
        .unwrap();
    dispatcher
        .dispatch(RelationEvent::changed(
            endpoint(),
            relation_id,
            BTreeMap::new(),
        ))
        .await
        .unwrap();

    assert!(!tracker.is_ready().await);
    assert!(!tracker.flags().is_set(Flag::Ready));
    assert!(!tracker.flags().is_set(Flag::Changed));
}

#[tokio::test]
async fn credential_revocation_drops_ready() {
    let dispatcher = RelationDispatcher::new();
    let tracker = dispatcher.register(endpoint()).await.unwrap();
    let relation_id = RelationId::new();

    dispatcher
        .dispatch(RelationEvent::joined(endpoint(), relation_id, "integrator/0"))
        .await
        .unwrap();
    dispatcher
        .dispatch(RelationEvent::changed(
            endpoint(),
            relation_id,
            with_credentials(json!({"auth_url": "https://keystone", "password": "s3cr3t"})),
        ))
        .await
        .unwrap();
    assert!(tracker.flags().is_set(Flag::Ready));

    dispatcher
        .dispatch(RelationEvent::changed(
            endpoint(),
            relation_id,
            with_credentials(json!("")),
        ))
        .await
        .unwrap();
    assert!(!tracker.flags().is_set(Flag::Ready));
}

#[tokio::test]
async fn broken_relation_drops_ready_despite_stale_credentials() {
    let dispatcher = RelationDispatcher::new();
    let tracker = dispatcher.register(endpoint()).await.unwrap();
    let relation_id = RelationId::new();

    dispatcher
        .dispatch(RelationEvent::joined(endpoint(), relation_id, "integrator/0"))
        .await
        .unwrap();
    dispatcher
        .dispatch(RelationEvent::changed(
            endpoint(),
            relation_id,
            with_credentials(json!("tok-123")),
        ))
        .await
        .unwrap();
    assert!(tracker.flags().is_set(Flag::Ready));

    dispatcher
        .dispatch(RelationEvent::broken(endpoint(), relation_id))
        .await
        .unwrap();

    assert!(!tracker.flags().is_set(Flag::Joined));
    assert!(!tracker.flags().is_set(Flag::Ready));
    assert!(!tracker.is_ready().await);
    assert!(tracker.credentials().await.is_none());
}

#[tokio::test]
async fn rejoin_after_break_recovers() {
    let dispatcher = RelationDispatcher::new();
    let tracker = dispatcher.register(endpoint()).await.unwrap();

    let first = RelationId::new();
    dispatcher
        .dispatch(RelationEvent::joined(endpoint(), first, "integrator/0"))
        .await
        .unwrap();
    dispatcher
        .dispatch(RelationEvent::broken(endpoint(), first))
        .await
        .unwrap();

    // A new relation may join once the first is gone.
    let second = RelationId::new();
    dispatcher
        .dispatch(RelationEvent::joined(endpoint(), second, "integrator/1"))
        .await
        .unwrap();
    dispatcher
        .dispatch(RelationEvent::changed(
            endpoint(),
            second,
            with_credentials(json!("tok-456")),
        ))
        .await
        .unwrap();

    assert!(tracker.is_ready().await);
    assert_eq!(
        tracker.credentials().await.unwrap().value(),
        &json!("tok-456")
    );
}

#[tokio::test]
async fn ready_edge_is_observable_by_subscribers() {
    let dispatcher = RelationDispatcher::new();
    let tracker = dispatcher.register(endpoint()).await.unwrap();
    let mut ready = tracker.flags().subscribe(Flag::Ready);
    let relation_id = RelationId::new();

    dispatcher
        .dispatch(RelationEvent::joined(endpoint(), relation_id, "integrator/0"))
        .await
        .unwrap();
    dispatcher
        .dispatch(RelationEvent::changed(
            endpoint(),
            relation_id,
            with_credentials(json!("tok-123")),
        ))
        .await
        .unwrap();

    ready.changed().await.unwrap();
    assert!(*ready.borrow());
}

#[tokio::test]
async fn publish_stages_request_data() {
    let dispatcher = RelationDispatcher::new();
    let tracker = dispatcher.register(endpoint()).await.unwrap();
    let relation_id = RelationId::new();

    dispatcher
        .dispatch(RelationEvent::joined(endpoint(), relation_id, "integrator/0"))
        .await
        .unwrap();
    tracker
        .publish("instance-labels", json!(["frontend", "staging"]))
        .await;

    let published = tracker.published().await;
    assert_eq!(
        published.get("instance-labels"),
        Some(&json!(["frontend", "staging"]))
    );
}

#[tokio::test]
async fn two_endpoints_track_independently() {
    let dispatcher = RelationDispatcher::new();
    let openstack = dispatcher.register(endpoint()).await.unwrap();
    let vault = dispatcher
        .register(EndpointName::new("vault").unwrap())
        .await
        .unwrap();

    let relation_id = RelationId::new();
    dispatcher
        .dispatch(RelationEvent::joined(endpoint(), relation_id, "integrator/0"))
        .await
        .unwrap();
    dispatcher
        .dispatch(RelationEvent::changed(
            endpoint(),
            relation_id,
            with_credentials(json!("tok-123")),
        ))
        .await
        .unwrap();

    assert!(openstack.is_ready().await);
    assert!(!vault.is_ready().await);
    assert!(!vault.flags().is_set(Flag::Joined));
}
