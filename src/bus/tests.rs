use serde_json::json;
use tokio::sync::mpsc;

use super::topic::Topic;
use super::{BusEvent, LocalBus, Subscription, TopicBus};

#[test]
fn test_topic_new() {
    let topic = Topic::new("appMessages");
    assert_eq!(topic.name, "appMessages");
    assert!(topic.is_empty());
}

#[test]
fn test_topic_subscribe_and_unsubscribe() {
    let mut topic = Topic::new("appMessages");
    let (tx, _rx) = mpsc::unbounded_channel();
    topic.subscribe("l1".to_string(), tx);
    assert!(topic.listeners.contains_key("l1"));

    assert!(topic.unsubscribe("l1"));
    assert!(!topic.unsubscribe("l1"));
    assert!(topic.is_empty());
}

#[test]
fn test_topic_deliver_detaches_closed_listeners() {
    let mut topic = Topic::new("appMessages");
    let (live_tx, mut live_rx) = mpsc::unbounded_channel();
    let (dead_tx, dead_rx) = mpsc::unbounded_channel();
    topic.subscribe("live".to_string(), live_tx);
    topic.subscribe("dead".to_string(), dead_tx);
    drop(dead_rx);

    topic.deliver(|| BusEvent::Next(json!({ "msg": "hi" })));

    assert!(matches!(live_rx.try_recv(), Ok(BusEvent::Next(v)) if v["msg"] == "hi"));
    assert!(topic.listeners.contains_key("live"));
    assert!(!topic.listeners.contains_key("dead"));
}

#[test]
fn test_subscription_release_runs_once() {
    let (_tx, rx) = mpsc::unbounded_channel();
    let (released_tx, mut released_rx) = mpsc::unbounded_channel();
    let subscription = Subscription::new("l1".to_string(), "appMessages", rx, move |id| {
        released_tx.send(id.clone()).unwrap();
    });
    assert_eq!(subscription.topic(), "appMessages");

    subscription.unsubscribe();

    assert_eq!(released_rx.try_recv().unwrap(), "l1");
    assert!(released_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_local_publish_reaches_listener() {
    let bus = LocalBus::new();
    let mut subscription = bus.subscribe("appMessages").await.unwrap();

    bus.publish("appMessages", json!({ "msg": "hello" }))
        .await
        .unwrap();

    match subscription.try_recv() {
        Some(BusEvent::Next(payload)) => assert_eq!(payload, json!({ "msg": "hello" })),
        other => panic!("Expected a message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_local_publish_without_listeners_is_dropped() {
    let bus = LocalBus::new();
    bus.publish("nobody", json!({ "msg": "lost" })).await.unwrap();

    let mut subscription = bus.subscribe("nobody").await.unwrap();
    assert!(subscription.try_recv().is_none());
}

#[tokio::test]
async fn test_local_topics_are_isolated() {
    let bus = LocalBus::new();
    let mut other = bus.subscribe("other").await.unwrap();

    bus.publish("appMessages", json!({ "msg": "hello" }))
        .await
        .unwrap();

    assert!(other.try_recv().is_none());
}

#[tokio::test]
async fn test_local_dropping_subscription_detaches_listener() {
    let bus = LocalBus::new();
    let subscription = bus.subscribe("appMessages").await.unwrap();
    let second = bus.subscribe("appMessages").await.unwrap();
    assert_eq!(bus.listener_count("appMessages"), 2);

    drop(subscription);
    assert_eq!(bus.listener_count("appMessages"), 1);

    second.unsubscribe();
    assert_eq!(bus.listener_count("appMessages"), 0);
    assert_eq!(bus.subscriptions_opened(), 2);
}

#[tokio::test]
async fn test_local_close_completes_listeners() {
    let bus = LocalBus::new();
    let mut subscription = bus.subscribe("appMessages").await.unwrap();

    bus.close();

    assert!(matches!(subscription.recv().await, Some(BusEvent::Complete)));
    assert!(subscription.recv().await.is_none());
    assert_eq!(bus.listener_count("appMessages"), 0);
}

#[tokio::test]
async fn test_local_fail_reports_error() {
    let bus = LocalBus::new();
    let mut subscription = bus.subscribe("appMessages").await.unwrap();

    bus.fail("appMessages", "connection reset");

    match subscription.try_recv() {
        Some(BusEvent::Error(e)) => assert!(e.to_string().contains("connection reset")),
        other => panic!("Expected an error, got {:?}", other),
    }
}
