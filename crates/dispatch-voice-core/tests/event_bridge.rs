//! Named events routed through the bridge into the triggers

mod common;

use common::{engine_with, settle, RecordingProvider};
use dispatch_voice_core::bridge::{BOLO_HIT_EVENT, NEW_CALL_EVENT, PANIC_ALERT_EVENT};
use dispatch_voice_core::{AlertTriggers, AlertType, Department, EventBridge, Priority};
use serde_json::json;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_bridged_events_reach_the_queue() {
    let provider = RecordingProvider::new(Duration::from_millis(100));
    let engine = engine_with(&provider);
    let bridge = EventBridge::new();
    let subscription = bridge.mount(AlertTriggers::new(engine.clone()));
    assert!(subscription.is_active());

    bridge.trigger_event(
        NEW_CALL_EVENT,
        json!({
            "callNumber": "24-77",
            "callType": "Burglary",
            "priority": "HIGH",
            "location": "Oak Ave"
        }),
    );
    bridge.trigger_event(
        PANIC_ALERT_EVENT,
        json!({ "unit": "12", "location": "Dock 4", "department": "POLICE" }),
    );
    bridge.trigger_event(BOLO_HIT_EVENT, json!({ "plate": "KX1", "location": "I-5" }));
    settle().await;

    let spoken_or_queued: Vec<_> = engine
        .current_alert()
        .into_iter()
        .chain(engine.queue_snapshot())
        .collect();
    assert_eq!(spoken_or_queued.len(), 3);

    engine.wait_until_idle().await;
    let texts = provider.texts();
    assert_eq!(texts.len(), 3);
    assert!(texts.iter().any(|t| t.contains("Call number 24-77")));
    assert!(texts.iter().any(|t| t.contains("unit 12 at Dock 4")));
    assert!(texts.iter().any(|t| t.contains("K X 1")));

    let panic = engine.analytics().into_iter().filter(|e| e.alert_type == AlertType::Panic).count();
    assert_eq!(panic, 1);
    engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_panic_payload_carries_department() {
    let provider = RecordingProvider::new(Duration::from_millis(100));
    let engine = engine_with(&provider);
    let bridge = EventBridge::new();
    let _subscription = bridge.mount(AlertTriggers::new(engine.clone()));

    // Hold the driver on a long alert so the panic stays queued
    engine.speak(
        "override",
        dispatch_voice_core::SpeakOptions::default().with_supervisor_override(),
    );
    settle().await;

    bridge.trigger_event(PANIC_ALERT_EVENT, json!({ "unit": "3", "location": "Pier", "department": "EMS" }));
    settle().await;

    let queued = engine.queue_snapshot();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].priority, Priority::Critical);
    assert_eq!(queued[0].department, Some(Department::Ems));
    engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_bad_and_unknown_events_are_ignored() {
    let provider = RecordingProvider::new(Duration::from_millis(100));
    let engine = engine_with(&provider);
    let bridge = EventBridge::new();
    let subscription = bridge.mount(AlertTriggers::new(engine.clone()));

    bridge.trigger_event(NEW_CALL_EVENT, json!({ "callNumber": 5 }));
    bridge.trigger_event("shift-change", json!({ "shift": "B" }));
    settle().await;

    assert!(subscription.is_active());
    assert!(!engine.is_speaking());
    assert_eq!(engine.queue_len(), 0);
    engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unmount_stops_routing() {
    let provider = RecordingProvider::new(Duration::from_millis(100));
    let engine = engine_with(&provider);
    let bridge = EventBridge::new();

    let subscription = bridge.mount(AlertTriggers::new(engine.clone()));
    assert_eq!(bridge.subscriber_count(), 1);
    subscription.unmount();
    settle().await;

    assert_eq!(bridge.subscriber_count(), 0);
    assert_eq!(
        bridge.trigger_event(BOLO_HIT_EVENT, json!({ "plate": "KX1", "location": "I-5" })),
        0
    );
    settle().await;
    assert!(provider.texts().is_empty());
    engine.shutdown().await;
}
