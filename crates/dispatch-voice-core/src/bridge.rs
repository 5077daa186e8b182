//! Named-event bridge for callers that hold no reference to the triggers.
//!
//! Publishers call [`EventBridge::trigger_event`]; a mounted
//! [`Subscription`] routes `new-call`, `bolo-hit` and `panic-alert` into the
//! matching [`AlertTriggers`] call. Dropping the subscription unmounts it.

use crate::alert::Department;
use crate::error::{VoiceAlertError, VoiceAlertResult};
use crate::triggers::AlertTriggers;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Event carrying a new call for service
pub const NEW_CALL_EVENT: &str = "new-call";
/// Event carrying a BOLO plate hit
pub const BOLO_HIT_EVENT: &str = "bolo-hit";
/// Event carrying a panic button press
pub const PANIC_ALERT_EVENT: &str = "panic-alert";

const CHANNEL_CAPACITY: usize = 64;

static GLOBAL: Lazy<EventBridge> = Lazy::new(EventBridge::new);

/// A named event and its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeEvent {
    /// Event name
    pub name: String,
    /// Arbitrary payload
    pub detail: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewCallDetail {
    #[serde(alias = "call_number")]
    call_number: String,
    #[serde(alias = "call_type")]
    call_type: String,
    #[serde(default = "default_call_priority")]
    priority: String,
    location: String,
    #[serde(default)]
    department: Option<Department>,
}

fn default_call_priority() -> String {
    "MEDIUM".to_string()
}

#[derive(Debug, Deserialize)]
struct BoloHitDetail {
    plate: String,
    #[serde(default)]
    reason: String,
    location: String,
}

#[derive(Debug, Deserialize)]
struct PanicAlertDetail {
    unit: String,
    location: String,
    #[serde(default)]
    department: Option<Department>,
}

fn parse<T: serde::de::DeserializeOwned>(event: &BridgeEvent) -> VoiceAlertResult<T> {
    serde_json::from_value(event.detail.clone()).map_err(|e| {
        VoiceAlertError::invalid_input(format!("Bad '{}' payload: {e}", event.name))
    })
}

/// Forward one event to the matching trigger
///
/// Returns `Ok(None)` for event names the bridge does not route and for
/// triggers that were switched off.
///
/// # Errors
///
/// Returns `InvalidInput` when a routed event's payload has the wrong shape.
pub fn route(triggers: &AlertTriggers, event: &BridgeEvent) -> VoiceAlertResult<Option<Uuid>> {
    match event.name.as_str() {
        NEW_CALL_EVENT => {
            let d: NewCallDetail = parse(event)?;
            Ok(triggers.announce_new_call(
                &d.call_number,
                &d.call_type,
                &d.priority,
                &d.location,
                d.department,
            ))
        }
        BOLO_HIT_EVENT => {
            let d: BoloHitDetail = parse(event)?;
            Ok(triggers.announce_bolo_hit(&d.plate, &d.reason, &d.location))
        }
        PANIC_ALERT_EVENT => {
            let d: PanicAlertDetail = parse(event)?;
            Ok(triggers.announce_panic_button(&d.unit, &d.location, d.department))
        }
        other => {
            debug!("Bridge ignoring event '{}'", other);
            Ok(None)
        }
    }
}

/// Broadcast channel of named events
#[derive(Debug, Clone)]
pub struct EventBridge {
    sender: broadcast::Sender<BridgeEvent>,
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBridge {
    /// A bridge with no subscribers
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// The process-wide bridge
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Broadcast an event; returns how many subscribers received it
    pub fn trigger_event<S: Into<String>>(&self, name: S, detail: serde_json::Value) -> usize {
        let event = BridgeEvent {
            name: name.into(),
            detail,
        };
        // No subscribers is not an error
        self.sender.send(event).unwrap_or(0)
    }

    /// Raw receiver for callers that route events themselves
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Start routing events into `triggers`
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use = "dropping the subscription unmounts it"]
    pub fn mount(&self, triggers: AlertTriggers) -> Subscription {
        let mut receiver = self.sender.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        if let Err(e) = route(&triggers, &event) {
                            warn!("Dropped bridged event: {e}");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("Bridge subscriber lagged, {} events lost", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Subscription { task: Some(task) }
    }
}

/// A mounted bridge listener
#[derive(Debug)]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stop listening
    pub fn unmount(mut self) {
        self.abort();
    }

    /// Whether the listener is still running
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trigger_without_subscribers() {
        let bridge = EventBridge::new();
        assert_eq!(bridge.trigger_event(NEW_CALL_EVENT, json!({})), 0);
        assert_eq!(bridge.subscriber_count(), 0);
    }

    #[test]
    fn test_new_call_detail_accepts_both_casings() {
        let camel = BridgeEvent {
            name: NEW_CALL_EVENT.to_string(),
            detail: json!({
                "callNumber": "24-1001",
                "callType": "Burglary",
                "priority": "HIGH",
                "location": "5th and Main",
                "department": "POLICE"
            }),
        };
        let d: NewCallDetail = parse(&camel).unwrap();
        assert_eq!(d.call_number, "24-1001");
        assert_eq!(d.department, Some(Department::Police));

        let snake = BridgeEvent {
            name: NEW_CALL_EVENT.to_string(),
            detail: json!({
                "call_number": "24-1002",
                "call_type": "Alarm",
                "location": "Elm St"
            }),
        };
        let d: NewCallDetail = parse(&snake).unwrap();
        assert_eq!(d.priority, "MEDIUM");
        assert_eq!(d.department, None);
    }

    #[test]
    fn test_lowercase_department_in_payload() {
        let event = BridgeEvent {
            name: PANIC_ALERT_EVENT.to_string(),
            detail: json!({ "unit": "7", "location": "Dock 2", "department": "police" }),
        };
        let d: PanicAlertDetail = parse(&event).unwrap();
        assert_eq!(d.department, Some(Department::Police));
    }

    #[test]
    fn test_bad_payload_is_invalid_input() {
        let event = BridgeEvent {
            name: PANIC_ALERT_EVENT.to_string(),
            detail: json!({ "unit": 12 }),
        };
        let err = parse::<PanicAlertDetail>(&event).unwrap_err();
        assert!(matches!(err, VoiceAlertError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_subscribe_receives_events() {
        let bridge = EventBridge::new();
        let mut rx = bridge.subscribe();
        assert_eq!(bridge.trigger_event("custom", json!({"a": 1})), 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name, "custom");
        assert_eq!(event.detail["a"], 1);
    }
}
