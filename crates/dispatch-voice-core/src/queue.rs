//! Pending announcements in play order.

use crate::alert::{Priority, VoiceAlert};
use std::collections::VecDeque;

/// Sort key; larger plays first
///
/// Supervisor overrides outrank everything and share one rank, so they play
/// in arrival order among themselves.
fn rank(alert: &VoiceAlert) -> (bool, Priority) {
    if alert.supervisor_override {
        (true, Priority::Low)
    } else {
        (false, alert.priority)
    }
}

/// Priority-ordered queue, stable for equal ranks
#[derive(Debug, Clone, Default)]
pub struct AlertQueue {
    items: VecDeque<VoiceAlert>,
}

impl AlertQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert after every alert of equal or higher rank; returns the index
    pub fn push(&mut self, alert: VoiceAlert) -> usize {
        let key = rank(&alert);
        let index = self
            .items
            .iter()
            .position(|queued| rank(queued) < key)
            .unwrap_or(self.items.len());
        self.items.insert(index, alert);
        index
    }

    /// Remove the next alert to play
    pub fn pop_front(&mut self) -> Option<VoiceAlert> {
        self.items.pop_front()
    }

    /// Next alert to play
    #[must_use]
    pub fn peek(&self) -> Option<&VoiceAlert> {
        self.items.front()
    }

    /// Drop every pending alert, returning how many there were
    pub fn clear(&mut self) -> usize {
        let dropped = self.items.len();
        self.items.clear();
        dropped
    }

    /// Number of pending alerts
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is pending
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Copy of the pending alerts in play order
    #[must_use]
    pub fn snapshot(&self) -> Vec<VoiceAlert> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertType, SpeakOptions};

    fn alert(text: &str, priority: Priority) -> VoiceAlert {
        VoiceAlert::new(text, SpeakOptions::new(priority, AlertType::Notification))
    }

    fn texts(queue: &AlertQueue) -> Vec<String> {
        queue.snapshot().into_iter().map(|a| a.text).collect()
    }

    #[test]
    fn test_priority_order_with_stable_criticals() {
        let mut queue = AlertQueue::new();
        queue.push(alert("low", Priority::Low));
        queue.push(alert("c1", Priority::Critical));
        queue.push(alert("normal", Priority::Normal));
        queue.push(alert("high", Priority::High));
        queue.push(alert("c5", Priority::Critical));

        assert_eq!(texts(&queue), ["c1", "c5", "high", "normal", "low"]);
    }

    #[test]
    fn test_equal_priorities_keep_arrival_order() {
        let mut queue = AlertQueue::new();
        for name in ["a", "b", "c"] {
            queue.push(alert(name, Priority::Normal));
        }
        assert_eq!(texts(&queue), ["a", "b", "c"]);
    }

    #[test]
    fn test_overrides_go_first_in_arrival_order() {
        let mut queue = AlertQueue::new();
        queue.push(alert("critical", Priority::Critical));
        queue.push(VoiceAlert::new(
            "o1",
            SpeakOptions::new(Priority::Low, AlertType::Admin).with_supervisor_override(),
        ));
        queue.push(VoiceAlert::new(
            "o2",
            SpeakOptions::new(Priority::Critical, AlertType::Admin).with_supervisor_override(),
        ));

        assert_eq!(texts(&queue), ["o1", "o2", "critical"]);
    }

    #[test]
    fn test_push_reports_position_and_clear_counts() {
        let mut queue = AlertQueue::new();
        assert_eq!(queue.push(alert("a", Priority::Low)), 0);
        assert_eq!(queue.push(alert("b", Priority::High)), 0);
        assert_eq!(queue.push(alert("c", Priority::Normal)), 1);
        assert_eq!(queue.peek().map(|a| a.text.as_str()), Some("b"));

        assert_eq!(queue.clear(), 3);
        assert!(queue.is_empty());
        assert!(queue.pop_front().is_none());
    }
}
