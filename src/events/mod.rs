use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::Actor;

/// What happened to a report, as recorded in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
    Submitted,
    Approved,
    Rejected,
    RevisionRequested,
}

/// A single activity-log entry with before/after snapshots of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub report_id: Uuid,
    pub report_number: String,
    pub action: ActivityAction,
    pub description: String,
    pub actor: Actor,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub occurred_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        report_id: Uuid,
        report_number: impl Into<String>,
        action: ActivityAction,
        actor: &Actor,
    ) -> Self {
        let report_number = report_number.into();
        let description = format!("{} report {}", describe(action), report_number);
        Self {
            report_id,
            report_number,
            action,
            description,
            actor: actor.clone(),
            before: None,
            after: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_before<T: Serialize>(mut self, snapshot: &T) -> Self {
        self.before = serde_json::to_value(snapshot).ok();
        self
    }

    pub fn with_after<T: Serialize>(mut self, snapshot: &T) -> Self {
        self.after = serde_json::to_value(snapshot).ok();
        self
    }
}

fn describe(action: ActivityAction) -> &'static str {
    match action {
        ActivityAction::Created => "Created",
        ActivityAction::Updated => "Updated",
        ActivityAction::Deleted => "Deleted",
        ActivityAction::Submitted => "Submitted",
        ActivityAction::Approved => "Approved",
        ActivityAction::Rejected => "Rejected",
        ActivityAction::RevisionRequested => "Requested revision of",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Activity(ActivityEntry),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Best-effort delivery that never waits; returns false when the event
    /// was dropped because the channel is full or closed
    pub fn send_or_log(&self, event: Event) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Activity channel full, dropping event");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Activity channel closed, dropping event");
                false
            }
        }
    }
}

/// Creates a bounded event channel
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, handing each entry to the activity log
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::Activity(entry) => record_activity(&entry),
        }
    }

    info!("Event processing loop stopped");
}

fn record_activity(entry: &ActivityEntry) {
    let before = entry
        .before
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_default();
    let after = entry
        .after
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_default();

    info!(
        target: "activity",
        report_id = %entry.report_id,
        report_number = %entry.report_number,
        action = %entry.action,
        actor_id = %entry.actor.id,
        actor_name = %entry.actor.name,
        occurred_at = %entry.occurred_at.to_rfc3339(),
        before = %before,
        after = %after,
        "{}",
        entry.description
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> Actor {
        Actor::new(Uuid::new_v4(), "Rina")
    }

    #[test]
    fn description_names_action_and_report() {
        let entry = ActivityEntry::new(
            Uuid::new_v4(),
            "CUT-20261001-0001",
            ActivityAction::RevisionRequested,
            &actor(),
        );
        assert_eq!(
            entry.description,
            "Requested revision of report CUT-20261001-0001"
        );
        assert!(entry.before.is_none());
    }

    #[test]
    fn snapshots_are_captured_as_json() {
        let entry = ActivityEntry::new(Uuid::new_v4(), "CUT-1", ActivityAction::Updated, &actor())
            .with_before(&serde_json::json!({"status": "draft"}))
            .with_after(&serde_json::json!({"status": "submitted"}));
        assert_eq!(entry.before.unwrap()["status"], "draft");
        assert_eq!(entry.after.unwrap()["status"], "submitted");
    }

    #[tokio::test]
    async fn processing_loop_drains_channel_and_stops_when_senders_drop() {
        let (sender, rx) = channel(4);
        let handle = tokio::spawn(process_events(rx));

        sender
            .send(Event::Activity(ActivityEntry::new(
                Uuid::new_v4(),
                "CUT-2",
                ActivityAction::Created,
                &actor(),
            )))
            .await
            .unwrap();
        drop(sender);

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn send_after_receiver_dropped_reports_error() {
        let (sender, rx) = channel(1);
        drop(rx);
        let result = sender
            .send(Event::Activity(ActivityEntry::new(
                Uuid::new_v4(),
                "CUT-3",
                ActivityAction::Deleted,
                &actor(),
            )))
            .await;
        assert!(result.is_err());
        assert!(!sender.send_or_log(Event::Activity(ActivityEntry::new(
            Uuid::new_v4(),
            "CUT-3",
            ActivityAction::Deleted,
            &actor(),
        ))));
    }

    #[tokio::test]
    async fn full_channel_drops_instead_of_waiting() {
        let (sender, mut rx) = channel(1);
        let entry = || {
            Event::Activity(ActivityEntry::new(
                Uuid::new_v4(),
                "CUT-4",
                ActivityAction::Created,
                &actor(),
            ))
        };

        assert!(sender.send_or_log(entry()));
        // nobody is draining; a blocking send would hang here
        assert!(!sender.send_or_log(entry()));

        assert!(rx.recv().await.is_some());
        assert!(sender.send_or_log(entry()));
    }
}
