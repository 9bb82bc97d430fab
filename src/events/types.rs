// src/events/types.rs
//
// Activity lifecycle events.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events are immutable
// - Events carry a plain snapshot of the session, never the live session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::SessionSnapshot;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// ACTIVITY EVENTS
// ============================================================================

/// Lifecycle step an activity event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityEventKind {
    #[serde(rename = "activity.created")]
    Created,
    #[serde(rename = "activity.started")]
    Started,
    #[serde(rename = "activity.progress")]
    Progress,
    #[serde(rename = "activity.seeked")]
    Seeked,
    #[serde(rename = "activity.paused")]
    Paused,
    #[serde(rename = "activity.stopped")]
    Stopped,
}

impl ActivityEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActivityEventKind::Created => "activity.created",
            ActivityEventKind::Started => "activity.started",
            ActivityEventKind::Progress => "activity.progress",
            ActivityEventKind::Seeked => "activity.seeked",
            ActivityEventKind::Paused => "activity.paused",
            ActivityEventKind::Stopped => "activity.stopped",
        }
    }
}

impl std::fmt::Display for ActivityEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Emitted by the activity engine on every lifecycle step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub kind: ActivityEventKind,
    pub session: SessionSnapshot,
}

impl ActivityEvent {
    pub fn new(kind: ActivityEventKind, session: SessionSnapshot) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            kind,
            session,
        }
    }
}

impl DomainEvent for ActivityEvent {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { self.kind.name() }
}
