use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use super::invariants::validate_transition;
use crate::domain::item::Item;
use crate::domain::DomainResult;

/// One tracked unit of playback activity.
/// Lives from the first player signal until it reaches `Ended`.
#[derive(Debug, Clone)]
pub struct Session {
    /// Generated at creation, never changes
    pub id: Uuid,

    /// Engine instance that owns this session
    pub client_id: Uuid,

    /// Resolved metadata (duration may still be missing)
    pub item: Item,

    /// Lifecycle state, only changed through `transition`
    state: SessionState,

    /// Last known playback position in milliseconds
    pub time: Option<u64>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Flat name of a lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Stalled,
    Playing,
    Pausing,
    Paused,
    Ended,
}

/// Lifecycle state with the data that only exists in that state
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Created,
    Stalled(Stall),
    Playing,
    Pausing,
    Paused,
    Ended { at: DateTime<Utc> },
}

/// Stall bookkeeping: when the position stopped advancing and what the
/// session was doing before
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stall {
    /// Monotonic instant used for the stall timeout
    pub since: Instant,

    /// Wall-clock time, for snapshots
    pub at: DateTime<Utc>,

    pub previous: SessionStatus,
}

impl Stall {
    pub fn begin(previous: SessionStatus, now: Instant) -> Self {
        Self {
            since: now,
            at: Utc::now(),
            previous,
        }
    }
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Created => SessionStatus::Created,
            SessionState::Stalled(_) => SessionStatus::Stalled,
            SessionState::Playing => SessionStatus::Playing,
            SessionState::Pausing => SessionStatus::Pausing,
            SessionState::Paused => SessionStatus::Paused,
            SessionState::Ended { .. } => SessionStatus::Ended,
        }
    }

    /// Build the state for a flat status, for states that carry no data
    pub fn from_status(status: SessionStatus) -> Option<Self> {
        match status {
            SessionStatus::Created => Some(SessionState::Created),
            SessionStatus::Playing => Some(SessionState::Playing),
            SessionStatus::Pausing => Some(SessionState::Pausing),
            SessionStatus::Paused => Some(SessionState::Paused),
            SessionStatus::Stalled | SessionStatus::Ended => None,
        }
    }
}

impl Session {
    /// Create a new Session in `Created` state
    pub fn new(client_id: Uuid, item: Item) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            client_id,
            item,
            state: SessionState::Created,
            time: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a session around an existing state (used when adopting a
    /// session from elsewhere). Caller validates the result.
    pub(crate) fn restore(
        id: Uuid,
        client_id: Uuid,
        item: Item,
        state: SessionState,
        time: Option<u64>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            client_id,
            item,
            state,
            time,
            created_at,
            updated_at,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    pub fn stall(&self) -> Option<&Stall> {
        match &self.state {
            SessionState::Stalled(stall) => Some(stall),
            _ => None,
        }
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            SessionState::Ended { at } => Some(at),
            _ => None,
        }
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.state, SessionState::Ended { .. })
    }

    /// True once the item has a usable duration
    pub fn is_valid(&self) -> bool {
        self.item.known_duration().is_some()
    }

    /// Percentage watched, rounded to two decimals.
    /// `None` while the duration is unknown.
    pub fn progress(&self) -> Option<f64> {
        let duration = self.item.known_duration()?;
        Some(percent(self.time.unwrap_or(0), duration))
    }

    /// Move to `next`, rejecting anything outside the transition table
    pub fn transition(&mut self, next: SessionState) -> DomainResult<()> {
        validate_transition(self.status(), next.status())?;
        self.state = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Record a new playback position
    pub fn set_time(&mut self, time: u64) {
        self.time = Some(time);
        self.updated_at = Utc::now();
    }
}

/// `time / duration * 100`, rounded to two decimals
pub fn percent(time: u64, duration: u64) -> f64 {
    let raw = time as f64 / duration as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Created => write!(f, "created"),
            SessionStatus::Stalled => write!(f, "stalled"),
            SessionStatus::Playing => write!(f, "playing"),
            SessionStatus::Pausing => write!(f, "pausing"),
            SessionStatus::Paused => write!(f, "paused"),
            SessionStatus::Ended => write!(f, "ended"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::ItemRef;

    fn session_with_duration(duration: Option<u64>) -> Session {
        Session::new(Uuid::new_v4(), Item::new(ItemRef::movie("Tokyo Godfathers"), duration))
    }

    #[test]
    fn test_new_session_is_created() {
        let session = session_with_duration(Some(100_000));
        assert_eq!(session.status(), SessionStatus::Created);
        assert_eq!(session.time, None);
        assert_eq!(session.ended_at(), None);
    }

    #[test]
    fn test_progress_rounds_to_two_decimals() {
        let mut session = session_with_duration(Some(3_000));
        session.set_time(1_000);
        assert_eq!(session.progress(), Some(33.33));
    }

    #[test]
    fn test_progress_without_duration() {
        let mut session = session_with_duration(None);
        session.set_time(1_000);
        assert_eq!(session.progress(), None);
        assert!(!session.is_valid());
    }

    #[test]
    fn test_progress_before_first_sample_is_zero() {
        let session = session_with_duration(Some(60_000));
        assert_eq!(session.progress(), Some(0.0));
    }

    #[test]
    fn test_transition_updates_state() {
        let mut session = session_with_duration(Some(60_000));
        session.transition(SessionState::Playing).unwrap();
        assert_eq!(session.status(), SessionStatus::Playing);
    }

    #[test]
    fn test_ended_session_rejects_transitions() {
        let mut session = session_with_duration(Some(60_000));
        session
            .transition(SessionState::Ended { at: Utc::now() })
            .unwrap();
        assert!(session.is_ended());
        assert!(session.ended_at().is_some());
        assert!(session.transition(SessionState::Playing).is_err());
    }

    #[test]
    fn test_stall_accessor() {
        let mut session = session_with_duration(Some(60_000));
        session.transition(SessionState::Playing).unwrap();
        let stall = Stall::begin(SessionStatus::Playing, Instant::now());
        session.transition(SessionState::Stalled(stall)).unwrap();
        assert_eq!(session.stall().map(|s| s.previous), Some(SessionStatus::Playing));
    }
}
