use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use super::entity::{Session, SessionState, SessionStatus, Stall};
use super::invariants::validate_session;
use crate::domain::item::Item;
use crate::domain::{DomainError, DomainResult};

/// Plain serialization of a Session.
///
/// This is the payload of every activity event and the form in which a
/// session travels to other parts of the host process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub client_id: Uuid,
    pub item: Item,
    pub state: SessionStatus,
    pub time: Option<u64>,
    pub progress: Option<f64>,
    pub valid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub stalled_at: Option<DateTime<Utc>>,
    pub stalled_previous_state: Option<SessionStatus>,
}

impl Session {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::from(self)
    }
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        let stall = session.stall();
        Self {
            id: session.id,
            client_id: session.client_id,
            item: session.item.clone(),
            state: session.status(),
            time: session.time,
            progress: session.progress(),
            valid: session.is_valid(),
            created_at: session.created_at,
            updated_at: session.updated_at,
            ended_at: session.ended_at(),
            stalled_at: stall.map(|s| s.at),
            stalled_previous_state: stall.map(|s| s.previous),
        }
    }
}

impl TryFrom<SessionSnapshot> for Session {
    type Error = DomainError;

    /// Derived fields (`progress`, `valid`) are recomputed, not trusted.
    /// A stall restarts its timeout from now since the original monotonic
    /// instant does not survive serialization.
    fn try_from(snapshot: SessionSnapshot) -> DomainResult<Self> {
        let state = match snapshot.state {
            SessionStatus::Stalled => {
                let previous = snapshot.stalled_previous_state.ok_or_else(|| {
                    DomainError::InvariantViolation(
                        "stalled snapshot without previous state".to_string(),
                    )
                })?;
                SessionState::Stalled(Stall {
                    since: Instant::now(),
                    at: snapshot.stalled_at.unwrap_or_else(Utc::now),
                    previous,
                })
            }
            SessionStatus::Ended => SessionState::Ended {
                at: snapshot.ended_at.unwrap_or(snapshot.updated_at),
            },
            status => SessionState::from_status(status).ok_or_else(|| {
                DomainError::InvariantViolation(format!("cannot restore state {}", status))
            })?,
        };

        let session = Session::restore(
            snapshot.id,
            snapshot.client_id,
            snapshot.item,
            state,
            snapshot.time,
            snapshot.created_at,
            snapshot.updated_at,
        );
        validate_session(&session)?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::ItemRef;

    #[test]
    fn test_snapshot_carries_derived_fields() {
        let mut session = Session::new(
            Uuid::new_v4(),
            Item::new(ItemRef::episode("Ping Pong", Some(1), 2), Some(200_000)),
        );
        session.set_time(50_000);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionStatus::Created);
        assert_eq!(snapshot.progress, Some(25.0));
        assert!(snapshot.valid);
        assert_eq!(snapshot.ended_at, None);
    }

    #[test]
    fn test_snapshot_serializes_state_names() {
        let session = Session::new(Uuid::new_v4(), Item::new(ItemRef::movie("Redline"), None));
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["state"], "created");
        assert_eq!(json["valid"], false);
        assert!(json["progress"].is_null());
    }

    #[test]
    fn test_stalled_snapshot_requires_previous_state() {
        let session = Session::new(Uuid::new_v4(), Item::new(ItemRef::movie("Redline"), None));
        let mut snapshot = session.snapshot();
        snapshot.state = SessionStatus::Stalled;
        assert!(Session::try_from(snapshot.clone()).is_err());

        snapshot.stalled_previous_state = Some(SessionStatus::Playing);
        let restored = Session::try_from(snapshot).unwrap();
        assert_eq!(restored.stall().map(|s| s.previous), Some(SessionStatus::Playing));
    }

    #[test]
    fn test_ended_snapshot_keeps_end_time() {
        let session = Session::new(Uuid::new_v4(), Item::new(ItemRef::movie("Redline"), None));
        let mut snapshot = session.snapshot();
        let ended_at = snapshot.created_at + chrono::Duration::seconds(30);
        snapshot.state = SessionStatus::Ended;
        snapshot.ended_at = Some(ended_at);
        let restored = Session::try_from(snapshot).unwrap();
        assert_eq!(restored.ended_at(), Some(ended_at));
    }
}
