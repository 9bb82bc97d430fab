use super::entity::{Session, SessionStatus};
use crate::domain::{DomainError, DomainResult};

/// Transition table.
///
/// `Ended` is terminal. Any live state may end (stop, error, completion).
/// The match is exhaustive over `from` so a new state cannot slip in
/// without deciding where it may go.
pub fn validate_transition(from: SessionStatus, to: SessionStatus) -> DomainResult<()> {
    use SessionStatus::*;

    let allowed = match from {
        Created => matches!(to, Playing | Stalled | Ended),
        Stalled => matches!(to, Created | Playing | Paused | Ended),
        Playing => matches!(to, Stalled | Pausing | Ended),
        Pausing => matches!(to, Playing | Paused | Ended),
        Paused => matches!(to, Playing | Ended),
        Ended => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(DomainError::InvalidStateTransition { from, to })
    }
}

/// Validates all Session invariants
pub fn validate_session(session: &Session) -> DomainResult<()> {
    validate_stall(session)?;
    validate_timestamps(session)?;
    Ok(())
}

/// Only created and playing sessions stall, so only those can be resumed
fn validate_stall(session: &Session) -> DomainResult<()> {
    if let Some(stall) = session.stall() {
        if !matches!(stall.previous, SessionStatus::Created | SessionStatus::Playing) {
            return Err(DomainError::InvariantViolation(format!(
                "stall cannot resume into {}",
                stall.previous
            )));
        }
    }
    Ok(())
}

fn validate_timestamps(session: &Session) -> DomainResult<()> {
    if session.updated_at < session.created_at {
        return Err(DomainError::InvariantViolation(
            "updated_at precedes created_at".to_string(),
        ));
    }
    if let Some(ended_at) = session.ended_at() {
        if ended_at < session.created_at {
            return Err(DomainError::InvariantViolation(
                "ended_at precedes created_at".to_string(),
            ));
        }
    }
    Ok(())
}

/// Critical Session Invariants:
///
/// 1. One current session per engine; creating a new one retires the old
/// 2. State only changes through the transition table above
/// 3. Position is not authoritative until the item has a duration
/// 4. Ended is terminal
/// 5. Session ID is immutable

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::activity::{Session, SessionState, Stall};
    use crate::domain::item::{Item, ItemRef};
    use chrono::{Duration, Utc};
    use tokio::time::Instant;
    use uuid::Uuid;

    fn session() -> Session {
        Session::new(Uuid::new_v4(), Item::new(ItemRef::movie("Millennium Actress"), Some(87_000)))
    }

    #[test]
    fn test_allowed_transitions() {
        use SessionStatus::*;
        for (from, to) in [
            (Created, Playing),
            (Paused, Playing),
            (Playing, Pausing),
            (Pausing, Paused),
            (Pausing, Playing),
            (Playing, Stalled),
            (Stalled, Paused),
            (Stalled, Created),
            (Playing, Ended),
            (Created, Ended),
        ] {
            assert!(validate_transition(from, to).is_ok(), "{} -> {}", from, to);
        }
    }

    #[test]
    fn test_rejected_transitions() {
        use SessionStatus::*;
        for (from, to) in [
            (Ended, Playing),
            (Ended, Ended),
            (Created, Paused),
            (Paused, Pausing),
            (Playing, Playing),
            (Stalled, Stalled),
            (Paused, Stalled),
        ] {
            assert!(validate_transition(from, to).is_err(), "{} -> {}", from, to);
        }
    }

    #[test]
    fn test_valid_session() {
        assert!(validate_session(&session()).is_ok());
    }

    #[test]
    fn test_stall_cannot_resume_into_stall() {
        let s = session();
        let stall = Stall::begin(SessionStatus::Stalled, Instant::now());
        let restored = Session::restore(
            s.id,
            s.client_id,
            s.item.clone(),
            SessionState::Stalled(stall),
            Some(10),
            s.created_at,
            s.updated_at,
        );
        assert!(validate_session(&restored).is_err());
    }

    #[test]
    fn test_ended_before_created_fails() {
        let s = session();
        let restored = Session::restore(
            s.id,
            s.client_id,
            s.item.clone(),
            SessionState::Ended {
                at: s.created_at - Duration::seconds(5),
            },
            None,
            s.created_at,
            Utc::now(),
        );
        assert!(validate_session(&restored).is_err());
    }
}
