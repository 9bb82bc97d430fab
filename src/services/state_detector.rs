// src/services/state_detector.rs
//
// State Detector - reads player state from a raw position stream.
//
// Pure: looks at the session and a new sample, proposes a state, changes
// nothing. The engine applies the proposal (and records stall bookkeeping).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::domain::{Session, SessionState, SessionStatus};

/// Player-side state, as reported by adapters or inferred from positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Playing,
    Paused,
    Stalled,
    Stopped,
}

impl PlayerState {
    /// Session status this player state leads to
    pub fn status(&self) -> SessionStatus {
        match self {
            PlayerState::Playing => SessionStatus::Playing,
            PlayerState::Paused => SessionStatus::Paused,
            PlayerState::Stalled => SessionStatus::Stalled,
            PlayerState::Stopped => SessionStatus::Ended,
        }
    }
}

/// Propose a state for `session` given a new position sample `time` (ms).
///
/// - no position baseline or no duration: nothing to compare, no proposal
/// - position advanced: playing
/// - created/paused/pausing: not subject to stall detection
/// - stalled for at least `stall_threshold`: paused
/// - stalled for less: no proposal (the stall keeps its original start)
/// - otherwise the position stopped advancing: stalled
pub fn detect_state(
    session: &Session,
    time: u64,
    now: Instant,
    stall_threshold: Duration,
) -> Option<PlayerState> {
    let previous = session.time?;
    session.item.known_duration()?;

    if time > previous {
        return Some(PlayerState::Playing);
    }

    match session.state() {
        SessionState::Created
        | SessionState::Paused
        | SessionState::Pausing
        | SessionState::Ended { .. } => None,
        SessionState::Stalled(stall) => {
            if now.duration_since(stall.since) >= stall_threshold {
                Some(PlayerState::Paused)
            } else {
                None
            }
        }
        SessionState::Playing => Some(PlayerState::Stalled),
    }
}
