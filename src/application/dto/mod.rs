// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are what player adapters and scripts send over the wire
// - DTOs are simple, serializable structs
// - DTOs carry no engine state

use serde::{Deserialize, Serialize};

use crate::domain::{Item, ItemRef, SessionSnapshot};
use crate::services::PlayerState;

// ============================================================================
// PLAYER SIGNALS
// ============================================================================

/// One signal from a player adapter, tagged by `signal`.
///
/// ```json
/// {"signal": "open", "item": {"kind": "movie", "title": "Paprika"}}
/// {"signal": "progress", "time": 61250.0}
/// {"signal": "state_change", "previous": "playing", "current": "paused"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum PlayerSignal {
    Open {
        item: ItemRef,
        #[serde(default)]
        force: bool,
    },
    Close,
    Start,
    Progress {
        time: f64,
    },
    Seek {
        time: f64,
    },
    Pause,
    Stop,
    StateChange {
        previous: PlayerState,
        current: PlayerState,
    },
    Error {
        message: String,
    },
    Adopt {
        session: SessionSnapshot,
    },
}

impl PlayerSignal {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerSignal::Open { .. } => "open",
            PlayerSignal::Close => "close",
            PlayerSignal::Start => "start",
            PlayerSignal::Progress { .. } => "progress",
            PlayerSignal::Seek { .. } => "seek",
            PlayerSignal::Pause => "pause",
            PlayerSignal::Stop => "stop",
            PlayerSignal::StateChange { .. } => "state_change",
            PlayerSignal::Error { .. } => "error",
            PlayerSignal::Adopt { .. } => "adopt",
        }
    }
}

// ============================================================================
// REPLAY SCRIPTS
// ============================================================================

/// A recorded player session: the items the resolver knows and the signals
/// to play back, each delayed relative to the previous one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub catalog: Vec<Item>,
    pub steps: Vec<ReplayStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayStep {
    /// Delay before this step, in milliseconds
    #[serde(default)]
    pub after_ms: u64,
    #[serde(flatten)]
    pub signal: PlayerSignal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_wire_format() {
        let signal: PlayerSignal =
            serde_json::from_str(r#"{"signal": "progress", "time": 1500.0}"#).unwrap();
        assert_eq!(signal, PlayerSignal::Progress { time: 1500.0 });

        let signal: PlayerSignal = serde_json::from_str(
            r#"{"signal": "state_change", "previous": "playing", "current": "stalled"}"#,
        )
        .unwrap();
        assert_eq!(
            signal,
            PlayerSignal::StateChange {
                previous: PlayerState::Playing,
                current: PlayerState::Stalled,
            }
        );
        assert_eq!(signal.name(), "state_change");
    }

    #[test]
    fn test_open_defaults_to_unforced() {
        let signal: PlayerSignal = serde_json::from_str(
            r#"{"signal": "open", "item": {"kind": "episode", "title": "Dennou Coil", "season": 1, "number": 5}}"#,
        )
        .unwrap();
        match signal {
            PlayerSignal::Open { item, force } => {
                assert_eq!(item, ItemRef::episode("Dennou Coil", Some(1), 5));
                assert!(!force);
            }
            other => panic!("unexpected signal {:?}", other),
        }
    }

    #[test]
    fn test_replay_step_flattens_signal() {
        let script: ReplayScript = serde_json::from_str(
            r#"{"steps": [{"after_ms": 1000, "signal": "pause"}, {"signal": "stop"}]}"#,
        )
        .unwrap();
        assert!(script.catalog.is_empty());
        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.steps[0].after_ms, 1000);
        assert_eq!(script.steps[0].signal, PlayerSignal::Pause);
        assert_eq!(script.steps[1].after_ms, 0);
        assert_eq!(script.steps[1].signal, PlayerSignal::Stop);
    }
}
