// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod activity_engine;
pub mod scheduler;
pub mod state_detector;


pub use activity_engine::{ActivityEngine, EngineConfig};

pub use scheduler::{Scheduler, TimerHandle};

pub use state_detector::{detect_state, PlayerState};
