// src/events/mod.rs
//
// Internal Event System - Public API
//
// Subscriber storage stays private to the bus

pub mod bus;
pub mod types;

// ============================================================================
// PUBLIC EXPORTS - Event Types and Bus Only
// ============================================================================

pub use types::DomainEvent;

pub use types::{ActivityEvent, ActivityEventKind};

pub use bus::{EventBus, EventLogEntry};
