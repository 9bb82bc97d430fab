// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod activity;
pub mod item;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Activity Domain
pub use activity::{
    validate_session, validate_transition, Session, SessionSnapshot, SessionState,
    SessionStatus, Stall,
};

// Item Domain
pub use item::{Item, ItemKind, ItemRef};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
