// src/lib.rs
// Activity Engine - playback activity tracking for media players
//
// Architecture:
// - Domain-centric: session lifecycle rules live in the domain
// - Event-driven: the engine reports through the event bus, never directly
// - Explicit: every ignored signal is a logged, deliberate decision
// - Host-owned policy: the host decides what to resolve and whether to record

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod domain;
pub mod error;
pub mod events;
pub mod integrations;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod app;
pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    validate_session,
    validate_transition,
    DomainError,
    DomainResult,
    // Item
    Item,
    ItemKind,
    ItemRef,
    // Session
    Session,
    SessionSnapshot,
    SessionState,
    SessionStatus,
    Stall,
};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{EngineError, EngineResult, MetadataError};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    ActivityEvent,
    ActivityEventKind,
    DomainEvent,
    EventBus,
    EventLogEntry,
};

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::{
    CatalogResolver,
    EnablementGate,
    EnablementToggle,
    MetadataResolver,
    RefreshPolicy,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    detect_state,
    // Activity Engine
    ActivityEngine,
    EngineConfig,
    PlayerState,
    Scheduler,
    TimerHandle,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use app::{init_activity_subsystem, ActivityConfig};
pub use application::{dispatch, replay, PlayerSignal, ReplayScript, ReplayStep};
