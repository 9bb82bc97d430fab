pub mod entity;
pub mod invariants;
pub mod snapshot;

pub use entity::{percent, Session, SessionState, SessionStatus, Stall};
pub use invariants::{validate_session, validate_transition};
pub use snapshot::SessionSnapshot;
