// src/app/mod.rs
//
// Application wiring

pub mod engine_init;

pub use engine_init::{init_activity_subsystem, ActivityConfig};
