// src/application/commands/mod.rs
//
// Signal Handlers
//
// ARCHITECTURE:
// - Handlers are thin adapters between player adapters and the engine
// - Handlers accept DTOs
// - Handlers NEVER contain lifecycle logic

pub mod activity_commands;

pub use activity_commands::*;
