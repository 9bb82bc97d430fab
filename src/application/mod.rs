// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - This layer sits ABOVE the engine
// - It is the boundary between player adapters (or scripts) and the engine
// - It translates wire signals into engine calls

pub mod commands;
pub mod dto;

pub use commands::*;
pub use dto::*;
