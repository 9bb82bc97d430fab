// src/error/mod.rs

pub mod types;

pub use types::{EngineError, EngineResult, MetadataError};
