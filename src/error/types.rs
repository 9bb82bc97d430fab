// src/error/types.rs
use crate::domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Failures reported by a metadata resolver
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("No metadata found for {0}")]
    NotFound(String),

    #[error("Metadata source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid metadata: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Serialize for EngineError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SessionStatus;

    #[test]
    fn test_metadata_error_converts() {
        let err: EngineError = MetadataError::NotFound("Akira".to_string()).into();
        assert_eq!(err.to_string(), "Metadata error: No metadata found for Akira");
    }

    #[test]
    fn test_domain_error_message() {
        let err: EngineError = DomainError::InvalidStateTransition {
            from: SessionStatus::Ended,
            to: SessionStatus::Playing,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Domain error: Invalid state transition: ended -> playing"
        );
    }

    #[test]
    fn test_serializes_as_message() {
        let err = EngineError::Other("boom".to_string());
        assert_eq!(serde_json::to_string(&err).unwrap(), "\"Other error: boom\"");
    }
}
