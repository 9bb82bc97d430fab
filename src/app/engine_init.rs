// src/app/engine_init.rs
//
// Activity Subsystem Initialization
//
// Wires an ActivityEngine to the host's event bus and collaborators.
//
// CRITICAL RULES:
// - Uses the host's event bus; never creates a private one
// - The resolver and the enablement gate are supplied by the host
// - Must run inside a Tokio runtime

use std::path::Path;
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::events::{ActivityEvent, EventBus};
use crate::integrations::{EnablementGate, MetadataResolver};
use crate::services::{ActivityEngine, EngineConfig};

// ============================================================================
// ACTIVITY SUBSYSTEM INITIALIZATION
// ============================================================================

/// Configuration for the activity subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Engine timings and thresholds
    pub engine: EngineConfig,

    /// Log every emitted activity event at info level
    pub log_events: bool,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            log_events: true,
        }
    }
}

impl ActivityConfig {
    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Initializes the activity subsystem.
///
/// This function:
/// 1. Creates the ActivityEngine on the current runtime
/// 2. Registers the event logging handler if enabled
///
/// # Arguments
/// * `resolver` - Metadata lookup used when sessions are created
/// * `gate` - Host toggle consulted before playback signals
/// * `event_bus` - The host event bus
/// * `config` - Configuration options
pub fn init_activity_subsystem(
    resolver: Arc<dyn MetadataResolver>,
    gate: Arc<dyn EnablementGate>,
    event_bus: Arc<EventBus>,
    config: ActivityConfig,
) -> EngineResult<ActivityEngine> {
    info!("[ACTIVITY] Initializing subsystem...");

    if config.log_events {
        event_bus.subscribe::<ActivityEvent, _>(|event| {
            info!(
                "[ACTIVITY] {} session={} item={} state={} progress={:?}",
                event.kind,
                event.session.id,
                event.session.item.reference,
                event.session.state,
                event.session.progress
            );
        });
        info!("[ACTIVITY] Event logging registered");
    }

    let engine = ActivityEngine::new(config.engine, resolver, gate, event_bus)?;

    info!("[ACTIVITY] Subsystem initialized (client {})", engine.client_id());
    Ok(engine)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::{CatalogResolver, EnablementToggle};

    #[test]
    fn test_default_config() {
        let config = ActivityConfig::default();
        assert!(config.log_events);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_engine_defaults() {
        let config: ActivityConfig =
            serde_json::from_str(r#"{"log_events": false, "engine": {"seek_threshold_ms": 20000}}"#)
                .unwrap();
        assert!(!config.log_events);
        assert_eq!(config.engine.seek_threshold_ms, 20_000);
        assert_eq!(config.engine.progress_interval_ms, 5_000);
    }

    #[tokio::test]
    async fn test_init_registers_logging_handler() {
        let bus = Arc::new(EventBus::new());
        let engine = init_activity_subsystem(
            Arc::new(CatalogResolver::default()),
            Arc::new(EnablementToggle::default()),
            Arc::clone(&bus),
            ActivityConfig::default(),
        )
        .unwrap();

        assert_eq!(bus.subscriber_count::<ActivityEvent>(), 1);
        assert!(engine.current_session().is_none());
    }

    #[tokio::test]
    async fn test_init_without_logging() {
        let bus = Arc::new(EventBus::new());
        let config = ActivityConfig {
            log_events: false,
            ..ActivityConfig::default()
        };
        init_activity_subsystem(
            Arc::new(CatalogResolver::default()),
            Arc::new(EnablementToggle::default()),
            Arc::clone(&bus),
            config,
        )
        .unwrap();

        assert_eq!(bus.subscriber_count::<ActivityEvent>(), 0);
    }
}
