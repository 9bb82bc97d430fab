// src/application/commands/activity_commands.rs

use std::time::Duration;

use log::debug;

use crate::application::dto::{PlayerSignal, ReplayStep};
use crate::error::EngineResult;
use crate::services::ActivityEngine;

/// Forward one player signal to the engine.
///
/// Returns whether the signal changed anything. Only `open` and `adopt`
/// can fail; every other signal reports problems through the log.
pub async fn dispatch(engine: &ActivityEngine, signal: PlayerSignal) -> EngineResult<bool> {
    debug!("Dispatching {} signal", signal.name());

    let applied = match signal {
        PlayerSignal::Open { item, force } => engine.create_with(item, force).await?,
        PlayerSignal::Close => engine.close(),
        PlayerSignal::Start => engine.start(),
        PlayerSignal::Progress { time } => engine.progress(time).await,
        PlayerSignal::Seek { time } => engine.seek(time),
        PlayerSignal::Pause => engine.pause(),
        PlayerSignal::Stop => engine.stop(),
        PlayerSignal::StateChange { previous, current } => engine.state_change(previous, current),
        PlayerSignal::Error { message } => engine.error(&message),
        PlayerSignal::Adopt { session } => engine.adopt(session).await?,
    };
    Ok(applied)
}

/// Play back recorded steps in order, sleeping `after_ms` before each.
/// Stops at the first signal that fails.
pub async fn replay(engine: &ActivityEngine, steps: Vec<ReplayStep>) -> EngineResult<Vec<bool>> {
    let mut results = Vec::with_capacity(steps.len());
    for step in steps {
        if step.after_ms > 0 {
            tokio::time::sleep(Duration::from_millis(step.after_ms)).await;
        }
        results.push(dispatch(engine, step.signal).await?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::domain::{Item, ItemRef, SessionStatus};
    use crate::error::{EngineError, MetadataError};
    use crate::events::{ActivityEvent, ActivityEventKind, EventBus};
    use crate::integrations::{CatalogResolver, EnablementToggle};
    use crate::services::{EngineConfig, PlayerState};

    fn engine_with_log() -> (ActivityEngine, Arc<Mutex<Vec<ActivityEventKind>>>) {
        let bus = Arc::new(EventBus::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        bus.subscribe::<ActivityEvent, _>(move |event| sink.lock().unwrap().push(event.kind));

        let catalog = CatalogResolver::new(vec![Item::new(
            ItemRef::movie("Perfect Blue"),
            Some(4_860_000),
        )]);
        let engine = ActivityEngine::new(
            EngineConfig::default(),
            Arc::new(catalog),
            Arc::new(EnablementToggle::default()),
            bus,
        )
        .unwrap();
        (engine, log)
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_drives_engine() {
        let (engine, log) = engine_with_log();

        let open = PlayerSignal::Open {
            item: ItemRef::movie("Perfect Blue"),
            force: false,
        };
        assert!(dispatch(&engine, open).await.unwrap());
        assert!(dispatch(&engine, PlayerSignal::Start).await.unwrap());
        assert!(dispatch(
            &engine,
            PlayerSignal::StateChange {
                previous: PlayerState::Playing,
                current: PlayerState::Stopped,
            }
        )
        .await
        .unwrap());

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                ActivityEventKind::Created,
                ActivityEventKind::Started,
                ActivityEventKind::Stopped
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_surfaces_resolution_errors() {
        let (engine, _) = engine_with_log();
        let open = PlayerSignal::Open {
            item: ItemRef::movie("Unknown Title"),
            force: false,
        };

        let result = dispatch(&engine, open).await;
        assert!(matches!(result, Err(EngineError::Metadata(MetadataError::NotFound(_)))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_applies_delays() {
        let (engine, log) = engine_with_log();
        let script: crate::application::dto::ReplayScript = serde_json::from_str(
            r#"{"steps": [
                {"signal": "open", "item": {"kind": "movie", "title": "Perfect Blue"}},
                {"signal": "start"},
                {"signal": "pause"},
                {"after_ms": 9000, "signal": "progress", "time": 1000.0}
            ]}"#,
        )
        .unwrap();

        let results = replay(&engine, script.steps).await.unwrap();

        assert_eq!(results, vec![true, true, true, true]);
        assert_eq!(log.lock().unwrap().last(), Some(&ActivityEventKind::Paused));
        assert_eq!(
            engine.current_session().map(|s| s.state),
            Some(SessionStatus::Paused)
        );
    }
}
