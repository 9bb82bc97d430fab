// demos/watch_session.rs
//
// WATCH SESSION WALKTHROUGH
//
// PURPOSE:
// - Show the activity lifecycle end to end on a real clock
// - created -> started -> progress -> paused -> started -> stopped
// - Events are observed via EventBus::subscribe (public API)
//
// Timings are shortened so the walkthrough finishes in a few seconds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use activity_engine::{
    init_activity_subsystem, ActivityConfig, ActivityEvent, CatalogResolver, EnablementToggle,
    EngineConfig, EventBus, Item, ItemRef,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== WATCH SESSION WALKTHROUGH ===");
    println!();

    // =========================================================================
    // 1. SETUP
    // =========================================================================
    let episode = ItemRef::episode("Kaiba", Some(1), 1).with_id("anilist", "5227");
    let resolver = Arc::new(CatalogResolver::new(vec![Item::new(episode.clone(), Some(6_000))]));
    let toggle = Arc::new(EnablementToggle::default());
    let event_bus = Arc::new(EventBus::new());

    let observed = Arc::new(AtomicUsize::new(0));
    let observed_clone = Arc::clone(&observed);
    event_bus.subscribe::<ActivityEvent, _>(move |event| {
        observed_clone.fetch_add(1, Ordering::SeqCst);
        println!(
            "  [OBSERVED] {:<18} time={:?} progress={:?}",
            event.kind.name(),
            event.session.time,
            event.session.progress
        );
    });

    let config = ActivityConfig {
        engine: EngineConfig {
            progress_interval_ms: 1_000,
            create_debounce_ms: 100,
            stall_pause_threshold_ms: 1_000,
            pause_confirmation_ms: 800,
            seek_threshold_ms: 3_000,
            ..EngineConfig::default()
        },
        log_events: false,
    };

    let engine = init_activity_subsystem(resolver, toggle, Arc::clone(&event_bus), config)?;

    // =========================================================================
    // 2. OPEN AND PLAY
    // =========================================================================
    println!("[STEP] Opening {}", episode);
    engine.open(episode).await?;
    engine.start();

    let mut time = 0u64;
    while time < 3_000 {
        engine.progress(time as f64).await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        time += 250;
    }

    // =========================================================================
    // 3. PAUSE, CONFIRM, RESUME
    // =========================================================================
    println!("[STEP] Pausing");
    engine.pause();
    tokio::time::sleep(Duration::from_millis(1_000)).await;

    println!("[STEP] Resuming");
    engine.start();

    // =========================================================================
    // 4. PLAY TO THE END
    // =========================================================================
    while time <= 6_000 {
        engine.progress(time as f64).await;
        tokio::time::sleep(Duration::from_millis(250)).await;
        time += 250;
    }

    println!();
    println!("=== RESULT ===");
    println!("Events observed: {}", observed.load(Ordering::SeqCst));
    if let Some(session) = engine.current_session() {
        println!("Final state: {} at {:?}%", session.state, session.progress);
    }
    for entry in event_bus.get_event_log() {
        println!("  {} {} ({})", entry.occurred_at.to_rfc3339(), entry.event_type, entry.event_id);
    }

    Ok(())
}
