// src/services/activity_engine.rs
//
// Activity Engine - turns raw player signals into a session lifecycle
//
// CRITICAL RULES:
// - Owns exactly one current Session; every mutation goes through one lock
// - Never holds the lock across an await or while emitting events
// - Async completions carry the generation they were issued for and are
//   dropped when the engine has moved on
// - Does NOT persist anything and does NOT decide whether to record;
//   it only emits lifecycle events on the bus

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use tokio::time::Instant;
use uuid::Uuid;

use crate::domain::{ItemRef, Session, SessionSnapshot, SessionState, SessionStatus, Stall};
use crate::error::EngineResult;
use crate::events::{ActivityEvent, ActivityEventKind, EventBus};
use crate::integrations::{EnablementGate, MetadataResolver, RefreshPolicy};
use crate::services::scheduler::{Scheduler, TimerHandle};
use crate::services::state_detector::{detect_state, PlayerState};

/// Upper bound for the refresh interval, keeps the chrono conversion in range
const MAX_REFRESH_INTERVAL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum spacing between two progress events
    pub progress_interval_ms: u64,
    /// Window in which repeated creates collapse into one
    pub create_debounce_ms: u64,
    /// How long a stall lasts before it counts as a pause
    pub stall_pause_threshold_ms: u64,
    /// Delay before a tentative pause is confirmed
    pub pause_confirmation_ms: u64,
    /// Position jump treated as an intentional seek
    pub seek_threshold_ms: u64,
    /// Backward jump (percent of duration) treated as a replay from the start
    pub repeat_threshold_percent: f64,
    /// Progress at which a confirmed pause counts as completion
    pub completion_threshold_percent: f64,
    pub metadata_refresh_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: 5000,
            create_debounce_ms: 500,
            stall_pause_threshold_ms: 5000,
            pause_confirmation_ms: 8000,
            seek_threshold_ms: 15000,
            repeat_threshold_percent: -90.0,
            completion_threshold_percent: 80.0,
            metadata_refresh_interval_secs: 7 * 24 * 60 * 60,
        }
    }
}

impl EngineConfig {
    /// Load a JSON document; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn create_debounce(&self) -> Duration {
        Duration::from_millis(self.create_debounce_ms)
    }

    pub fn stall_pause_threshold(&self) -> Duration {
        Duration::from_millis(self.stall_pause_threshold_ms)
    }

    pub fn pause_confirmation(&self) -> Duration {
        Duration::from_millis(self.pause_confirmation_ms)
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        let secs = self.metadata_refresh_interval_secs.min(MAX_REFRESH_INTERVAL_SECS);
        RefreshPolicy::new(chrono::Duration::seconds(secs as i64))
    }
}

/// Everything guarded by the engine lock
#[derive(Default)]
struct EngineState {
    session: Option<Session>,
    /// Bumped whenever the current session is (about to be) replaced
    generation: u64,
    /// Bumped whenever a pending pause is cancelled or rescheduled
    pause_token: u64,
    last_progress_emit: Option<Instant>,
    pending_pause: Option<TimerHandle>,
    pending_create: Option<TimerHandle>,
}

struct EngineInner {
    client_id: Uuid,
    config: EngineConfig,
    refresh_policy: RefreshPolicy,
    resolver: Arc<dyn MetadataResolver>,
    gate: Arc<dyn EnablementGate>,
    event_bus: Arc<EventBus>,
    scheduler: Scheduler,
    state: Mutex<EngineState>,
}

enum ProgressOutcome {
    Applied(bool),
    Repeat(ItemRef),
}

enum CreatePlan {
    Done(bool),
    Resolve(u64),
}

/// The public surface player adapters talk to.
///
/// Action methods return `true` when the signal changed the session and
/// `false` when it was ignored (no session, ended session, disabled, invalid
/// input, or no transition). Only creation and adoption report errors,
/// because callers need to know whether a session now exists.
pub struct ActivityEngine {
    inner: Arc<EngineInner>,
}

impl ActivityEngine {
    /// Build an engine. Must be called from within a Tokio runtime; timers
    /// are spawned on that runtime.
    pub fn new(
        config: EngineConfig,
        resolver: Arc<dyn MetadataResolver>,
        gate: Arc<dyn EnablementGate>,
        event_bus: Arc<EventBus>,
    ) -> EngineResult<Self> {
        let scheduler = Scheduler::current()?;
        let inner = EngineInner {
            client_id: Uuid::new_v4(),
            refresh_policy: config.refresh_policy(),
            config,
            resolver,
            gate,
            event_bus,
            scheduler,
            state: Mutex::new(EngineState::default()),
        };
        debug!("Activity engine {} ready", inner.client_id);
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn client_id(&self) -> Uuid {
        self.inner.client_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.inner.event_bus
    }

    /// Snapshot of the current session, if any
    pub fn current_session(&self) -> Option<SessionSnapshot> {
        self.inner.lock_state().session.as_ref().map(Session::snapshot)
    }

    // ========================================================================
    // CREATION
    // ========================================================================

    /// Start tracking `reference`. Debounced: calls arriving within the
    /// debounce window collapse into the last one, and the collapsed calls
    /// resolve `Ok(false)`.
    pub async fn create(&self, reference: ItemRef) -> EngineResult<bool> {
        self.create_with(reference, false).await
    }

    /// `create` with duplicate suppression optionally bypassed
    pub async fn create_with(&self, reference: ItemRef, force: bool) -> EngineResult<bool> {
        let (tx, rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        {
            let mut st = self.inner.lock_state();
            let handle = self
                .inner
                .scheduler
                .schedule(self.inner.config.create_debounce(), async move {
                    let result = inner.create_now(reference, force).await;
                    let _ = tx.send(result);
                });
            if let Some(previous) = st.pending_create.replace(handle) {
                previous.cancel();
            }
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => {
                debug!("Create collapsed into a later call");
                Ok(false)
            }
        }
    }

    /// Player opened a title
    pub async fn open(&self, reference: ItemRef) -> EngineResult<bool> {
        self.create(reference).await
    }

    /// Player closed the current title
    pub fn close(&self) -> bool {
        self.stop()
    }

    // ========================================================================
    // PLAYER SIGNALS
    // ========================================================================

    pub fn start(&self) -> bool {
        if !self.enabled("start") {
            return false;
        }
        let inner = &self.inner;
        inner.with_state(|st, out| inner.start_locked(st, out))
    }

    /// New position sample, in milliseconds
    pub async fn progress(&self, time: f64) -> bool {
        let Some(time) = position_ms(time) else {
            warn!("Ignoring progress with invalid position {}", time);
            return false;
        };
        if !self.enabled("progress") {
            return false;
        }

        let inner = &self.inner;
        match inner.with_state(|st, out| inner.progress_locked(st, out, time)) {
            ProgressOutcome::Applied(applied) => applied,
            ProgressOutcome::Repeat(reference) => {
                match inner.create_now(reference, true).await {
                    Ok(created) => created,
                    Err(e) => {
                        warn!("Could not start a new session for the replay: {}", e);
                        false
                    }
                }
            }
        }
    }

    /// Player jumped to a new position, in milliseconds
    pub fn seek(&self, time: f64) -> bool {
        let Some(time) = position_ms(time) else {
            warn!("Ignoring seek with invalid position {}", time);
            return false;
        };
        if !self.enabled("seek") {
            return false;
        }
        let inner = &self.inner;
        inner.with_state(|st, out| inner.seek_locked(st, out, time))
    }

    pub fn pause(&self) -> bool {
        if !self.enabled("pause") {
            return false;
        }
        let inner = &self.inner;
        inner.with_state(|st, out| inner.pause_locked(st, out))
    }

    /// Not gated: cleanup must happen even while tracking is disabled
    pub fn stop(&self) -> bool {
        let inner = &self.inner;
        inner.with_state(|st, out| inner.stop_locked(st, out))
    }

    /// Player reported a state change. Dispatches on `current`.
    pub fn state_change(&self, previous: PlayerState, current: PlayerState) -> bool {
        if previous == current {
            debug!("Ignoring state change {:?} -> {:?}", previous, current);
            return false;
        }
        if current != PlayerState::Stopped && !self.enabled("state change") {
            return false;
        }
        let inner = &self.inner;
        inner.with_state(|st, out| inner.apply_player_state(st, out, current, Instant::now()))
    }

    /// Internal failure: ends the session without a stopped event
    pub fn error(&self, message: &str) -> bool {
        let inner = &self.inner;
        inner.with_state(|st, _| inner.error_locked(st, message))
    }

    // ========================================================================
    // RELAY
    // ========================================================================

    /// Take over a session learned about from elsewhere (another engine
    /// instance, a relayed event). Refreshes its metadata when stale;
    /// refresh failures are logged and the session keeps what it has.
    pub async fn adopt(&self, snapshot: SessionSnapshot) -> EngineResult<bool> {
        let session = Session::try_from(snapshot)?;
        if session.is_ended() {
            debug!("Ignoring adoption of ended session {}", session.id);
            return Ok(false);
        }

        let inner = &self.inner;
        let item = session.item.clone();
        let needs_refresh = inner.refresh_policy.needs_refresh(&item, Utc::now());

        let generation = inner.with_state(|st, out| {
            let replaces_other = st
                .session
                .as_ref()
                .is_some_and(|current| current.id != session.id && !current.is_ended());
            if replaces_other {
                inner.stop_locked(st, out);
            }

            if let Some(pending) = st.pending_create.take() {
                pending.cancel();
            }
            EngineInner::cancel_pending_pause(st);
            st.generation += 1;
            st.last_progress_emit = None;

            info!(
                "Adopted session {} ({}) from client {}",
                session.id, session.item.reference, session.client_id
            );
            let pausing = session.status() == SessionStatus::Pausing;
            st.session = Some(session);
            if pausing {
                inner.schedule_pause_confirmation(st);
            }
            st.generation
        });

        if !needs_refresh {
            return Ok(true);
        }

        match inner.resolver.refresh(&item).await {
            Ok(refreshed) => inner.with_state(|st, _| {
                if st.generation != generation {
                    debug!("Discarding refreshed metadata for {}: superseded", item.reference);
                    return;
                }
                if let Some(session) = st.session.as_mut() {
                    debug!("Refreshed metadata for session {}", session.id);
                    session.item = refreshed;
                }
            }),
            Err(e) => warn!("Metadata refresh failed for {}: {}", item.reference, e),
        }

        Ok(true)
    }

    /// Cancel every pending delayed action and invalidate in-flight
    /// resolutions. The current session is left as it is.
    pub fn dispose(&self) {
        let mut st = self.inner.lock_state();
        if let Some(pending) = st.pending_create.take() {
            pending.cancel();
        }
        EngineInner::cancel_pending_pause(&mut st);
        st.generation += 1;
        debug!("Activity engine {} disposed", self.inner.client_id);
    }

    fn enabled(&self, action: &str) -> bool {
        if self.inner.gate.is_enabled() {
            true
        } else {
            debug!("Ignoring {}: activity tracking disabled", action);
            false
        }
    }
}

impl Drop for ActivityEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl EngineInner {
    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the lock, then emit whatever it queued
    fn with_state<R>(&self, f: impl FnOnce(&mut EngineState, &mut Vec<ActivityEvent>) -> R) -> R {
        let mut events = Vec::new();
        let result = {
            let mut st = self.lock_state();
            f(&mut st, &mut events)
        };
        for event in events {
            self.event_bus.emit(event);
        }
        result
    }

    fn cancel_pending_pause(st: &mut EngineState) {
        if let Some(pending) = st.pending_pause.take() {
            pending.cancel();
        }
        st.pause_token += 1;
    }

    async fn create_now(self: &Arc<Self>, reference: ItemRef, force: bool) -> EngineResult<bool> {
        let plan = self.with_state(|st, out| {
            if let Some(session) = st.session.as_ref() {
                if !force && !session.is_ended() && session.item.matches(&reference) {
                    let later_signal = session.progress().is_some_and(|p| p >= 1.0);
                    if later_signal && self.gate.is_enabled() {
                        debug!("Session {} already tracks {}; starting it", session.id, reference);
                        return CreatePlan::Done(self.start_locked(st, out));
                    }
                    debug!("Ignoring duplicate create for {}", reference);
                    return CreatePlan::Done(false);
                }
            }
            st.generation += 1;
            CreatePlan::Resolve(st.generation)
        });

        let generation = match plan {
            CreatePlan::Done(result) => return Ok(result),
            CreatePlan::Resolve(generation) => generation,
        };

        debug!("Resolving metadata for {} (generation {})", reference, generation);
        let item = match self.resolver.resolve(&reference).await {
            Ok(item) => item,
            Err(e) => {
                error!("Failed to resolve metadata for {}: {}", reference, e);
                return Err(e.into());
            }
        };

        Ok(self.with_state(|st, out| {
            if st.generation != generation {
                debug!("Discarding metadata for {}: superseded", reference);
                return false;
            }

            if st.session.as_ref().is_some_and(|s| !s.is_ended()) {
                self.stop_locked(st, out);
            }
            Self::cancel_pending_pause(st);

            let session = Session::new(self.client_id, item);
            info!("Session {} created for {}", session.id, session.item.reference);
            // Created goes out even without a duration: resolution just finished
            out.push(ActivityEvent::new(ActivityEventKind::Created, session.snapshot()));
            st.session = Some(session);
            st.last_progress_emit = None;
            true
        }))
    }

    fn progress_locked(
        self: &Arc<Self>,
        st: &mut EngineState,
        out: &mut Vec<ActivityEvent>,
        time: u64,
    ) -> ProgressOutcome {
        let now = Instant::now();

        let (proposal, jump) = {
            let Some(session) = st.session.as_ref() else {
                debug!("Ignoring progress: no session");
                return ProgressOutcome::Applied(false);
            };
            let Some(duration) = session.item.known_duration() else {
                debug!("Ignoring progress for session {}: duration unknown", session.id);
                return ProgressOutcome::Applied(false);
            };
            if session.is_ended() {
                debug!("Ignoring progress for ended session {}", session.id);
                return ProgressOutcome::Applied(false);
            }

            let proposal =
                detect_state(session, time, now, self.config.stall_pause_threshold());

            // Without a baseline there is nothing to jump from
            let (jump, delta_percent) = match session.time {
                Some(previous) if session.status() == SessionStatus::Playing => (
                    time.abs_diff(previous),
                    (time as f64 - previous as f64) / duration as f64 * 100.0,
                ),
                _ => (0, 0.0),
            };

            if delta_percent < self.config.repeat_threshold_percent {
                info!(
                    "Session {} jumped back {:.2}%; treating as a replay of {}",
                    session.id, -delta_percent, session.item.reference
                );
                return ProgressOutcome::Repeat(session.item.reference.clone());
            }

            (proposal, jump)
        };

        if jump > self.config.seek_threshold_ms {
            self.seek_locked(st, out, time);
        }

        let current = match st.session.as_mut() {
            Some(session) => {
                session.set_time(time);
                session.status()
            }
            None => return ProgressOutcome::Applied(false),
        };

        if let Some(proposal) = proposal {
            if proposal.status() != current {
                return ProgressOutcome::Applied(self.apply_player_state(st, out, proposal, now));
            }
        }

        if current != SessionStatus::Playing {
            return ProgressOutcome::Applied(true);
        }

        let finished = st
            .session
            .as_ref()
            .and_then(Session::progress)
            .is_some_and(|p| p >= 100.0);
        if finished {
            return ProgressOutcome::Applied(self.stop_locked(st, out));
        }

        let interval = self.config.progress_interval();
        let due = st
            .last_progress_emit
            .map_or(true, |last| now.duration_since(last) >= interval);
        if due {
            if let Some(session) = st.session.as_ref() {
                push_event(out, session, ActivityEventKind::Progress);
            }
            st.last_progress_emit = Some(now);
        }
        ProgressOutcome::Applied(true)
    }

    fn seek_locked(
        self: &Arc<Self>,
        st: &mut EngineState,
        out: &mut Vec<ActivityEvent>,
        time: u64,
    ) -> bool {
        let Some(session) = st.session.as_mut() else {
            debug!("Ignoring seek: no session");
            return false;
        };
        if session.is_ended() {
            debug!("Ignoring seek for ended session {}", session.id);
            return false;
        }

        let previous = session.time;
        if let Some(previous) = previous {
            let jump = time.abs_diff(previous);
            if jump <= self.config.seek_threshold_ms {
                debug!("Ignoring seek of {}ms for session {}", jump, session.id);
                return false;
            }
        }

        session.set_time(time);
        if session.status() != SessionStatus::Playing {
            // Seek before playback starts is the initial position
            return self.start_locked(st, out);
        }
        if previous.is_none() {
            debug!("Session {} starts at {}", session.id, time);
            return true;
        }

        debug!("Session {} seeked from {:?} to {}", session.id, previous, time);
        push_event(out, session, ActivityEventKind::Seeked);
        true
    }

    fn apply_player_state(
        self: &Arc<Self>,
        st: &mut EngineState,
        out: &mut Vec<ActivityEvent>,
        state: PlayerState,
        now: Instant,
    ) -> bool {
        match state {
            PlayerState::Playing => self.start_locked(st, out),
            PlayerState::Paused => self.pause_locked(st, out),
            PlayerState::Stalled => Self::stall_locked(st, now),
            PlayerState::Stopped => self.stop_locked(st, out),
        }
    }

    fn start_locked(self: &Arc<Self>, st: &mut EngineState, out: &mut Vec<ActivityEvent>) -> bool {
        Self::cancel_pending_pause(st);

        let Some(session) = st.session.as_mut() else {
            debug!("Ignoring start: no session");
            return false;
        };

        let resumed = match session.state() {
            SessionState::Stalled(stall) => {
                Some(SessionState::from_status(stall.previous).unwrap_or(SessionState::Created))
            }
            _ => None,
        };
        let resumed_from_stall = resumed.is_some();
        if let Some(resumed) = resumed {
            if !transition(session, resumed) {
                return false;
            }
            debug!("Session {} resumed from stall as {}", session.id, session.status());
        }

        match session.status() {
            SessionStatus::Created | SessionStatus::Paused => {
                if session.progress().is_none() {
                    debug!("Ignoring start for session {}: duration unknown", session.id);
                    return resumed_from_stall;
                }
                if !transition(session, SessionState::Playing) {
                    return resumed_from_stall;
                }
                info!("Session {} started ({})", session.id, session.item.reference);
                push_event(out, session, ActivityEventKind::Started);
                true
            }
            SessionStatus::Pausing => {
                if !transition(session, SessionState::Playing) {
                    return false;
                }
                debug!("Session {} resumed before pause confirmation", session.id);
                true
            }
            SessionStatus::Playing => {
                if !resumed_from_stall {
                    debug!("Session {} already playing", session.id);
                }
                resumed_from_stall
            }
            SessionStatus::Stalled | SessionStatus::Ended => {
                debug!("Ignoring start for session {} in state {}", session.id, session.status());
                false
            }
        }
    }

    fn pause_locked(self: &Arc<Self>, st: &mut EngineState, out: &mut Vec<ActivityEvent>) -> bool {
        let Some(session) = st.session.as_mut() else {
            debug!("Ignoring pause: no session");
            return false;
        };

        match session.state().clone() {
            SessionState::Playing => {
                if !transition(session, SessionState::Pausing) {
                    return false;
                }
                debug!(
                    "Session {} pausing; confirming in {}ms",
                    session.id, self.config.pause_confirmation_ms
                );
                self.schedule_pause_confirmation(st);
                true
            }
            SessionState::Stalled(stall) if stall.previous == SessionStatus::Playing => {
                if !transition(session, SessionState::Paused) {
                    return false;
                }
                info!("Session {} paused after stalling", session.id);
                push_event(out, session, ActivityEventKind::Paused);
                true
            }
            SessionState::Pausing | SessionState::Paused => {
                debug!("Session {} already {}", session.id, session.status());
                false
            }
            other => {
                debug!("Ignoring pause for session {} in state {}", session.id, other.status());
                false
            }
        }
    }

    fn schedule_pause_confirmation(self: &Arc<Self>, st: &mut EngineState) {
        Self::cancel_pending_pause(st);
        let Some(session_id) = st.session.as_ref().map(|s| s.id) else {
            return;
        };
        let token = st.pause_token;
        let inner = Arc::downgrade(self);

        let handle = self
            .scheduler
            .schedule(self.config.pause_confirmation(), async move {
                if let Some(inner) = inner.upgrade() {
                    inner.confirm_pause(session_id, token);
                }
            });
        st.pending_pause = Some(handle);
    }

    /// Only the timer armed by the latest pause, for the same session, may
    /// confirm it. Pending resolutions do not invalidate it: a failed create
    /// leaves the session as it was.
    fn confirm_pause(&self, session_id: Uuid, token: u64) {
        self.with_state(|st, out| {
            let same_session = st.session.as_ref().is_some_and(|s| s.id == session_id);
            if st.pause_token != token || !same_session {
                debug!("Discarding stale pause confirmation");
                return;
            }
            st.pending_pause = None;

            let Some(session) = st.session.as_mut() else {
                return;
            };
            if session.status() != SessionStatus::Pausing {
                return;
            }

            let completed = session
                .progress()
                .is_some_and(|p| p >= self.config.completion_threshold_percent);

            if completed {
                if transition(session, SessionState::Ended { at: Utc::now() }) {
                    info!(
                        "Session {} paused at {:?}%; treating as completed",
                        session.id,
                        session.progress()
                    );
                    push_event(out, session, ActivityEventKind::Stopped);
                }
            } else if transition(session, SessionState::Paused) {
                info!("Session {} paused", session.id);
                push_event(out, session, ActivityEventKind::Paused);
            }
        });
    }

    fn stall_locked(st: &mut EngineState, now: Instant) -> bool {
        let Some(session) = st.session.as_mut() else {
            return false;
        };
        let status = session.status();
        match status {
            SessionStatus::Created | SessionStatus::Playing => {
                let stalled = transition(session, SessionState::Stalled(Stall::begin(status, now)));
                if stalled {
                    debug!("Session {} stalled at {:?}", session.id, session.time);
                }
                stalled
            }
            _ => {
                debug!("Ignoring stall for session {} in state {}", session.id, status);
                false
            }
        }
    }

    fn stop_locked(self: &Arc<Self>, st: &mut EngineState, out: &mut Vec<ActivityEvent>) -> bool {
        let Some(session) = st.session.as_ref() else {
            debug!("Ignoring stop: no session");
            return false;
        };

        let effective = match session.state() {
            SessionState::Stalled(stall) => stall.previous,
            state => state.status(),
        };
        match effective {
            SessionStatus::Playing | SessionStatus::Pausing | SessionStatus::Paused => {}
            SessionStatus::Created => {
                // A session that stalls before ever starting is dropped silently
                debug!("Ignoring stop for session {}: never started", session.id);
                return false;
            }
            SessionStatus::Stalled | SessionStatus::Ended => {
                debug!("Ignoring stop for session {}: already {}", session.id, session.status());
                return false;
            }
        }

        Self::cancel_pending_pause(st);
        let Some(session) = st.session.as_mut() else {
            return false;
        };
        if !transition(session, SessionState::Ended { at: Utc::now() }) {
            return false;
        }
        info!("Session {} stopped at {:?}%", session.id, session.progress());
        push_event(out, session, ActivityEventKind::Stopped);
        true
    }

    fn error_locked(&self, st: &mut EngineState, message: &str) -> bool {
        match st.session.as_ref() {
            Some(session) if !session.is_ended() => {}
            _ => {
                debug!("Ignoring error without a live session: {}", message);
                return false;
            }
        }

        Self::cancel_pending_pause(st);
        let Some(session) = st.session.as_mut() else {
            return false;
        };
        error!("Session {} ended by error: {}", session.id, message);
        transition(session, SessionState::Ended { at: Utc::now() })
    }
}

/// Apply a transition, logging rejections instead of propagating them
fn transition(session: &mut Session, next: SessionState) -> bool {
    match session.transition(next) {
        Ok(()) => true,
        Err(e) => {
            warn!("Session {}: {}", session.id, e);
            false
        }
    }
}

/// Queue an event; sessions without a duration stay silent
fn push_event(out: &mut Vec<ActivityEvent>, session: &Session, kind: ActivityEventKind) {
    if !session.is_valid() {
        debug!("Suppressing {} for session {}: duration unknown", kind, session.id);
        return;
    }
    out.push(ActivityEvent::new(kind, session.snapshot()));
}

/// Player positions arrive as float milliseconds
fn position_ms(time: f64) -> Option<u64> {
    if time.is_finite() && time >= 0.0 {
        Some(time.round() as u64)
    } else {
        None
    }
}
