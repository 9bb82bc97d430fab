// src/services/scheduler.rs
//
// Cancellable delayed actions.
//
// The engine keeps one handle per pending action and always cancels the old
// handle before storing a new one. Actions still re-check engine state when
// they fire: cancelling a task that is already running is best-effort.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::{EngineError, EngineResult};

/// Spawns delayed actions on the runtime the engine was built in
#[derive(Debug, Clone)]
pub struct Scheduler {
    runtime: Handle,
}

impl Scheduler {
    /// Capture the current Tokio runtime
    pub fn current() -> EngineResult<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            EngineError::Other(format!("scheduler needs a Tokio runtime: {}", e))
        })?;
        Ok(Self { runtime })
    }

    /// Run `action` after `delay` unless the returned handle is cancelled first
    pub fn schedule<F>(&self, delay: Duration, action: F) -> TimerHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });
        TimerHandle { task }
    }
}

/// Handle to a scheduled action
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_action_runs_after_delay() {
        let scheduler = Scheduler::current().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);

        let handle = scheduler.schedule(Duration::from_millis(500), async move {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_action_never_runs() {
        let scheduler = Scheduler::current().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);

        let handle = scheduler.schedule(Duration::from_millis(500), async move {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_requires_runtime() {
        assert!(Scheduler::current().is_err());
    }
}
