// ── Cancellable debounce timer ──
//
// `schedule` arms a timer; arming again before it elapses cancels the
// previous one. Only the last task of a burst runs, one window after the
// last call. Time comes from tokio, so tests drive it with a paused clock.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::trace;

#[derive(Debug, Default)]
struct Pending {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Trailing-edge debouncer.
///
/// Must be used from within a tokio runtime: `schedule` spawns.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Arc<Mutex<Pending>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Run `task` once `window` has passed without another `schedule` or
    /// `cancel`. Supersedes any timer still waiting.
    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let generation = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = pending.token.replace(token.clone()) {
                trace!(generation = pending.generation, "debounce timer superseded");
                previous.cancel();
            }
            pending.generation += 1;
            pending.generation
        };

        let window = self.window;
        let pending = Arc::clone(&self.pending);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                () = tokio::time::sleep(window) => {
                    {
                        let mut slot = pending.lock().unwrap_or_else(PoisonError::into_inner);
                        if slot.generation == generation {
                            slot.token = None;
                        }
                    }
                    task.await;
                }
            }
        });
    }

    /// Disarm the waiting timer, if any. A task already running is not
    /// interrupted.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = pending.token.take() {
            token.cancel();
        }
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
