//! Generic fixed-interval polling engine.
//!
//! A [`Poller`] probes an async source immediately on start and then on a
//! fixed interval until a stop condition holds or it is cancelled. Probe
//! errors are recorded in the observable snapshot and never halt the loop;
//! results that arrive after cancellation are discarded.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use upcrib_core::Result;

/// Why a poller stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stop predicate matched a probe result.
    Satisfied,
    /// `stop()` was called or the poller was dropped.
    Cancelled,
    /// An attempt or deadline bound was exhausted first.
    Exhausted,
}

/// Poller lifecycle: `Idle` before the first `start()`, `Polling` while the
/// loop runs, `Stopped` once it ends for any reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
    Stopped(StopReason),
}

/// Observable polling state, cloned out on demand.
#[derive(Debug, Clone)]
pub struct PollSnapshot<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub loading: bool,
    pub attempts: u32,
    pub state: PollerState,
}

impl<T> Default for PollSnapshot<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            attempts: 0,
            state: PollerState::Idle,
        }
    }
}

/// Stop condition for a polling loop: a predicate over successful probe
/// results, optionally bounded by an attempt count and/or a wall-clock
/// deadline measured from `start()`.
pub struct StopWhen<T> {
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
    max_attempts: Option<u32>,
    deadline: Option<Duration>,
}

impl<T> StopWhen<T> {
    pub fn result(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            max_attempts: None,
            deadline: None,
        }
    }

    /// Never stop on a result; run until a bound trips or `stop()` is called.
    pub fn never() -> Self {
        Self::result(|_| false)
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn deadline(mut self, after: Duration) -> Self {
        self.deadline = Some(after);
        self
    }
}

struct ActivePoll {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Fixed-interval poller over an async probe.
///
/// `start()` transitions `Idle → Polling` and spawns the loop; the loop
/// transitions to `Stopped` exactly once. A second `start()` while polling
/// is a no-op.
pub struct Poller<T> {
    snapshot: Arc<RwLock<PollSnapshot<T>>>,
    active: std::sync::Mutex<Option<ActivePoll>>,
}

impl<T> Default for Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(PollSnapshot::default())),
            active: std::sync::Mutex::new(None),
        }
    }

    pub async fn snapshot(&self) -> PollSnapshot<T> {
        self.snapshot.read().await.clone()
    }

    fn is_active(&self) -> bool {
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.as_ref().is_some_and(|a| !a.handle.is_finished())
    }

    /// Starts the polling loop. The first probe fires immediately; later
    /// probes fire every `interval` until `stop_when` is satisfied, a bound
    /// trips, or the poller is stopped.
    pub async fn start<F, Fut>(&self, probe: F, interval: Duration, stop_when: StopWhen<T>)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if self.is_active() {
            return;
        }

        // The fresh Polling snapshot is published before the loop exists, so
        // a probe that finishes instantly cannot have its final state
        // overwritten by the caller.
        *self.snapshot.write().await = PollSnapshot {
            state: PollerState::Polling,
            loading: true,
            ..PollSnapshot::default()
        };

        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = active.as_ref() {
            if !existing.handle.is_finished() {
                return;
            }
        }
        let token = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            Arc::clone(&self.snapshot),
            token.clone(),
            probe,
            interval,
            stop_when,
        ));
        *active = Some(ActivePoll { token, handle });
    }

    /// Cancels the loop. In-flight probe results are discarded.
    pub async fn stop(&self) {
        let taken = {
            let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
            active.take()
        };
        if let Some(active) = taken {
            active.token.cancel();
            let _ = active.handle.await;
        }
        let mut snapshot = self.snapshot.write().await;
        if snapshot.state == PollerState::Polling {
            snapshot.state = PollerState::Stopped(StopReason::Cancelled);
            snapshot.loading = false;
        }
    }

    /// Waits for the loop to end on its own (stop condition or bound).
    pub async fn wait(&self) {
        let taken = {
            let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
            active.take()
        };
        if let Some(active) = taken {
            let _ = active.handle.await;
        }
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(active) = active.take() {
                active.token.cancel();
            }
        }
    }
}

async fn poll_loop<T, F, Fut>(
    snapshot: Arc<RwLock<PollSnapshot<T>>>,
    token: CancellationToken,
    probe: F,
    interval: Duration,
    stop_when: StopWhen<T>,
) where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send,
{
    let started = Instant::now();
    let deadline = stop_when.deadline.map(|after| started + after);

    loop {
        let result = tokio::select! {
            _ = token.cancelled() => break,
            result = probe() => result,
        };

        // The token is checked before every state write so a probe that
        // resolves after stop() cannot overwrite the final snapshot.
        if token.is_cancelled() {
            break;
        }

        let satisfied = {
            let mut snap = snapshot.write().await;
            snap.attempts += 1;
            snap.loading = false;
            match result {
                Ok(value) => {
                    let satisfied = (stop_when.predicate)(&value);
                    snap.data = Some(value);
                    snap.error = None;
                    satisfied
                }
                Err(err) => {
                    tracing::debug!(error = %err, "poll probe failed");
                    snap.error = Some(err.user_message());
                    false
                }
            }
        };

        if satisfied {
            finish(&snapshot, StopReason::Satisfied).await;
            return;
        }

        let attempts = snapshot.read().await.attempts;
        if stop_when.max_attempts.is_some_and(|max| attempts >= max) {
            finish(&snapshot, StopReason::Exhausted).await;
            return;
        }
        // Do not schedule a probe that would fire past the deadline.
        if deadline.is_some_and(|d| Instant::now() + interval >= d) {
            finish(&snapshot, StopReason::Exhausted).await;
            return;
        }

        tokio::select! {
            _ = token.cancelled() => break,
            _ = time::sleep(interval) => {}
        }
    }

    if !token.is_cancelled() {
        return;
    }
    finish(&snapshot, StopReason::Cancelled).await;
}

async fn finish<T>(snapshot: &Arc<RwLock<PollSnapshot<T>>>, reason: StopReason) {
    let mut snap = snapshot.write().await;
    snap.state = PollerState::Stopped(reason);
    snap.loading = false;
}
