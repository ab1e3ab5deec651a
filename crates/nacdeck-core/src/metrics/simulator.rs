// ── Metrics simulator lifecycle ──
//
// Drives a MetricsSource on a fixed interval. One simulator owns at
// most one timer task; start/stop are idempotent and dropping the
// simulator cancels whatever is still running.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::MetricsSnapshot;
use super::generator::MetricsSource;
use crate::error::CoreError;

/// Shortest period the timer accepts.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

type SharedSource = Arc<Mutex<Box<dyn MetricsSource>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SimulatorState {
    /// No timer running.
    Idle,
    /// Emitting one snapshot per interval.
    Running,
}

struct Run {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Counts live timer tasks; decremented when the task's future is dropped.
struct TimerGuard(Arc<AtomicUsize>);

impl TimerGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Explicitly owned metrics service with a start/stop lifecycle.
pub struct MetricsSimulator {
    source: SharedSource,
    interval: Duration,
    state: watch::Sender<SimulatorState>,
    snapshot: Arc<watch::Sender<Arc<MetricsSnapshot>>>,
    /// Parent of every run's token; cancelled on drop.
    cancel: CancellationToken,
    run: Mutex<Option<Run>>,
    active_timers: Arc<AtomicUsize>,
}

impl MetricsSimulator {
    /// Build an idle simulator. The source's initial snapshot is
    /// available immediately.
    pub fn new(source: impl MetricsSource + 'static, interval: Duration) -> Self {
        let mut source: Box<dyn MetricsSource> = Box::new(source);
        let initial = source.initial(Utc::now());
        let (state, _) = watch::channel(SimulatorState::Idle);
        let (snapshot, _) = watch::channel(Arc::new(initial));

        Self {
            source: Arc::new(Mutex::new(source)),
            interval: interval.max(MIN_INTERVAL),
            state,
            snapshot: Arc::new(snapshot),
            cancel: CancellationToken::new(),
            run: Mutex::new(None),
            active_timers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> SimulatorState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SimulatorState::Running
    }

    /// Watch lifecycle transitions.
    pub fn state_changes(&self) -> watch::Receiver<SimulatorState> {
        self.state.subscribe()
    }

    pub fn latest(&self) -> Arc<MetricsSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> MetricsStream {
        MetricsStream::new(self.snapshot.subscribe())
    }

    /// Timer tasks currently alive. Never more than one.
    pub fn active_timers(&self) -> usize {
        self.active_timers.load(Ordering::SeqCst)
    }

    /// Spawn the timer task. Returns `Ok(false)` if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<bool, CoreError> {
        let mut run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
        if run.is_some() {
            debug!("metrics simulator already running");
            return Ok(false);
        }
        if self.cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CoreError::Internal(format!("metrics simulator needs a runtime: {e}")))?;

        let cancel = self.cancel.child_token();
        let guard = TimerGuard::acquire(&self.active_timers);
        let handle = runtime.spawn(tick_task(
            Arc::clone(&self.source),
            Arc::clone(&self.snapshot),
            self.interval,
            cancel.clone(),
            guard,
        ));
        *run = Some(Run { cancel, handle });
        drop(run);

        self.state.send_replace(SimulatorState::Running);
        info!(interval_ms = self.interval.as_millis(), "metrics simulator started");
        Ok(true)
    }

    /// Cancel and join the timer task. Returns `false` if already idle.
    pub async fn stop(&self) -> bool {
        let run = self
            .run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(run) = run else {
            return false;
        };

        run.cancel.cancel();
        if let Err(e) = run.handle.await {
            warn!(error = %e, "metrics task ended abnormally");
        }

        self.state.send_replace(SimulatorState::Idle);
        info!("metrics simulator stopped");
        true
    }
}

impl Drop for MetricsSimulator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn tick_task(
    source: SharedSource,
    snapshot: Arc<watch::Sender<Arc<MetricsSnapshot>>>,
    period: Duration,
    cancel: CancellationToken,
    _guard: TimerGuard,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let previous = snapshot.borrow().clone();
                let next = {
                    let mut source = source.lock().unwrap_or_else(PoisonError::into_inner);
                    source.next(&previous, Utc::now())
                };
                debug!(tick = next.tick, "metrics tick");
                snapshot.send_replace(Arc::new(next));
            }
        }
    }
}

/// A subscription to simulated metrics.
pub struct MetricsStream {
    current: Arc<MetricsSnapshot>,
    receiver: watch::Receiver<Arc<MetricsSnapshot>>,
}

impl MetricsStream {
    fn new(receiver: watch::Receiver<Arc<MetricsSnapshot>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot seen at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<MetricsSnapshot> {
        &self.current
    }

    pub fn latest(&self) -> Arc<MetricsSnapshot> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next tick. `None` once the simulator and its task are gone.
    pub async fn changed(&mut self) -> Option<Arc<MetricsSnapshot>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = Arc::clone(&snap);
        Some(snap)
    }
}
