//! Per-client periodic loops.
//!
//! Every subscriber gets its own loop with its own interval. A loop wakes on
//! a tokio interval, samples the shared [`MetricsSource`] on the blocking
//! pool, renders the snapshot and hands the panel to the subscriber's
//! [`Sink`]:
//!
//! ```text
//!   ticker ──▶ sample (spawn_blocking + timeout) ──▶ validate ──▶ render ──▶ sink
//!     ▲                                                                      │
//!     └───────────────── next tick (missed ticks skipped) ◀──────────────────┘
//! ```
//!
//! Loops stop when their handle is cancelled, when their sink reports it is
//! closed, or when the source becomes unavailable. A stopped loop removes
//! itself from the registry.

mod handle;
mod job;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::collector::{MetricsSource, SourceError};
use crate::config::{ConfigError, LoopConfig};
use crate::model::Snapshot;
use crate::sink::Sink;

pub use handle::{ClientId, LoopHandle, LoopId, LoopInfo, LoopState};
pub use job::BoundedCounter;

use job::{Flow, Job};

/// Shortest interval a loop may run at.
pub const MIN_INTERVAL: Duration = Duration::from_millis(10);

type Registry = Arc<Mutex<HashMap<LoopId, LoopHandle>>>;

/// Owns the set of active loops and spawns new ones onto a tokio runtime.
pub struct Scheduler {
    source: Arc<dyn MetricsSource>,
    config: LoopConfig,
    runtime: Handle,
    next_id: AtomicU64,
    loops: Registry,
}

impl Scheduler {
    /// Creates a scheduler that spawns loops onto `runtime`.
    pub fn new(
        source: Arc<dyn MetricsSource>,
        config: LoopConfig,
        runtime: Handle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            source,
            config,
            runtime,
            next_id: AtomicU64::new(1),
            loops: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<dyn MetricsSource> {
        &self.source
    }

    /// Starts a metrics loop for `client` that feeds `sink` every `interval`.
    ///
    /// The first tick happens after the configured initial delay. Several
    /// loops for the same client may coexist.
    pub fn subscribe(
        &self,
        client: impl Into<ClientId>,
        interval: Duration,
        sink: Arc<dyn Sink>,
    ) -> LoopHandle {
        let job = Job::metrics(Arc::clone(&self.source), sink, self.config.sample_timeout);
        let handle = self.spawn(client.into(), interval, self.config.initial_delay, job);
        info!(
            loop_id = handle.id(),
            client = %handle.client(),
            interval_ms = handle.interval().as_millis() as u64,
            "subscribed"
        );
        handle
    }

    /// Starts a loop that calls `on_step(0..total)` once per `interval` and
    /// cancels itself after the last step.
    pub fn spawn_bounded(
        &self,
        client: impl Into<ClientId>,
        interval: Duration,
        total: usize,
        on_step: impl FnMut(usize) + Send + 'static,
    ) -> LoopHandle {
        let job = Job::bounded(total, on_step);
        let handle = self.spawn(client.into(), interval, interval, job);
        debug!(loop_id = handle.id(), client = %handle.client(), total, "bounded loop started");
        handle
    }

    /// Cancels one loop. Returns `false` if it had already stopped.
    pub fn cancel(&self, handle: &LoopHandle) -> bool {
        let was_active = !handle.is_cancelled();
        handle.cancel();
        if was_active {
            debug!(loop_id = handle.id(), client = %handle.client(), "loop cancelled");
        }
        was_active
    }

    /// Cancels every loop owned by `client`. Returns how many were cancelled.
    pub fn cancel_client(&self, client: &ClientId) -> usize {
        let handles: Vec<LoopHandle> = self
            .registry()
            .values()
            .filter(|h| h.client() == client)
            .cloned()
            .collect();
        let count = handles.iter().filter(|h| self.cancel(h)).count();
        if count > 0 {
            info!(client = %client, count, "client loops cancelled");
        }
        count
    }

    /// Cancels all loops.
    pub fn shutdown(&self) {
        let handles: Vec<LoopHandle> = self.registry().values().cloned().collect();
        for handle in &handles {
            handle.cancel();
        }
        info!(count = handles.len(), "scheduler shut down");
    }

    /// Lists loops that have not stopped yet, ordered by id.
    pub fn active(&self) -> Vec<LoopInfo> {
        let mut infos: Vec<LoopInfo> = self.registry().values().map(|h| h.info()).collect();
        infos.sort_by_key(|info| info.id);
        infos
    }

    pub fn active_count(&self) -> usize {
        self.registry().len()
    }

    /// Takes one sample outside any loop, with the same timeout and
    /// partial-read handling as a tick.
    pub async fn sample_now(&self) -> Result<Snapshot, SourceError> {
        let result = job::sample_with_timeout(&self.source, self.config.sample_timeout).await;
        crate::collector::usable(result)
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<LoopId, LoopHandle>> {
        self.loops.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn spawn(&self, client: ClientId, interval: Duration, delay: Duration, job: Job) -> LoopHandle {
        let interval = if interval < MIN_INTERVAL {
            warn!(
                requested_ms = interval.as_millis() as u64,
                min_ms = MIN_INTERVAL.as_millis() as u64,
                "interval too short, clamping"
            );
            MIN_INTERVAL
        } else {
            interval
        };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = LoopHandle::new(id, client, interval);
        self.registry().insert(id, handle.clone());
        self.runtime
            .spawn(run_loop(handle.clone(), job, delay, Arc::clone(&self.loops)));
        handle
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for handle in self.registry().values() {
            handle.cancel();
        }
    }
}

async fn run_loop(handle: LoopHandle, mut job: Job, delay: Duration, loops: Registry) {
    let mut ticker = tokio::time::interval_at(Instant::now() + delay, handle.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut delivered: u64 = 0;

    while !handle.is_cancelled() && !job.is_finished() {
        tokio::select! {
            biased;
            _ = handle.cancel_requested() => break,
            _ = ticker.tick() => {}
        }
        if handle.is_cancelled() {
            break;
        }
        match job.tick(&handle).await {
            Flow::Delivered => {
                delivered += 1;
                if handle.state() == LoopState::Starting {
                    handle.set_state(LoopState::Running);
                }
            }
            Flow::Skipped => {}
            Flow::Stop => break,
        }
    }

    loops
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .remove(&handle.id());
    handle.finish();
    debug!(loop_id = handle.id(), client = %handle.client(), delivered, "loop stopped");
}
