//! Work performed on each tick of a loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::handle::{LoopHandle, LoopState};
use crate::collector::{Field, MetricsSource, SourceError};
use crate::model::Snapshot;
use crate::render;
use crate::sink::Sink;

/// Finite step counter used by bounded loops.
///
/// Yields `0..total` once, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedCounter {
    next: usize,
    total: usize,
}

impl BoundedCounter {
    pub fn new(total: usize) -> Self {
        Self { next: 0, total }
    }

    /// Returns the next step index, or `None` once all steps were taken.
    pub fn advance(&mut self) -> Option<usize> {
        if self.next < self.total {
            let step = self.next;
            self.next += 1;
            Some(step)
        } else {
            None
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.next >= self.total
    }

    pub fn remaining(&self) -> usize {
        self.total - self.next
    }
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Something reached the client.
    Delivered,
    /// Nothing was shown this tick; the loop keeps going.
    Skipped,
    /// The loop must stop.
    Stop,
}

pub(crate) enum Job {
    Metrics {
        source: Arc<dyn MetricsSource>,
        sink: Arc<dyn Sink>,
        sample_timeout: Duration,
        last_missing: Vec<Field>,
    },
    Bounded {
        counter: BoundedCounter,
        on_step: Box<dyn FnMut(usize) + Send>,
    },
}

impl Job {
    pub(crate) fn metrics(
        source: Arc<dyn MetricsSource>,
        sink: Arc<dyn Sink>,
        sample_timeout: Duration,
    ) -> Self {
        Job::Metrics {
            source,
            sink,
            sample_timeout,
            last_missing: Vec::new(),
        }
    }

    pub(crate) fn bounded(total: usize, on_step: impl FnMut(usize) + Send + 'static) -> Self {
        Job::Bounded {
            counter: BoundedCounter::new(total),
            on_step: Box::new(on_step),
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        match self {
            Job::Metrics { .. } => false,
            Job::Bounded { counter, .. } => counter.is_exhausted(),
        }
    }

    pub(crate) async fn tick(&mut self, handle: &LoopHandle) -> Flow {
        match self {
            Job::Metrics {
                source,
                sink,
                sample_timeout,
                last_missing,
            } => metrics_tick(handle, source, sink.as_ref(), *sample_timeout, last_missing).await,
            Job::Bounded { counter, on_step } => match counter.advance() {
                Some(step) => {
                    on_step(step);
                    Flow::Delivered
                }
                None => Flow::Stop,
            },
        }
    }
}

async fn metrics_tick(
    handle: &LoopHandle,
    source: &Arc<dyn MetricsSource>,
    sink: &dyn Sink,
    sample_timeout: Duration,
    last_missing: &mut Vec<Field>,
) -> Flow {
    if sink.is_closed() {
        info!(loop_id = handle.id(), client = %handle.client(), "sink closed, cancelling loop");
        return Flow::Stop;
    }

    let t0 = Instant::now();
    let result = sample_with_timeout(source, sample_timeout).await;
    let elapsed = t0.elapsed();

    if handle.is_cancelled() {
        debug!(loop_id = handle.id(), "loop cancelled during sample, dropping result");
        return Flow::Stop;
    }

    let snapshot = match result {
        Ok(snapshot) => {
            if !last_missing.is_empty() {
                info!(loop_id = handle.id(), "all sensors readable again");
                last_missing.clear();
            }
            snapshot
        }
        Err(SourceError::PartialRead { snapshot, missing }) => {
            if *last_missing != missing {
                let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
                warn!(
                    loop_id = handle.id(),
                    source = source.name(),
                    missing = %names.join(","),
                    "partial sensor read, rendering unknown fields"
                );
                *last_missing = missing;
            }
            *snapshot
        }
        Err(e) => {
            error!(
                loop_id = handle.id(),
                client = %handle.client(),
                source = source.name(),
                error = %e,
                "metrics unavailable, cancelling loop"
            );
            sink.unavailable(&e.to_string());
            return Flow::Stop;
        }
    };

    if let Err(e) = render::validate(&snapshot) {
        error!(loop_id = handle.id(), error = %e, "inconsistent snapshot, skipping tick");
        return Flow::Skipped;
    }
    let panel = render::render(&snapshot);

    if handle.is_cancelled() {
        return Flow::Stop;
    }
    sink.display(&panel);

    let interval = handle.interval();
    if handle.state() == LoopState::Starting {
        info!(
            loop_id = handle.id(),
            client = %handle.client(),
            duration_ms = elapsed.as_millis() as u64,
            "first panel displayed"
        );
    } else {
        debug!(
            loop_id = handle.id(),
            duration_ms = elapsed.as_millis() as u64,
            "tick completed"
        );
    }
    if elapsed > interval / 2 {
        warn!(
            loop_id = handle.id(),
            duration_ms = elapsed.as_millis() as u64,
            interval_ms = interval.as_millis() as u64,
            "sample exceeded 50% of interval"
        );
    }
    Flow::Delivered
}

/// Runs one blocking sample off the async workers, bounded by `limit`.
///
/// A timeout or a panicking source is reported as `Unavailable`. Partial
/// reads are passed through untouched.
pub(crate) async fn sample_with_timeout(
    source: &Arc<dyn MetricsSource>,
    limit: Duration,
) -> Result<Snapshot, SourceError> {
    let source = Arc::clone(source);
    let task = tokio::task::spawn_blocking(move || source.sample());
    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(SourceError::unavailable(format!("sensor read failed: {}", e))),
        Err(_) => Err(SourceError::unavailable(format!(
            "sensor read timed out after {} ms",
            limit.as_millis()
        ))),
    }
}
