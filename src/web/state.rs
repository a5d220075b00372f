//! Shared state of the HTTP surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;

use crate::scheduler::Scheduler;

pub struct WebState {
    pub(crate) scheduler: Arc<Scheduler>,
    pub(crate) default_interval: Duration,
    pub(crate) connections: AtomicUsize,
    next_client: AtomicU64,
}

impl WebState {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        let default_interval = scheduler.config().interval;
        Self {
            scheduler,
            default_interval,
            connections: AtomicUsize::new(0),
            next_client: AtomicU64::new(1),
        }
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// Client id for a stream that did not name itself.
    pub(crate) fn anonymous_client(&self) -> String {
        format!("sse-{}", self.next_client.fetch_add(1, Ordering::Relaxed))
    }
}

pub(crate) type AppState = State<Arc<WebState>>;
