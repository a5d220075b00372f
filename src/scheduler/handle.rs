//! Loop handles: the cancellable side of a subscription.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Notify, watch};

/// Opaque identity of the client that owns a loop.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ClientId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

pub type LoopId = u64;

/// Lifecycle of a loop. `Cancelled` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    /// Waiting for the first successful tick.
    Starting,
    /// At least one tick reached the sink.
    Running,
    /// No further sampling will happen.
    Cancelled,
}

impl LoopState {
    pub fn as_str(self) -> &'static str {
        match self {
            LoopState::Starting => "starting",
            LoopState::Running => "running",
            LoopState::Cancelled => "cancelled",
        }
    }
}

/// Serializable view of an active loop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoopInfo {
    pub id: LoopId,
    pub client: ClientId,
    pub interval_ms: u64,
    pub state: LoopState,
}

#[derive(Debug)]
struct Shared {
    id: LoopId,
    client: ClientId,
    interval: Duration,
    cancelled: AtomicBool,
    wake: Notify,
    state: watch::Sender<LoopState>,
}

/// Handle to one periodic loop.
///
/// Cheap to clone; every clone controls the same loop. Cancelling is
/// cooperative: an in-flight tick finishes its sensor read but its panel is
/// dropped, and no further tick starts.
#[derive(Clone, Debug)]
pub struct LoopHandle {
    shared: Arc<Shared>,
}

impl LoopHandle {
    pub(crate) fn new(id: LoopId, client: ClientId, interval: Duration) -> Self {
        let (state, _) = watch::channel(LoopState::Starting);
        Self {
            shared: Arc::new(Shared {
                id,
                client,
                interval,
                cancelled: AtomicBool::new(false),
                wake: Notify::new(),
                state,
            }),
        }
    }

    pub fn id(&self) -> LoopId {
        self.shared.id
    }

    pub fn client(&self) -> &ClientId {
        &self.shared.client
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn state(&self) -> LoopState {
        *self.shared.state.borrow()
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::Acquire)
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        if !self.shared.cancelled.swap(true, Ordering::AcqRel) {
            self.shared.wake.notify_one();
        }
    }

    /// Resolves once the loop has stopped and released its resources.
    pub async fn closed(&self) {
        let mut rx = self.shared.state.subscribe();
        let _ = rx.wait_for(|state| *state == LoopState::Cancelled).await;
    }

    pub fn info(&self) -> LoopInfo {
        LoopInfo {
            id: self.id(),
            client: self.client().clone(),
            interval_ms: self.interval().as_millis() as u64,
            state: self.state(),
        }
    }

    /// Completes when [`LoopHandle::cancel`] is called (or was called
    /// before the last wake-up was consumed).
    pub(crate) async fn cancel_requested(&self) {
        self.shared.wake.notified().await;
    }

    pub(crate) fn set_state(&self, state: LoopState) {
        self.shared.state.send_replace(state);
    }

    /// Marks the loop as terminated from inside the loop itself.
    pub(crate) fn finish(&self) {
        self.shared.cancelled.store(true, Ordering::Release);
        self.set_state(LoopState::Cancelled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_idempotent_and_shared_by_clones() {
        let handle = LoopHandle::new(1, ClientId::from("alice"), Duration::from_secs(1));
        let clone = handle.clone();

        assert!(!clone.is_cancelled());
        handle.cancel();
        handle.cancel();
        assert!(clone.is_cancelled());
        // state only changes when the loop itself finishes
        assert_eq!(clone.state(), LoopState::Starting);
    }

    #[test]
    fn test_info_serializes() {
        let handle = LoopHandle::new(
            7,
            ClientId::from("10.0.0.1:5000"),
            Duration::from_millis(250),
        );
        let json = serde_json::to_string(&handle.info()).unwrap();
        assert_eq!(
            json,
            r#"{"id":7,"client":"10.0.0.1:5000","interval_ms":250,"state":"starting"}"#
        );
    }

    #[tokio::test]
    async fn test_closed_resolves_after_finish() {
        let handle = LoopHandle::new(1, ClientId::from("bob"), Duration::from_secs(1));
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.closed().await });

        handle.finish();
        task.await.unwrap();
        assert_eq!(handle.state(), LoopState::Cancelled);
        assert!(handle.is_cancelled());
    }
}
