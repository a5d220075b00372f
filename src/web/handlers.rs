//! HTTP request handlers: health, one-shot panel, SSE stream, loop listing.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::state::{AppState, WebState};
use crate::collector::SourceError;
use crate::model::PanelModel;
use crate::render;
use crate::scheduler::{LoopHandle, LoopInfo, MIN_INTERVAL};
use crate::sink::{ChannelSink, SinkMessage};

/// Longest interval a stream may ask for.
const MAX_STREAM_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

// ============================================================
// Health
// ============================================================

#[derive(Serialize)]
pub(crate) struct Health {
    status: &'static str,
    version: &'static str,
    source: String,
    active_loops: usize,
    stream_connections: usize,
}

pub(crate) async fn handle_health(State(state): AppState) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: crate::VERSION,
        source: state.scheduler.source().name().to_string(),
        active_loops: state.scheduler.active_count(),
        stream_connections: state.connections.load(Ordering::Relaxed),
    })
}

// ============================================================
// One-shot panel
// ============================================================

pub(crate) async fn handle_panel(State(state): AppState) -> Result<Json<PanelModel>, ApiError> {
    let snapshot = match state.scheduler.sample_now().await {
        Ok(snapshot) => snapshot,
        Err(e @ SourceError::Unavailable { .. }) => {
            warn!(error = %e, "one-shot panel: source unavailable");
            return Err(api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string()));
        }
        Err(e) => return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    };
    if let Err(e) = render::validate(&snapshot) {
        error!(error = %e, "one-shot panel: inconsistent snapshot");
        return Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
    }
    Ok(Json(render::render(&snapshot)))
}

// ============================================================
// Loop listing
// ============================================================

pub(crate) async fn handle_subscriptions(State(state): AppState) -> Json<Vec<LoopInfo>> {
    Json(state.scheduler.active())
}

// ============================================================
// SSE streaming
// ============================================================

#[derive(Deserialize)]
pub(crate) struct StreamQuery {
    /// Refresh interval in milliseconds. Defaults to the server interval.
    interval_ms: Option<u64>,
    /// Client name shown in `/api/v1/subscriptions`.
    client: Option<String>,
}

/// Cancels the connection's loop when the response stream is dropped.
struct StreamGuard {
    handle: LoopHandle,
    state: Arc<WebState>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.state.scheduler.cancel(&self.handle);
        let active = self.state.connections.fetch_sub(1, Ordering::Relaxed) - 1;
        info!(
            client = %self.handle.client(),
            active_connections = active,
            "SSE client disconnected"
        );
    }
}

pub(crate) async fn handle_stream(
    State(state): AppState,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let interval = match query.interval_ms {
        Some(ms) => Duration::from_millis(ms),
        None => state.default_interval,
    };
    if !(MIN_INTERVAL..=MAX_STREAM_INTERVAL).contains(&interval) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!(
                "interval_ms must be between {} and {}",
                MIN_INTERVAL.as_millis(),
                MAX_STREAM_INTERVAL.as_millis()
            ),
        ));
    }
    let client = query
        .client
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| state.anonymous_client());

    let (sink, mut rx) = ChannelSink::new();
    let handle = state.scheduler.subscribe(client, interval, Arc::new(sink));
    let active = state.connections.fetch_add(1, Ordering::Relaxed) + 1;
    info!(
        client = %handle.client(),
        interval_ms = interval.as_millis() as u64,
        active_connections = active,
        "SSE client connected"
    );
    let guard = StreamGuard {
        handle,
        state: Arc::clone(&state),
    };

    let stream = async_stream::stream! {
        let _guard = guard;
        while let Some(message) = rx.recv().await {
            match message {
                SinkMessage::Panel(panel) => match serde_json::to_string(&panel) {
                    Ok(json) => yield Ok(Event::default().event("panel").data(json)),
                    Err(e) => error!(error = %e, "failed to serialize panel"),
                },
                SinkMessage::Unavailable(reason) => {
                    yield Ok(Event::default().event("unavailable").data(reason));
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
