//! HTTP surface: each SSE connection is one scheduler client.
//!
//! | Route | |
//! |-------|---|
//! | `GET /api/v1/health` | liveness plus loop and connection counts |
//! | `GET /api/v1/panel` | one sample rendered on demand |
//! | `GET /api/v1/stream?interval_ms=N&client=NAME` | `panel` events every N ms, then `unavailable` if the source goes away |
//! | `GET /api/v1/subscriptions` | active loops |

mod handlers;
mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

pub use state::WebState;

pub fn router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::handle_health))
        .route("/api/v1/panel", get(handlers::handle_panel))
        .route("/api/v1/stream", get(handlers::handle_stream))
        .route("/api/v1/subscriptions", get(handlers::handle_subscriptions))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}
