//! hostpanel - periodic host metrics panels.
//!
//! A [`scheduler::Scheduler`] runs one loop per client. Each tick samples a
//! [`collector::MetricsSource`], renders the snapshot into a
//! [`model::PanelModel`] and hands it to the client's [`sink::Sink`].
//!
//! Shared by the three binaries:
//! - `hostpanel` - interactive terminal viewer
//! - `hostpaneld` - headless daemon writing JSON or log lines
//! - `hostpanel-web` - HTTP server streaming panels over SSE

pub mod cli;
pub mod collector;
pub mod config;
pub mod fmt;
pub mod model;
pub mod render;
pub mod scheduler;
pub mod sink;
pub mod tui;
pub mod web;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
