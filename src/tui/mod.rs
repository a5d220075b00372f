//! Terminal viewer for the host panel.
//!
//! The viewer is one more scheduler client: [`TuiSink`] turns loop output
//! into UI events, a bounded job reveals the décor strip, and the UI thread
//! redraws on every event.

mod app;
mod event;
mod input;
mod render;
mod sink;
mod state;
mod style;
mod widgets;

pub use app::App;
pub use event::Event;
pub use sink::TuiSink;
