//! Sink that writes panels to the tracing log.

use tracing::{info, warn};

use super::Sink;
use crate::model::PanelModel;

/// Logs each section of every panel as one `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl Sink for LogSink {
    fn display(&self, panel: &PanelModel) {
        for section in &panel.sections {
            info!(section = %section.title, "{}", section.lines.join(" | "));
        }
    }

    fn unavailable(&self, reason: &str) {
        warn!(reason, "metrics unavailable");
    }
}
