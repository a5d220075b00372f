//! Display backends for rendered panels.
//!
//! A [`Sink`] receives one [`PanelModel`] per tick and at most one
//! termination notice. The scheduler never looks at what kind of sink it
//! is talking to.

mod channel;
mod json;
mod log;

use std::sync::Arc;

use crate::model::PanelModel;

pub use channel::{ChannelSink, SinkMessage};
pub use json::JsonLinesSink;
pub use log::LogSink;

/// Anything that can display a rendered panel.
pub trait Sink: Send + Sync {
    /// Shows a freshly rendered panel.
    fn display(&self, panel: &PanelModel);

    /// Called once when the loop feeding this sink stops because metrics
    /// became unavailable. The last displayed panel should stay in place.
    fn unavailable(&self, _reason: &str) {}

    /// Returns `true` once the client behind this sink is gone. The loop
    /// cancels itself on the next tick.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Sends every panel to several sinks.
#[derive(Default, Clone)]
pub struct FanOut {
    sinks: Vec<Arc<dyn Sink>>,
}

impl FanOut {
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn Sink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Sink for FanOut {
    fn display(&self, panel: &PanelModel) {
        for sink in self.sinks.iter().filter(|s| !s.is_closed()) {
            sink.display(panel);
        }
    }

    fn unavailable(&self, reason: &str) {
        for sink in self.sinks.iter().filter(|s| !s.is_closed()) {
            sink.unavailable(reason);
        }
    }

    /// Closed when every member is closed.
    fn is_closed(&self) -> bool {
        self.sinks.iter().all(|s| s.is_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Section;

    #[test]
    fn test_fan_out_skips_closed_members() {
        let (open, mut open_rx) = ChannelSink::new();
        let (closed, closed_rx) = ChannelSink::new();
        drop(closed_rx);

        let mut fan = FanOut::new(vec![Arc::new(open) as Arc<dyn Sink>]);
        fan.push(Arc::new(closed));
        assert_eq!(fan.len(), 2);
        assert!(!fan.is_closed());

        let panel = PanelModel {
            sections: vec![Section::new("Uptime", vec!["Uptime: 1 min".into()])],
        };
        fan.display(&panel);
        fan.unavailable("gone");

        assert_eq!(open_rx.try_recv().unwrap(), SinkMessage::Panel(panel));
        assert_eq!(
            open_rx.try_recv().unwrap(),
            SinkMessage::Unavailable("gone".into())
        );

        drop(open_rx);
        assert!(fan.is_closed());
    }

    #[test]
    fn test_empty_fan_out_is_closed() {
        assert!(FanOut::default().is_closed());
    }
}
