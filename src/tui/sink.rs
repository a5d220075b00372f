//! Sink that feeds the terminal viewer's event channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use tracing::debug;

use super::event::Event;
use crate::model::PanelModel;
use crate::sink::Sink;

/// Forwards panels to the UI thread.
///
/// Closes itself the first time a send fails, i.e. once the viewer has
/// exited, so the loop feeding it stops on its next tick.
pub struct TuiSink {
    tx: Sender<Event>,
    closed: AtomicBool,
}

impl TuiSink {
    pub fn new(tx: Sender<Event>) -> Self {
        Self {
            tx,
            closed: AtomicBool::new(false),
        }
    }

    fn send(&self, event: Event) {
        if self.tx.send(event).is_err() && !self.closed.swap(true, Ordering::AcqRel) {
            debug!("terminal viewer gone, closing sink");
        }
    }
}

impl Sink for TuiSink {
    fn display(&self, panel: &PanelModel) {
        self.send(Event::Panel(panel.clone()));
    }

    fn unavailable(&self, reason: &str) {
        self.send(Event::Unavailable(reason.to_string()));
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_closes_after_receiver_drop() {
        let (tx, rx) = mpsc::channel();
        let sink = TuiSink::new(tx);

        sink.unavailable("gone");
        assert!(matches!(rx.recv().unwrap(), Event::Unavailable(r) if r == "gone"));
        assert!(!sink.is_closed());

        drop(rx);
        sink.display(&PanelModel::default());
        assert!(sink.is_closed());
    }
}
