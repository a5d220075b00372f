//! Sink that forwards panels over a tokio channel.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::Sink;
use crate::model::PanelModel;

/// What a [`ChannelSink`] delivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkMessage {
    Panel(PanelModel),
    Unavailable(String),
}

/// Forwards panels to an async consumer such as an HTTP stream.
///
/// The sink reports itself closed once the receiver is dropped.
pub struct ChannelSink {
    tx: UnboundedSender<SinkMessage>,
}

impl ChannelSink {
    pub fn new() -> (Self, UnboundedReceiver<SinkMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, message: SinkMessage) {
        if self.tx.send(message).is_err() {
            debug!("channel sink receiver dropped");
        }
    }
}

impl Sink for ChannelSink {
    fn display(&self, panel: &PanelModel) {
        self.send(SinkMessage::Panel(panel.clone()));
    }

    fn unavailable(&self, reason: &str) {
        self.send(SinkMessage::Unavailable(reason.to_string()));
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
