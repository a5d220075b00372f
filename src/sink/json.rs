//! Newline-delimited JSON sink.

use std::io::{ErrorKind, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;
use tracing::{debug, warn};

use super::Sink;
use crate::model::PanelModel;

/// Writes one JSON object per panel, one per line.
///
/// A stopped loop is reported as `{"unavailable":"<reason>"}`. The sink
/// closes once the reader goes away (`BrokenPipe`).
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
    closed: AtomicBool,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_value(&self, value: &serde_json::Value) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let result = serde_json::to_writer(&mut *writer, value)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        match result {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                if !self.closed.swap(true, Ordering::AcqRel) {
                    debug!("JSON reader gone, closing sink");
                }
            }
            Err(e) => warn!(error = %e, "failed to write JSON line"),
        }
    }
}

impl<W: Write + Send> Sink for JsonLinesSink<W> {
    fn display(&self, panel: &PanelModel) {
        match serde_json::to_value(panel) {
            Ok(value) => self.write_value(&value),
            Err(e) => warn!(error = %e, "failed to serialize panel"),
        }
    }

    fn unavailable(&self, reason: &str) {
        self.write_value(&json!({ "unavailable": reason }));
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Section;

    #[test]
    fn test_writes_one_object_per_line() {
        let sink = JsonLinesSink::new(Vec::new());
        let panel = PanelModel {
            sections: vec![Section::new("Uptime", vec!["Uptime: 3 min".into()])],
        };

        sink.display(&panel);
        sink.display(&panel);
        sink.unavailable("/proc does not exist");

        let closed = sink.is_closed();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            serde_json::from_str::<PanelModel>(lines[0]).unwrap(),
            panel
        );
        assert_eq!(lines[0], lines[1]);
        assert_eq!(lines[2], r#"{"unavailable":"/proc does not exist"}"#);
        assert!(!closed);
    }

    struct ClosedPipe {
        writes: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            self.writes += 1;
            Err(ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_broken_pipe_closes_sink() {
        let sink = JsonLinesSink::new(ClosedPipe { writes: 0 });
        let panel = PanelModel {
            sections: vec![Section::new("Uptime", vec!["Uptime: 3 min".into()])],
        };

        sink.display(&panel);
        assert!(sink.is_closed());
        sink.display(&panel);
        sink.unavailable("gone");
        assert_eq!(sink.into_inner().writes, 1);
    }

    struct Flaky;

    impl Write for Flaky {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(ErrorKind::Other.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_other_write_errors_keep_sink_open() {
        let sink = JsonLinesSink::new(Flaky);
        sink.unavailable("x");
        assert!(!sink.is_closed());
    }
}
