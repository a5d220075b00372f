//! Main viewer application.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use crate::scheduler::{ClientId, LoopHandle, LoopState, Scheduler};

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::render;
use super::sink::TuiSink;
use super::state::{AppState, DECOR_CELLS, faster, slower};

/// Delay between two décor cells.
const REVEAL_STEP: Duration = Duration::from_millis(50);

/// Interactive terminal viewer bound to one scheduler subscription.
pub struct App {
    scheduler: Arc<Scheduler>,
    client: ClientId,
    state: AppState,
}

impl App {
    pub fn new(scheduler: Arc<Scheduler>, client: ClientId, interval: Duration) -> Self {
        let state = AppState::new(client.as_str(), interval);
        Self {
            scheduler,
            client,
            state,
        }
    }

    /// Runs until the user quits. Restores the terminal on every exit path.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        let events = EventHandler::new(Duration::from_millis(100));
        let sink = Arc::new(TuiSink::new(events.sender()));

        let reveal_tx = events.sender();
        let reveal = self.scheduler.spawn_bounded(
            self.client.clone(),
            REVEAL_STEP,
            DECOR_CELLS,
            move |slot| {
                let _ = reveal_tx.send(Event::Reveal(slot));
            },
        );
        let mut loops = ViewerLoops {
            scheduler: Arc::clone(&self.scheduler),
            subscription: self.subscribe(&sink),
            reveal,
        };

        loop {
            self.state.loop_state = match self.state.unavailable {
                Some(_) => LoopState::Cancelled,
                None => loops.subscription.state(),
            };
            terminal.draw(|frame| render(frame, &self.state))?;

            let event = match events.next_timeout(Duration::from_millis(250)) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(_) => break,
            };
            match event {
                Event::Key(key) => {
                    let interval = match handle_key(&mut self.state, key) {
                        KeyAction::Quit => break,
                        KeyAction::Slower => slower(self.state.interval),
                        KeyAction::Faster => faster(self.state.interval),
                        KeyAction::None => continue,
                    };
                    loops.subscription = self.resubscribe(&loops.subscription, interval, &sink);
                }
                Event::Resize(..) => terminal.autoresize()?,
                Event::Panel(panel) => self.state.apply_panel(panel),
                Event::Unavailable(reason) => {
                    warn!(reason = %reason, "metrics unavailable, keeping last panel");
                    self.state.mark_unavailable(reason);
                }
                Event::Reveal(slot) => self.state.reveal(slot),
            }
        }

        info!(client = %self.client, "viewer closed");
        Ok(())
    }

    fn subscribe(&self, sink: &Arc<TuiSink>) -> LoopHandle {
        self.scheduler
            .subscribe(self.client.clone(), self.state.interval, sink.clone())
    }

    fn resubscribe(
        &mut self,
        current: &LoopHandle,
        interval: Duration,
        sink: &Arc<TuiSink>,
    ) -> LoopHandle {
        if interval == self.state.interval && !current.is_cancelled() {
            return current.clone();
        }
        self.scheduler.cancel(current);
        self.state.interval = interval;
        self.state.unavailable = None;
        info!(
            client = %self.client,
            interval_ms = interval.as_millis() as u64,
            "refresh interval changed"
        );
        self.subscribe(sink)
    }
}

/// The viewer's loops. Dropping it cancels both, whichever way the event
/// loop exits.
struct ViewerLoops {
    scheduler: Arc<Scheduler>,
    subscription: LoopHandle,
    reveal: LoopHandle,
}

impl Drop for ViewerLoops {
    fn drop(&mut self) {
        self.scheduler.cancel(&self.subscription);
        self.scheduler.cancel(&self.reveal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::runtime::Handle;

    use crate::collector::{MockFs, ProcfsSource};
    use crate::config::LoopConfig;
    use crate::sink::ChannelSink;

    #[tokio::test]
    async fn test_loops_cancelled_when_event_loop_fails() {
        let source = Arc::new(ProcfsSource::new(MockFs::typical_system(), "/proc"));
        let scheduler =
            Arc::new(Scheduler::new(source, LoopConfig::default(), Handle::current()).unwrap());
        let (sink, _rx) = ChannelSink::new();
        let subscription = scheduler.subscribe("terminal", Duration::from_secs(1), Arc::new(sink));
        let reveal = scheduler.spawn_bounded("terminal", REVEAL_STEP, DECOR_CELLS, |_| {});

        let result: io::Result<()> = (|| {
            let _loops = ViewerLoops {
                scheduler: Arc::clone(&scheduler),
                subscription: subscription.clone(),
                reveal: reveal.clone(),
            };
            Err(io::Error::other("draw failed"))
        })();

        assert!(result.is_err());
        assert!(subscription.is_cancelled());
        assert!(reveal.is_cancelled());
    }
}
