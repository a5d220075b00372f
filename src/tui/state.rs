//! Viewer state.

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::model::PanelModel;
use crate::scheduler::LoopState;

/// Number of décor cells revealed after startup.
pub const DECOR_CELLS: usize = 20;

/// Refresh interval bounds for `+` / `-`.
pub const MIN_REFRESH: Duration = Duration::from_millis(250);
pub const MAX_REFRESH: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupState {
    #[default]
    None,
    QuitConfirm,
}

#[derive(Debug)]
pub struct AppState {
    pub client: String,
    pub interval: Duration,
    pub loop_state: LoopState,
    /// Last panel received. Kept after the loop stops.
    pub panel: Option<PanelModel>,
    pub updated_at: Option<DateTime<Local>>,
    /// Set once the loop reported the source unavailable.
    pub unavailable: Option<String>,
    pub revealed: [bool; DECOR_CELLS],
    pub popup: PopupState,
}

impl AppState {
    pub fn new(client: impl Into<String>, interval: Duration) -> Self {
        Self {
            client: client.into(),
            interval,
            loop_state: LoopState::Starting,
            panel: None,
            updated_at: None,
            unavailable: None,
            revealed: [false; DECOR_CELLS],
            popup: PopupState::None,
        }
    }

    pub fn apply_panel(&mut self, panel: PanelModel) {
        self.panel = Some(panel);
        self.updated_at = Some(Local::now());
    }

    pub fn mark_unavailable(&mut self, reason: String) {
        self.unavailable = Some(reason);
        self.loop_state = LoopState::Cancelled;
    }

    pub fn reveal(&mut self, slot: usize) {
        if let Some(cell) = self.revealed.get_mut(slot) {
            *cell = true;
        }
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|r| **r).count()
    }
}

/// Doubles the interval, capped at [`MAX_REFRESH`].
pub fn slower(interval: Duration) -> Duration {
    (interval * 2).min(MAX_REFRESH)
}

/// Halves the interval, floored at [`MIN_REFRESH`].
pub fn faster(interval: Duration) -> Duration {
    (interval / 2).max(MIN_REFRESH)
}
