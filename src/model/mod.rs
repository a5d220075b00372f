//! Data model shared by sources, the renderer and sinks.

mod panel;
mod snapshot;

pub use panel::{PanelModel, Section};
pub use snapshot::{CpuInfo, MemoryInfo, OsInfo, Snapshot};
