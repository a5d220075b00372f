//! Widgets of the terminal viewer.

mod decor;
mod header;
mod quit_confirm;
mod sections;

pub use decor::render_decor;
pub use header::render_header;
pub use quit_confirm::render_quit_confirm;
pub use sections::render_sections;
