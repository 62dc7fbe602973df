// src/panel/mod.rs
mod display;
pub mod render;
mod status_panel;

pub use display::run_display;
pub use status_panel::StatusPanel;
