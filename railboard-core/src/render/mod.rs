//! Board rendering: geometry, colours, painters and the display-lock wrapper

pub mod layout;
pub mod orchestrator;
pub mod painter;
pub mod palette;

pub use layout::{ClockBox, RowMetrics};
pub use orchestrator::Orchestrator;
pub use painter::{column_labels, draw_bus_icon, estimate_color, BoardPainter};
