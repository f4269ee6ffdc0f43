//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod board;
pub mod http;
pub mod reboot;
pub mod ticker;
pub mod wifi;

pub use board::{board_task, BoardContext};
pub use http::http_task;
pub use reboot::reboot_task;
pub use ticker::ticker_task;
pub use wifi::{net_task, wifi_task};
