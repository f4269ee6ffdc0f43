//! Inter-task communication
//!
//! Static signals shared between the board loop, the ticker on the second
//! core and the control server. All use `CriticalSectionRawMutex`, which is
//! safe across cores.

use alloc::string::String;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use railboard_core::board::FetchPipeline;
use railboard_core::config::Settings;

use crate::display::Panel;
use crate::storage::FlashFileStore;

/// The panel, shared by the board loop and the ticker
pub type SharedPanel = Mutex<CriticalSectionRawMutex, Panel>;

/// Flash, shared by the ticker cache and settings persistence
pub type SharedStore = Mutex<CriticalSectionRawMutex, FlashFileStore>;

/// Live settings, read by the board loop and edited by the control server
pub type SharedSettings = Mutex<CriticalSectionRawMutex, Settings>;

/// Fetch guard plus the committed board
pub type Pipeline = FetchPipeline<CriticalSectionRawMutex>;

/// New ticker state from the fetch side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerUpdate {
    /// Whether the latest board carried advisories
    pub has_advisories: bool,
    /// Fresh ticker text, `None` when it did not change
    pub content: Option<String>,
}

/// Latest ticker state; only the newest value matters
pub static TICKER_UPDATE: Signal<CriticalSectionRawMutex, TickerUpdate> = Signal::new();

/// Request a restart after the given delay in milliseconds
pub static REBOOT: Signal<CriticalSectionRawMutex, u64> = Signal::new();
