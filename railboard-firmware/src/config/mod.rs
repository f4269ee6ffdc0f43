//! Settings defaults and persistence

pub mod loader;

pub use loader::{ConfigError, SettingsPersistence};

use railboard_core::config::Defaults;
use railboard_protocol::BoardKind;

include!(concat!(env!("OUT_DIR"), "/defaults.rs"));
