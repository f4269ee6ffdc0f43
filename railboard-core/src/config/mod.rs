//! Device configuration
//!
//! Settings are stored in flash as postcard binary data. Defaults come from
//! the firmware's `board.toml` at build time.

pub mod settings;

pub use settings::*;
