//! Persistent storage on the internal flash

pub mod flash;

pub use flash::{FlashFileStore, StorageKey, STORAGE_RANGE};
