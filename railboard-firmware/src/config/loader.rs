//! Settings persistence
//!
//! Loads device settings from flash storage.
//! Falls back to the board.toml defaults if flash is empty.

use defmt::*;

use railboard_core::config::{Defaults, Settings, SETTINGS_MAX_ENCODED};
use railboard_core::traits::StorageError;

use crate::storage::{FlashFileStore, StorageKey};

/// Settings persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Flash operation failed
    Flash(StorageError),
    /// Stored bytes did not decode
    Deserialize,
    /// Settings did not fit the encode buffer
    Serialize,
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        ConfigError::Flash(e)
    }
}

/// Settings persistence over the shared flash store
pub struct SettingsPersistence<'s> {
    storage: &'s mut FlashFileStore,
}

impl<'s> SettingsPersistence<'s> {
    pub fn new(storage: &'s mut FlashFileStore) -> Self {
        Self { storage }
    }

    /// Load settings from flash
    pub async fn load(&mut self) -> Result<Settings, ConfigError> {
        info!("Loading settings from flash...");

        let bytes = self.storage.read_key(StorageKey::Settings).await?;
        debug!("Read {} bytes of settings from flash", bytes.len());

        let settings = Settings::decode(&bytes).map_err(|_| ConfigError::Deserialize)?;
        log_settings_summary(&settings);
        Ok(settings)
    }

    /// Load settings, or fall back to `defaults` when none are stored
    pub async fn load_or_default(&mut self, defaults: &Defaults) -> Settings {
        match self.load().await {
            Ok(settings) => settings,
            Err(ConfigError::Flash(StorageError::NotFound)) => {
                info!("No settings in flash, using board.toml defaults");
                Settings::from_defaults(defaults)
            }
            Err(e) => {
                warn!("Stored settings unusable ({:?}), using board.toml defaults", e);
                Settings::from_defaults(defaults)
            }
        }
    }

    /// Write settings to flash
    pub async fn save(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        let mut buffer = [0u8; SETTINGS_MAX_ENCODED];
        let encoded = settings
            .encode(&mut buffer)
            .map_err(|_| ConfigError::Serialize)?;

        self.storage
            .write_key(StorageKey::Settings, encoded)
            .await?;
        info!("Saved {} bytes of settings", encoded.len());
        Ok(())
    }
}

/// Log a summary of the loaded settings
fn log_settings_summary(settings: &Settings) {
    info!("Settings loaded successfully");
    debug!("  station {} ({})", settings.station.as_str(), settings.mode);
    debug!("  {} rows, refresh every {}s", settings.rows, settings.update_every_s);
    debug!("  wifi ssid '{}'", settings.wifi_ssid.as_str());
    if settings.rail_token.is_empty() {
        warn!("  no Darwin token configured");
    }
}
