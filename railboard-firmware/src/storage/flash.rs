//! Flash-backed file store for ESP32-S3
//!
//! Uses sequential-storage for wear-leveled key-value storage in the
//! `storage` partition (last 64KB of a 4MB flash, see partitions.csv).
//! The handful of paths the firmware writes map onto fixed keys, so a
//! "file" is one map item and replacing it is one power-safe store.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use defmt::*;
use embassy_embedded_hal::adapter::BlockingAsync;
use esp_hal::peripherals::FLASH;
use esp_storage::FlashStorage;
use railboard_core::ticker::{TICKER_META_PATH, TICKER_PATH, TICKER_TMP_PATH};
use railboard_core::traits::{FileStore, StorageError};
use sequential_storage::cache::NoCache;
use sequential_storage::map::{self, Key, SerializationError};

/// Flash range of the `storage` partition
pub const STORAGE_RANGE: Range<u32> = 0x3F_0000..0x40_0000;

/// Largest item, key included; one flash page
const ITEM_BUFFER_LEN: usize = 4096;

/// Keys of the items kept in flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Postcard-encoded settings
    Settings = 0,
    /// Canonical ticker text
    TickerText = 1,
    /// Ticker text being written
    TickerTmp = 2,
    /// Hash of the canonical ticker text
    TickerMeta = 3,
}

impl StorageKey {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::Settings),
            1 => Some(StorageKey::TickerText),
            2 => Some(StorageKey::TickerTmp),
            3 => Some(StorageKey::TickerMeta),
            _ => None,
        }
    }

    /// Key backing a file path
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            TICKER_PATH => Some(StorageKey::TickerText),
            TICKER_TMP_PATH => Some(StorageKey::TickerTmp),
            TICKER_META_PATH => Some(StorageKey::TickerMeta),
            _ => None,
        }
    }
}

impl Key for StorageKey {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        if buffer.is_empty() {
            return Err(SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
        if buffer.is_empty() {
            return Err(SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(SerializationError::InvalidFormat),
        }
    }
}

fn storage_error<E>(e: sequential_storage::Error<E>) -> StorageError {
    match e {
        sequential_storage::Error::FullStorage | sequential_storage::Error::ItemTooBig => {
            StorageError::Full
        }
        sequential_storage::Error::Corrupted { .. } => StorageError::Corrupted,
        _ => StorageError::Io,
    }
}

/// Key-value store over the internal flash
pub struct FlashFileStore {
    flash: BlockingAsync<FlashStorage<'static>>,
    buffer: Vec<u8>,
}

impl FlashFileStore {
    pub fn new(flash: FLASH<'static>) -> Self {
        Self {
            flash: BlockingAsync::new(FlashStorage::new(flash)),
            buffer: vec![0u8; ITEM_BUFFER_LEN],
        }
    }

    /// Read the item stored under `key`
    pub async fn read_key(&mut self, key: StorageKey) -> Result<Vec<u8>, StorageError> {
        let item = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut self.buffer[..],
            &key,
        )
        .await
        .map_err(storage_error)?;

        match item {
            Some(data) => Ok(data.to_vec()),
            None => Err(StorageError::NotFound),
        }
    }

    /// Store `data` under `key`, replacing any previous item
    pub async fn write_key(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if data.len() + 1 > ITEM_BUFFER_LEN {
            warn!("{} bytes do not fit one flash item", data.len());
            return Err(StorageError::Full);
        }
        map::store_item(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut self.buffer[..],
            &key,
            &data,
        )
        .await
        .map_err(storage_error)
    }

    /// Drop the item stored under `key`
    pub async fn remove_key(&mut self, key: StorageKey) -> Result<(), StorageError> {
        map::remove_item(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut self.buffer[..],
            &key,
        )
        .await
        .map_err(storage_error)
    }

    pub async fn has_key(&mut self, key: StorageKey) -> Result<bool, StorageError> {
        match self.read_key(key).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn key_for(path: &str) -> Result<StorageKey, StorageError> {
    StorageKey::from_path(path).ok_or(StorageError::Unsupported)
}

impl FileStore for FlashFileStore {
    async fn read(&mut self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.read_key(key_for(path)?).await
    }

    async fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        self.write_key(key_for(path)?, data).await
    }

    async fn rename(&mut self, from: &str, to: &str) -> Result<(), StorageError> {
        let (from, to) = (key_for(from)?, key_for(to)?);
        let data = self.read_key(from).await?;
        self.write_key(to, &data).await?;
        debug!("Moved {} bytes from {} to {}", data.len(), from, to);
        self.remove_key(from).await
    }

    async fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        self.remove_key(key_for(path)?).await
    }

    async fn exists(&mut self, path: &str) -> Result<bool, StorageError> {
        self.has_key(key_for(path)?).await
    }
}
