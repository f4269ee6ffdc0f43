//! Byte-oriented file storage
//!
//! POSIX-like semantics over a small set of paths. `rename` replaces the
//! destination if it exists; implementations must make that replacement
//! atomic with respect to readers.

use alloc::vec::Vec;

/// Errors from file storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Path does not exist
    NotFound,
    /// Read or write failed
    Io,
    /// Storage is full
    Full,
    /// Stored data corrupted or invalid
    Corrupted,
    /// Path not supported by this store
    Unsupported,
}

/// File storage trait
pub trait FileStore {
    /// Read the whole file at `path`
    fn read(&mut self, path: &str) -> impl core::future::Future<Output = Result<Vec<u8>, StorageError>>;

    /// Create or truncate `path` and write `data`
    fn write(
        &mut self,
        path: &str,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), StorageError>>;

    /// Move `from` over `to`, replacing it
    fn rename(
        &mut self,
        from: &str,
        to: &str,
    ) -> impl core::future::Future<Output = Result<(), StorageError>>;

    /// Delete `path`; deleting a missing file is not an error
    fn remove(&mut self, path: &str) -> impl core::future::Future<Output = Result<(), StorageError>>;

    /// Check whether `path` exists
    fn exists(&mut self, path: &str) -> impl core::future::Future<Output = Result<bool, StorageError>>;
}
