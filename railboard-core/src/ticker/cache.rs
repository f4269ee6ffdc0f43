//! Persisted ticker text
//!
//! The file holds every advisory followed by the powered-by trailer, each
//! terminated by [`SEPARATOR`]. It is rewritten only when its FNV-1a hash
//! differs from the one stored in the meta record, and always via a temp
//! file renamed over the canonical path, so readers see either the old
//! file or the new one.

use alloc::string::String;

use super::hash::fnv1a32;
use super::{POWERED_BY, SEPARATOR};
use crate::text::collapse_spaces;
use crate::traits::{FileStore, StorageError};

/// Canonical ticker text
pub const TICKER_PATH: &str = "/ticker.txt";
/// Staging file for a rewrite
pub const TICKER_TMP_PATH: &str = "/ticker.tmp";
/// Little-endian u32 hash of the canonical file
pub const TICKER_META_PATH: &str = "/ticker.meta";

/// Outcome of a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CacheRefresh {
    /// Stored content already matched
    Unchanged,
    /// File replaced with new content
    Rewritten,
}

/// Ticker items: trimmed advisories with empties dropped, then the trailer
pub fn ticker_items<'a, S: AsRef<str>>(advisories: &'a [S]) -> impl Iterator<Item = &'a str> {
    advisories
        .iter()
        .map(|m| m.as_ref().trim())
        .filter(|m| !m.is_empty())
        .chain(core::iter::once(POWERED_BY))
}

/// File content for `advisories`
pub fn build_content<S: AsRef<str>>(advisories: &[S]) -> String {
    let mut out = String::new();
    for item in ticker_items(advisories) {
        let mut item = String::from(item);
        collapse_spaces(&mut item);
        out.push_str(item.trim());
        out.push_str(SEPARATOR);
    }
    out
}

/// Order-sensitive hash of each item and separator
pub fn content_hash<S: AsRef<str>>(advisories: &[S]) -> u32 {
    fnv1a32(build_content(advisories).as_bytes())
}

/// Whether cached content carries more than the trailer
pub fn has_advisories(content: &str) -> bool {
    let body = content.trim().trim_end_matches('|').trim();
    !body.is_empty() && body != POWERED_BY
}

/// Stored hash, if a well-formed meta record exists
pub async fn stored_hash<F: FileStore>(fs: &mut F) -> Option<u32> {
    let bytes = fs.read(TICKER_META_PATH).await.ok()?;
    let bytes: [u8; 4] = bytes.as_slice().try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// Rewrite the ticker file if `advisories` changed its content
///
/// On error the previous canonical file is left untouched.
pub async fn refresh<F: FileStore, S: AsRef<str>>(
    fs: &mut F,
    advisories: &[S],
) -> Result<CacheRefresh, StorageError> {
    let content = build_content(advisories);
    let want = fnv1a32(content.as_bytes());

    if stored_hash(fs).await == Some(want) && fs.exists(TICKER_PATH).await? {
        return Ok(CacheRefresh::Unchanged);
    }

    fs.write(TICKER_TMP_PATH, content.as_bytes()).await?;
    fs.rename(TICKER_TMP_PATH, TICKER_PATH).await?;
    fs.write(TICKER_META_PATH, &want.to_le_bytes()).await?;
    Ok(CacheRefresh::Rewritten)
}

/// Read the canonical ticker text
pub async fn load<F: FileStore>(fs: &mut F) -> Result<String, StorageError> {
    let bytes = fs.read(TICKER_PATH).await?;
    String::from_utf8(bytes).map_err(|_| StorageError::Corrupted)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ticker::hash::Fnv1a;
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use embassy_futures::block_on;

    /// In-memory store with write counting and failure injection
    #[derive(Default)]
    pub struct MemStore {
        pub files: BTreeMap<String, Vec<u8>>,
        pub writes: usize,
        pub fail_rename: bool,
    }

    impl FileStore for MemStore {
        async fn read(&mut self, path: &str) -> Result<Vec<u8>, StorageError> {
            self.files.get(path).cloned().ok_or(StorageError::NotFound)
        }

        async fn write(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
            self.writes += 1;
            self.files.insert(path.into(), data.into());
            Ok(())
        }

        async fn rename(&mut self, from: &str, to: &str) -> Result<(), StorageError> {
            if self.fail_rename {
                return Err(StorageError::Io);
            }
            let data = self.files.remove(from).ok_or(StorageError::NotFound)?;
            self.files.insert(to.into(), data);
            Ok(())
        }

        async fn remove(&mut self, path: &str) -> Result<(), StorageError> {
            self.files.remove(path);
            Ok(())
        }

        async fn exists(&mut self, path: &str) -> Result<bool, StorageError> {
            Ok(self.files.contains_key(path))
        }
    }

    #[test]
    fn test_build_content() {
        assert_eq!(
            build_content(&["A", "  B  ", "", "C  D"]),
            "A   |   B   |   C D   |   Powered by National Rail   |   "
        );
        assert_eq!(build_content::<&str>(&[]), "Powered by National Rail   |   ");
    }

    #[test]
    fn test_hash_chains_items_and_separators() {
        let mut h = Fnv1a::new();
        h.update(b"A").update(SEPARATOR.as_bytes());
        h.update(b"B").update(SEPARATOR.as_bytes());
        h.update(POWERED_BY.as_bytes()).update(SEPARATOR.as_bytes());
        assert_eq!(content_hash(&["A", "B"]), h.finish());
        assert_ne!(content_hash(&["A", "B"]), content_hash(&["B", "A"]));
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let mut fs = MemStore::default();
        let msgs = ["A", "B"];

        assert_eq!(block_on(refresh(&mut fs, &msgs)), Ok(CacheRefresh::Rewritten));
        let writes = fs.writes;
        let hash = block_on(stored_hash(&mut fs));
        assert_eq!(hash, Some(content_hash(&msgs)));

        assert_eq!(block_on(refresh(&mut fs, &msgs)), Ok(CacheRefresh::Unchanged));
        assert_eq!(fs.writes, writes);
        assert_eq!(block_on(stored_hash(&mut fs)), hash);
        assert!(!fs.files.contains_key(TICKER_TMP_PATH));
    }

    #[test]
    fn test_file_matches_advisories() {
        let mut fs = MemStore::default();
        block_on(refresh(&mut fs, &["Lifts out of order"])).unwrap();
        let text = block_on(load(&mut fs)).unwrap();
        assert_eq!(text, "Lifts out of order   |   Powered by National Rail   |   ");
        assert_eq!(
            block_on(stored_hash(&mut fs)),
            Some(fnv1a32(text.as_bytes()))
        );
    }

    #[test]
    fn test_change_rewrites() {
        let mut fs = MemStore::default();
        block_on(refresh(&mut fs, &["A"])).unwrap();
        assert_eq!(block_on(refresh(&mut fs, &["B"])), Ok(CacheRefresh::Rewritten));
        assert!(block_on(load(&mut fs)).unwrap().starts_with("B   |   "));
    }

    #[test]
    fn test_missing_file_with_matching_meta_rewrites() {
        let mut fs = MemStore::default();
        block_on(refresh(&mut fs, &["A"])).unwrap();
        fs.files.remove(TICKER_PATH);
        assert_eq!(block_on(refresh(&mut fs, &["A"])), Ok(CacheRefresh::Rewritten));
    }

    #[test]
    fn test_failed_rename_keeps_old_file() {
        let mut fs = MemStore::default();
        block_on(refresh(&mut fs, &["Old"])).unwrap();
        let old_hash = block_on(stored_hash(&mut fs));

        fs.fail_rename = true;
        assert_eq!(block_on(refresh(&mut fs, &["New"])), Err(StorageError::Io));
        assert!(block_on(load(&mut fs)).unwrap().starts_with("Old"));
        assert_eq!(block_on(stored_hash(&mut fs)), old_hash);
    }

    #[test]
    fn test_has_advisories() {
        assert!(!has_advisories(""));
        assert!(!has_advisories("Powered by National Rail   |   "));
        assert!(has_advisories("A   |   Powered by National Rail   |   "));
    }
}
