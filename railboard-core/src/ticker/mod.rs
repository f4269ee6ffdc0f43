//! Bottom-of-screen advisory ticker

mod cache;
mod engine;
mod hash;
mod ribbon;

pub use cache::{
    build_content, content_hash, has_advisories, load, refresh, stored_hash, ticker_items,
    CacheRefresh, TICKER_META_PATH, TICKER_PATH, TICKER_TMP_PATH,
};
pub use engine::TickerEngine;
pub use hash::{fnv1a32, Fnv1a};
pub use ribbon::{Ribbon, RibbonMode, TICKER_FONT};

/// Placed after every ticker item
pub const SEPARATOR: &str = "   |   ";

/// Trailer shown alone when there are no advisories
pub const POWERED_BY: &str = "Powered by National Rail";

/// Shorter text is repeated once so the tile spans the band
pub const MIN_CONTENT_LEN: usize = 64;

/// Pixels scrolled per frame
pub const SCROLL_STEP_PX: i32 = 2;

/// Frame period of the ticker task, about 30 fps
pub const FRAME_MS: u64 = 33;
