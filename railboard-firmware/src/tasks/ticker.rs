//! Ticker animation, pinned to the second core
//!
//! Composes one frame every [`FRAME_MS`] and picks up new content from the
//! board loop between frames.

use alloc::string::String;

use defmt::*;
use embassy_time::{Duration, Ticker};
use railboard_core::ticker::{TickerEngine, FRAME_MS};

use crate::channels::{SharedPanel, TICKER_UPDATE};

#[embassy_executor::task]
pub async fn ticker_task(display: &'static SharedPanel, cached: Option<String>) {
    info!("Ticker task started");

    let mut engine = TickerEngine::new();
    engine.warm_start(cached);
    debug!("Ticker warm start: {}", engine.ribbon().mode());

    let mut ticker = Ticker::every(Duration::from_millis(FRAME_MS));

    loop {
        if let Some(update) = TICKER_UPDATE.try_take() {
            engine.update(update.has_advisories, update.content);
            debug!("Ticker now {}", engine.ribbon().mode());
        }

        if let Err(e) = engine.frame(display).await {
            warn!("Ticker frame failed: {:?}", e);
        }

        ticker.next().await;
    }
}
