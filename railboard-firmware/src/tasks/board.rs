//! Board loop: poll, repaint and clock on the first core
//!
//! Runs two due-time jobs from one [`Schedule`]. The fetch never holds
//! the panel; the repaint that follows takes it only for its painting.

use alloc::string::String;

use defmt::*;
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{with_timeout, Duration, Instant, Timer};
use railboard_core::board::{BoardSnapshot, PollOutcome};
use railboard_core::clock::{delay_to_next_minute, WallClock};
use railboard_core::config::Settings;
use railboard_core::render::Orchestrator;
use railboard_core::scheduler::{Cadence, Schedule};
use railboard_core::ticker::{self, build_content, CacheRefresh};
use railboard_core::traits::DisplayError;

use crate::channels::{
    Pipeline, SharedPanel, SharedSettings, SharedStore, TickerUpdate, TICKER_UPDATE,
};
use crate::display::Panel;
use crate::net::HttpsTransport;

/// How long the first fetch waits for DHCP before trying anyway
const NETWORK_WAIT_S: u64 = 20;

/// Shared state the board loop works against
pub struct BoardContext {
    pub display: &'static SharedPanel,
    pub store: &'static SharedStore,
    pub settings: &'static SharedSettings,
    pub pipeline: &'static Pipeline,
    pub stack: Stack<'static>,
}

fn uptime_ms() -> u64 {
    Instant::now().as_millis()
}

fn log_display(result: Result<(), DisplayError>, what: &str) {
    if let Err(e) = result {
        warn!("Painting {} failed: {:?}", what, e);
    }
}

struct BoardLoop {
    ctx: BoardContext,
    transport: HttpsTransport,
    orchestrator: Orchestrator<'static, CriticalSectionRawMutex, Panel>,
    clock: WallClock,
}

impl BoardLoop {
    async fn settings(&self) -> Settings {
        self.ctx.settings.lock().await.clone()
    }

    /// One guarded fetch plus its follow-up work
    async fn poll(&mut self, settings: &Settings) -> PollOutcome {
        let outcome = self
            .ctx
            .pipeline
            .poll(&mut self.transport, &settings.board_query(), uptime_ms())
            .await;

        match &outcome {
            PollOutcome::Updated {
                services,
                advisories,
            } => {
                info!("Board updated: {} services, {} advisories", services, advisories);
                self.after_update().await;
            }
            PollOutcome::Fault { status, reason } => {
                warn!("Board service fault {}: {}", status, reason.as_str());
            }
            PollOutcome::Transport(e) => warn!("Board fetch failed: {:?}", e),
            PollOutcome::Request(e) => error!("Board request not encodable: {:?}", e),
            PollOutcome::Rejected(r) => debug!("Board fetch skipped: {:?}", r),
        }
        outcome
    }

    /// Sync the clock and hand new advisories to the ticker
    async fn after_update(&mut self) {
        let (advisories, generated_at) = self
            .ctx
            .pipeline
            .board()
            .read(|board| (board.advisories.clone(), board.generated_at));

        if let Some(time) = generated_at {
            self.clock.sync(uptime_ms(), time);
        }

        let content = self.refresh_ticker(&advisories).await;
        TICKER_UPDATE.signal(TickerUpdate {
            has_advisories: !advisories.is_empty(),
            content,
        });
    }

    /// Rewrite the ticker file if needed; returns the text when it changed
    ///
    /// If flash fails the ticker still gets the fresh text from memory.
    async fn refresh_ticker(&mut self, advisories: &[String]) -> Option<String> {
        let mut store = self.ctx.store.lock().await;
        match ticker::refresh(&mut *store, advisories).await {
            Ok(CacheRefresh::Unchanged) => None,
            Ok(CacheRefresh::Rewritten) => {
                debug!("Ticker file rewritten");
                match ticker::load(&mut *store).await {
                    Ok(content) => Some(content),
                    Err(e) => {
                        warn!("Reading ticker file back failed: {:?}", e);
                        Some(build_content(advisories))
                    }
                }
            }
            Err(e) => {
                warn!("Ticker file refresh failed: {:?}", e);
                Some(build_content(advisories))
            }
        }
    }

    async fn repaint(&mut self, settings: &Settings) {
        let snapshot = self.ctx.pipeline.board().snapshot();
        let result = self
            .orchestrator
            .repaint(&snapshot, settings.mode, settings.rows as usize)
            .await;
        log_display(result, "board");
    }

    /// Redraw the clock if needed; returns the delay to the next check
    async fn tick_clock(&mut self) -> u64 {
        let now = self.clock.now(uptime_ms());
        match self.orchestrator.tick_clock(now).await {
            Ok(true) => trace!("Clock redrawn"),
            Ok(false) => {}
            Err(e) => warn!("Painting clock failed: {:?}", e),
        }
        delay_to_next_minute(now)
    }

    async fn run(mut self) -> ! {
        let settings = self.settings().await;
        let cadence = Cadence::new(settings.update_every_s);
        self.ctx
            .pipeline
            .board()
            .commit(BoardSnapshot::empty(settings.station.as_str()));

        log_display(self.orchestrator.show_loading().await, "loading screen");

        if with_timeout(
            Duration::from_secs(NETWORK_WAIT_S),
            self.ctx.stack.wait_config_up(),
        )
        .await
        .is_err()
        {
            warn!("Network not up after {}s, polling anyway", NETWORK_WAIT_S);
        }

        // First fetch happens behind the loading screen
        let outcome = self.poll(&settings).await;
        let result = self
            .orchestrator
            .first_paint(settings.station.as_str(), settings.mode)
            .await;
        log_display(result, "header");
        self.repaint(&settings).await;

        let now = uptime_ms();
        let mut schedule = Schedule::new(now);
        schedule.after_poll(now, cadence.delay_after(&outcome));
        info!("Board loop running, refresh every {}ms", cadence.ok_ms());

        loop {
            if schedule.poll_due(uptime_ms()) {
                let settings = self.settings().await;
                let cadence = Cadence::new(settings.update_every_s);
                let outcome = self.poll(&settings).await;
                self.repaint(&settings).await;
                schedule.after_poll(uptime_ms(), cadence.delay_after(&outcome));
            }

            if schedule.clock_due(uptime_ms()) {
                let delay = self.tick_clock().await;
                schedule.after_clock(uptime_ms(), delay);
            }

            Timer::after_millis(schedule.idle_ms(uptime_ms())).await;
        }
    }
}

#[embassy_executor::task]
pub async fn board_task(ctx: BoardContext, transport: HttpsTransport) {
    info!("Board task started");

    let board = BoardLoop {
        orchestrator: Orchestrator::new(ctx.display),
        ctx,
        transport,
        clock: WallClock::new(),
    };
    board.run().await
}
