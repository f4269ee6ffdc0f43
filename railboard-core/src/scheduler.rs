//! Due-time scheduling for the poll loop
//!
//! The poll loop owns a [`Schedule`] with two deadlines, one for the next
//! fetch and one for the next clock check. Each pass runs whatever is due
//! and then sleeps until the earlier deadline.

use crate::board::PollOutcome;

/// Delay before retrying after any failed or rejected poll
pub const RETRY_MS: u64 = 2_000;

/// Smallest accepted refresh interval in seconds
pub const MIN_UPDATE_EVERY_S: u16 = 5;

/// Shortest sleep between loop passes
pub const LOOP_IDLE_MS: u64 = 3;

/// Two-level poll cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cadence {
    ok_ms: u64,
}

impl Cadence {
    /// Cadence refreshing every `update_every_s` seconds after a success
    pub fn new(update_every_s: u16) -> Self {
        Self {
            ok_ms: update_every_s.max(MIN_UPDATE_EVERY_S) as u64 * 1000,
        }
    }

    /// Delay after a successful poll
    pub fn ok_ms(&self) -> u64 {
        self.ok_ms
    }

    /// Delay before the next poll given how the last one went
    pub fn delay_after(&self, outcome: &PollOutcome) -> u64 {
        if outcome.is_success() {
            self.ok_ms
        } else {
            RETRY_MS
        }
    }
}

/// Poll and clock deadlines in uptime milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Schedule {
    next_poll_ms: u64,
    next_clock_ms: u64,
}

impl Schedule {
    /// Both jobs due at `now_ms`
    pub const fn new(now_ms: u64) -> Self {
        Self {
            next_poll_ms: now_ms,
            next_clock_ms: now_ms,
        }
    }

    pub fn poll_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_poll_ms
    }

    pub fn after_poll(&mut self, now_ms: u64, delay_ms: u64) {
        self.next_poll_ms = now_ms.saturating_add(delay_ms);
    }

    pub fn clock_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_clock_ms
    }

    pub fn after_clock(&mut self, now_ms: u64, delay_ms: u64) {
        self.next_clock_ms = now_ms.saturating_add(delay_ms);
    }

    /// Sleep until the earlier deadline, at least [`LOOP_IDLE_MS`]
    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        self.next_poll_ms
            .min(self.next_clock_ms)
            .saturating_sub(now_ms)
            .max(LOOP_IDLE_MS)
    }
}
