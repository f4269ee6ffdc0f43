//! Wall-clock time of day
//!
//! The board has no RTC. The clock is anchored to the `generatedAt` stamp
//! of each successful response and free-runs from the uptime counter in
//! between. Until the first anchor it is invalid and shows `--:--`.

use core::fmt::Write;
use heapless::String;

use serde::{Deserialize, Serialize};

/// Seconds in a day
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Retry delay while the clock is not yet synchronised
pub const INVALID_CLOCK_RETRY_MS: u64 = 1000;

/// Text shown in place of an unsynchronised clock
pub const INVALID_CLOCK_TEXT: &str = "--:--";

/// A time of day with second resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
    second: u8,
}

impl TimeOfDay {
    /// Build from components, rejecting out-of-range values
    pub const fn new(hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour < 24 && minute < 60 && second < 60 {
            Some(Self {
                hour,
                minute,
                second,
            })
        } else {
            None
        }
    }

    /// Build from seconds since midnight, wrapping at one day
    pub const fn from_seconds(secs: u32) -> Self {
        let secs = secs % SECONDS_PER_DAY;
        Self {
            hour: (secs / 3600) as u8,
            minute: (secs / 60 % 60) as u8,
            second: (secs % 60) as u8,
        }
    }

    /// Parse `HH:MM` or `HH:MM:SS`
    pub fn parse(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        let two = |i: usize| -> Option<u8> {
            let hi = b.get(i)?.checked_sub(b'0').filter(|d| *d < 10)?;
            let lo = b.get(i + 1)?.checked_sub(b'0').filter(|d| *d < 10)?;
            Some(hi * 10 + lo)
        };
        match b.len() {
            5 if b[2] == b':' => Self::new(two(0)?, two(3)?, 0),
            8 if b[2] == b':' && b[5] == b':' => Self::new(two(0)?, two(3)?, two(6)?),
            _ => None,
        }
    }

    /// Parse the time part of an ISO-8601 stamp such as
    /// `2025-03-01T10:05:12.123+00:00`
    pub fn from_timestamp(stamp: &str) -> Option<Self> {
        let (_, time) = stamp.trim().split_once('T')?;
        Self::parse(time.get(..8)?)
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn seconds_of_day(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }

    /// Format as `HH:MM`
    pub fn hhmm(&self) -> String<5> {
        let mut out = String::new();
        let _ = write!(out, "{:02}:{:02}", self.hour, self.minute);
        out
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hhmm())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: &str = Deserialize::deserialize(deserializer)?;
        TimeOfDay::parse(s).ok_or_else(|| serde::de::Error::custom("expected HH:MM"))
    }
}

/// Time of day derived from an uptime anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallClock {
    anchor: Option<(u64, u32)>,
}

impl WallClock {
    /// An unsynchronised clock
    pub const fn new() -> Self {
        Self { anchor: None }
    }

    /// Record that `time` was current at `uptime_ms`
    pub fn sync(&mut self, uptime_ms: u64, time: TimeOfDay) {
        self.anchor = Some((uptime_ms, time.seconds_of_day()));
    }

    pub fn is_valid(&self) -> bool {
        self.anchor.is_some()
    }

    /// Current time of day, if synchronised
    pub fn now(&self, uptime_ms: u64) -> Option<TimeOfDay> {
        let (at_ms, secs) = self.anchor?;
        let elapsed = (uptime_ms.saturating_sub(at_ms) / 1000) % SECONDS_PER_DAY as u64;
        Some(TimeOfDay::from_seconds(secs + elapsed as u32))
    }
}

/// Delay until the next minute boundary, or a short retry when invalid
pub fn delay_to_next_minute(now: Option<TimeOfDay>) -> u64 {
    match now {
        Some(t) => (60 - t.second() as u64) * 1000,
        None => INVALID_CLOCK_RETRY_MS,
    }
}

/// Clock text for `now`
pub fn clock_text(now: Option<TimeOfDay>) -> String<5> {
    match now {
        Some(t) => t.hhmm(),
        None => {
            let mut out = String::new();
            let _ = out.push_str(INVALID_CLOCK_TEXT);
            out
        }
    }
}
