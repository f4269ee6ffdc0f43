//! Board data model
//!
//! A [`BoardSnapshot`] is always built completely off to the side and then
//! committed with a single swap, so readers never see old and new rows
//! mixed together.

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec as BoundedVec;

use crate::clock::TimeOfDay;

/// Hard cap on stored services
pub const MAX_SERVICES: usize = railboard_protocol::MAX_ROWS as usize;

/// Default number of rows requested and shown
pub const DEFAULT_ROWS: u8 = 8;

/// One service on the board
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceRow {
    /// Scheduled time, `HH:MM` or blank
    pub time: String,
    /// Destination (departures) or origin (arrivals)
    pub place: String,
    /// Status text such as `On time`, `10:07`, `Cancelled`
    pub estimate: String,
    /// Platform, empty for bus rows
    pub platform: String,
    /// Operator display name
    pub operator: String,
    /// Rail replacement or scheduled bus
    pub is_bus: bool,
}

/// Ordered, capped service list in feed order
pub type Services = BoundedVec<ServiceRow, MAX_SERVICES>;

/// Everything one successful fetch produced
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardSnapshot {
    /// Station name as reported, or the station code
    pub title: String,
    pub services: Services,
    /// First-sentence advisory messages, in feed order
    pub advisories: Vec<String>,
    /// Service-reported time of the response
    pub generated_at: Option<TimeOfDay>,
}

impl BoardSnapshot {
    /// An empty board titled `title`
    pub fn empty(title: &str) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub const fn new() -> Self {
        Self {
            title: String::new(),
            services: BoundedVec::new(),
            advisories: Vec::new(),
            generated_at: None,
        }
    }
}

/// The current board, shared between fetch and render
pub struct SharedBoard<M: RawMutex> {
    inner: Mutex<M, RefCell<BoardSnapshot>>,
}

impl<M: RawMutex> SharedBoard<M> {
    /// An empty board
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(BoardSnapshot::new())),
        }
    }

    /// Replace the board wholesale
    pub fn commit(&self, snapshot: BoardSnapshot) {
        let previous = self.inner.lock(|cell| cell.replace(snapshot));
        drop(previous);
    }

    /// Copy of the current board
    pub fn snapshot(&self) -> BoardSnapshot {
        self.inner.lock(|cell| cell.borrow().clone())
    }

    /// Run `f` against the current board without copying it
    pub fn read<R>(&self, f: impl FnOnce(&BoardSnapshot) -> R) -> R {
        self.inner.lock(|cell| f(&cell.borrow()))
    }
}

impl<M: RawMutex> Default for SharedBoard<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    fn row(time: &str) -> ServiceRow {
        ServiceRow {
            time: time.into(),
            place: "Euston".into(),
            ..ServiceRow::default()
        }
    }

    #[test]
    fn test_commit_replaces_whole_snapshot() {
        let board = SharedBoard::<NoopRawMutex>::new();
        assert_eq!(board.snapshot(), BoardSnapshot::new());

        let mut first = BoardSnapshot::empty("Euston");
        first.services.push(row("10:05")).unwrap();
        first.services.push(row("10:15")).unwrap();
        first.advisories.push("Delays expected.".into());
        board.commit(first);

        let mut second = BoardSnapshot::empty("Watford Junction");
        second.services.push(row("11:00")).unwrap();
        board.commit(second.clone());

        assert_eq!(board.snapshot(), second);
        assert_eq!(board.read(|b| b.services.len()), 1);
        assert!(board.read(|b| b.advisories.is_empty()));
    }
}
