//! Single in-flight fetch guard with debounce
//!
//! Acquisition is always try-only. A [`FetchPermit`] releases the slot when
//! dropped, so every exit from a fetch (success, fault, early return)
//! releases it exactly once.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Minimum spacing between accepted fetch starts
pub const DEBOUNCE_MS: u64 = 800;

/// Why a fetch attempt was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GuardRejection {
    /// Previous attempt began less than the debounce interval ago
    Debounce,
    /// Another fetch is still outstanding
    InFlight,
}

#[derive(Debug, Clone, Copy)]
struct GuardState {
    in_flight: bool,
    last_start_ms: Option<u64>,
}

/// Single-slot fetch guard
pub struct FetchGuard<M: RawMutex> {
    state: Mutex<M, Cell<GuardState>>,
    debounce_ms: u64,
}

impl<M: RawMutex> FetchGuard<M> {
    /// Create a guard with the standard debounce
    pub const fn new() -> Self {
        Self::with_debounce(DEBOUNCE_MS)
    }

    /// Create a guard with a custom debounce
    pub const fn with_debounce(debounce_ms: u64) -> Self {
        Self {
            state: Mutex::new(Cell::new(GuardState {
                in_flight: false,
                last_start_ms: None,
            })),
            debounce_ms,
        }
    }

    /// Try to start a fetch at `now_ms`
    ///
    /// The debounce is checked before the in-flight slot. On success the
    /// start time is recorded and the slot is held until the permit drops.
    pub fn try_begin(&self, now_ms: u64) -> Result<FetchPermit<'_, M>, GuardRejection> {
        self.state.lock(|cell| {
            let mut state = cell.get();
            if let Some(last) = state.last_start_ms {
                if now_ms.saturating_sub(last) < self.debounce_ms {
                    return Err(GuardRejection::Debounce);
                }
            }
            if state.in_flight {
                return Err(GuardRejection::InFlight);
            }
            state.in_flight = true;
            state.last_start_ms = Some(now_ms);
            cell.set(state);
            Ok(())
        })?;
        Ok(FetchPermit { guard: self })
    }

    /// Whether a fetch is currently outstanding
    pub fn is_in_flight(&self) -> bool {
        self.state.lock(|cell| cell.get().in_flight)
    }

    fn release(&self) {
        self.state.lock(|cell| {
            let mut state = cell.get();
            state.in_flight = false;
            cell.set(state);
        });
    }
}

impl<M: RawMutex> Default for FetchGuard<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of holding the fetch slot; releases it on drop
#[must_use = "the fetch slot is released as soon as the permit is dropped"]
pub struct FetchPermit<'a, M: RawMutex> {
    guard: &'a FetchGuard<M>,
}

impl<M: RawMutex> Drop for FetchPermit<'_, M> {
    fn drop(&mut self) {
        self.guard.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_first_attempt_allowed() {
        let guard = FetchGuard::<NoopRawMutex>::new();
        let permit = guard.try_begin(0);
        assert!(permit.is_ok());
        assert!(guard.is_in_flight());
    }

    #[test]
    fn test_debounce_checked_first() {
        let guard = FetchGuard::<NoopRawMutex>::new();
        let _permit = guard.try_begin(1_000).unwrap();
        assert_eq!(guard.try_begin(1_500).err(), Some(GuardRejection::Debounce));
        assert_eq!(guard.try_begin(1_800).err(), Some(GuardRejection::InFlight));
    }

    #[test]
    fn test_release_on_drop() {
        let guard = FetchGuard::<NoopRawMutex>::new();
        {
            let _permit = guard.try_begin(0).unwrap();
        }
        assert!(!guard.is_in_flight());
        assert!(guard.try_begin(800).is_ok());
    }

    #[test]
    fn test_release_on_early_return() {
        fn fetch(guard: &FetchGuard<NoopRawMutex>, now: u64, fail: bool) -> Result<(), ()> {
            let _permit = guard.try_begin(now).map_err(|_| ())?;
            if fail {
                return Err(());
            }
            Ok(())
        }

        let guard = FetchGuard::<NoopRawMutex>::new();
        assert_eq!(fetch(&guard, 0, true), Err(()));
        assert!(!guard.is_in_flight());
        assert_eq!(fetch(&guard, 900, false), Ok(()));
    }

    #[test]
    fn test_rejected_attempt_does_not_move_debounce() {
        let guard = FetchGuard::<NoopRawMutex>::new();
        drop(guard.try_begin(0).unwrap());
        assert!(guard.try_begin(500).is_err());
        // Debounce measured from the accepted start at 0, not the rejection
        assert!(guard.try_begin(800).is_ok());
    }
}
