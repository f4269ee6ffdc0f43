//! Display-lock discipline for the poll path
//!
//! Every method takes the panel lock for exactly the span of its painting
//! and releases it when the guard drops, error paths included. Nothing in
//! here waits on the network.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use railboard_protocol::BoardKind;

use super::painter::BoardPainter;
use crate::board::BoardSnapshot;
use crate::clock::{clock_text, TimeOfDay};
use crate::traits::{Display, DisplayError};

pub struct Orchestrator<'a, M: RawMutex, D> {
    display: &'a Mutex<M, D>,
    painter: BoardPainter,
}

impl<'a, M: RawMutex, D: Display> Orchestrator<'a, M, D> {
    pub fn new(display: &'a Mutex<M, D>) -> Self {
        Self {
            display,
            painter: BoardPainter::new(),
        }
    }

    /// Splash shown until the first poll completes
    pub async fn show_loading(&mut self) -> Result<(), DisplayError> {
        let mut panel = self.display.lock().await;
        self.painter.loading(&mut *panel)
    }

    /// Header and column bar, before any board data exists
    pub async fn first_paint(&mut self, station: &str, kind: BoardKind) -> Result<(), DisplayError> {
        let mut panel = self.display.lock().await;
        self.painter.header(&mut *panel)?;
        self.painter.title(&mut *panel, station, kind)?;
        self.painter.column_bar(&mut *panel, kind)
    }

    /// Title, column bar and rows from a committed snapshot
    pub async fn repaint(
        &mut self,
        snapshot: &BoardSnapshot,
        kind: BoardKind,
        rows: usize,
    ) -> Result<(), DisplayError> {
        let mut panel = self.display.lock().await;
        self.painter.title(&mut *panel, &snapshot.title, kind)?;
        self.painter.column_bar(&mut *panel, kind)?;
        self.painter.rows(&mut *panel, &snapshot.services, rows)
    }

    /// Redraw the clock if the minute changed; returns whether it did
    pub async fn tick_clock(&mut self, now: Option<TimeOfDay>) -> Result<bool, DisplayError> {
        let text = clock_text(now);
        let mut panel = self.display.lock().await;
        self.painter.clock_if_changed(&mut *panel, &text)
    }
}
