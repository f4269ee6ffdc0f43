//! Fixed screen geometry for the 480x320 panel
//!
//! ```text
//! 0   ┌──────────────────────────────────────────┐
//!     │ Euston Departures                  10:05 │ header
//! 48  ├──────────────────────────────────────────┤
//!     │ STD  To               ETD      Plt  Oper │ column bar
//! 80  ├──────────────────────────────────────────┤
//!     │ rows ...                                 │
//! 292 ├──────────────────────────────────────────┤
//!     │ ◆ ticker ◆                               │
//! 320 └──────────────────────────────────────────┘
//! ```

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

pub const SCREEN_W: i32 = 480;
pub const SCREEN_H: i32 = 320;
pub const PAD: i32 = 8;

pub const HEADER_H: i32 = 48;
pub const COLBAR_Y: i32 = HEADER_H;
pub const COLBAR_H: i32 = 32;
pub const ROW_TOP: i32 = COLBAR_Y + COLBAR_H;

pub const TICKER_H: i32 = 28;
pub const TICKER_Y: i32 = SCREEN_H - TICKER_H;

/// Column left edges
pub const X_TIME: i32 = PAD;
pub const X_PLACE: i32 = 55;
pub const X_ESTIMATE: i32 = 245;
pub const X_PLATFORM: i32 = 310;
pub const X_OPERATOR: i32 = 335;

/// Column widths in chars
pub const CH_TIME: usize = 5;
pub const CH_ESTIMATE: usize = 10;
pub const CH_PLATFORM: usize = 3;
pub const CH_OPERATOR: usize = 21;

/// Pixel budget for the place column, leaving a gutter before the estimate
pub const PLACE_MAX_PX: i32 = X_ESTIMATE - X_PLACE - 6;

/// Extra rows of padding below and above the font height
pub const ROW_MIN_PAD: i32 = 6;
pub const ROW_MAX_PAD: i32 = 8;

/// Build a rectangle from signed coordinates, clamping negative sizes to zero
pub fn rect(x: i32, y: i32, w: i32, h: i32) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(w.max(0) as u32, h.max(0) as u32))
}

/// Row grid geometry for a given font height and configured row count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RowMetrics {
    /// Height of one row in pixels
    pub row_h: i32,
    /// Rows that fit in the grid
    pub visible: usize,
}

impl RowMetrics {
    /// Divide the grid between `rows`, clamped to `[font_h + 6, font_h + 8]`
    pub fn compute(font_h: i32, rows: usize) -> Self {
        let avail = SCREEN_H - ROW_TOP - TICKER_H;
        let auto_h = avail / rows.max(1) as i32;
        let row_h = auto_h.clamp(font_h + ROW_MIN_PAD, font_h + ROW_MAX_PAD).max(1);
        Self {
            row_h,
            visible: rows.min((avail / row_h).max(0) as usize),
        }
    }

    /// Top edge of row `i`
    pub fn row_top(&self, i: usize) -> i32 {
        ROW_TOP + i as i32 * self.row_h
    }

    /// Vertical centre of row `i`
    pub fn row_mid(&self, i: usize) -> i32 {
        self.row_top(i) + self.row_h / 2
    }
}

/// Clock box in the header, sized from the widest clock text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockBox {
    /// Area cleared before each redraw
    pub area: Rectangle,
    /// Top-left of the text
    pub text_origin: Point,
}

impl ClockBox {
    /// Compute from the pixel width of `88:88` and the font height
    pub fn compute(text_w: i32, font_h: i32) -> Self {
        let text_w = if text_w <= 0 { 60 } else { text_w };
        let font_h = if font_h <= 0 { 16 } else { font_h };
        let clock_x = SCREEN_W - PAD - text_w;
        let top_pad = (HEADER_H - font_h) / 2;
        let box_x = clock_x - 3;
        Self {
            area: rect(box_x, top_pad - 2, text_w + 10, font_h + 4),
            text_origin: Point::new(box_x + 7, (HEADER_H - font_h.max(16)) / 2),
        }
    }

    /// Left edge of the clock box; the title must stop before it
    pub fn left(&self) -> i32 {
        self.area.top_left.x
    }
}
