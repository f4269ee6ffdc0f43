//! Ticker ribbon composition
//!
//! Two modes. *Static* shows the powered-by line centred and is only
//! recomposed when it becomes dirty. *Scrolling* treats the whole cached
//! text as one repeating tile: the tile width and separator offsets are
//! measured once per content change, then each frame draws the tile at
//! `PAD - scroll % tile` and every tile step after it until the band is
//! covered. Separators are not drawn as text; a diamond marks each one.

use alloc::string::String;
use alloc::vec::Vec;

use embedded_graphics::prelude::Point;

use super::{MIN_CONTENT_LEN, POWERED_BY, SCROLL_STEP_PX, SEPARATOR};
use crate::render::layout::{rect, PAD, SCREEN_W, TICKER_H};
use crate::render::palette::{HEAD_BG, SHADOW, TEXT};
use crate::traits::{Anchor, Canvas, DisplayError, FontFace, TextMeasure};

/// Face used for the ribbon
pub const TICKER_FONT: FontFace = FontFace::Tiny;

/// Marker character in the cached text
const SEP_MARK: char = '|';

/// Diamonds are drawn for at most this many tile repetitions
const MAX_DIAMOND_TILES: i32 = 3;

/// Current ribbon mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RibbonMode {
    Static,
    Scrolling,
}

/// Scroll state and cached measurements
#[derive(Debug, Clone, Default)]
pub struct Ribbon {
    has_advisories: bool,
    dirty: bool,
    built: bool,
    /// Cached file text
    source: String,
    /// Text drawn per tile, separators removed
    render: String,
    tile_px: i32,
    separators: Vec<i32>,
    scroll_px: i32,
}

impl Ribbon {
    /// A static ribbon that will compose on the first frame
    pub fn new() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> RibbonMode {
        if self.has_advisories {
            RibbonMode::Scrolling
        } else {
            RibbonMode::Static
        }
    }

    /// Switch modes; a change marks the ribbon dirty and restarts the scroll
    pub fn set_has_advisories(&mut self, has: bool) {
        if self.has_advisories != has {
            self.has_advisories = has;
            self.dirty = true;
            if has {
                self.scroll_px = 0;
            }
        }
    }

    /// Replace the cached text; measured again on the next frame
    pub fn set_content(&mut self, content: String) {
        self.source = content;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Pixel width of one tile, 0 before the first scrolling build
    pub fn tile_px(&self) -> i32 {
        self.tile_px
    }

    pub fn scroll_px(&self) -> i32 {
        self.scroll_px
    }

    /// Separator offsets within a tile
    pub fn separators(&self) -> &[i32] {
        &self.separators
    }

    /// Text drawn for each tile
    pub fn render_text(&self) -> &str {
        &self.render
    }

    /// Re-derive the tile from the cached text
    fn rebuild<M: TextMeasure + ?Sized>(&mut self, measure: &M) {
        let mut text: String = self
            .source
            .chars()
            .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
            .collect();
        if text.is_empty() {
            text = POWERED_BY.into();
        }
        if text.len() < MIN_CONTENT_LEN {
            let once = text.clone();
            text.push_str(SEPARATOR);
            text.push_str(&once);
        }

        self.render = text.replace(SEP_MARK, "");
        self.tile_px = measure.text_width(TICKER_FONT, &self.render).max(1);

        self.separators.clear();
        let mut prefix_px = 0;
        let mut last = 0;
        for (idx, _) in text.match_indices(SEP_MARK) {
            prefix_px += measure.text_width(TICKER_FONT, &text[last..idx]);
            self.separators.push(prefix_px);
            last = idx + SEP_MARK.len_utf8();
        }

        self.scroll_px = 0;
        self.dirty = false;
        self.built = true;
    }

    /// Compose the current frame into `sprite`
    ///
    /// Returns `false` when a static ribbon was already up to date and the
    /// sprite was left as is. The sprite still holds a complete frame in
    /// that case and must be pushed like any other.
    pub fn compose<C: Canvas + ?Sized>(&mut self, sprite: &mut C) -> Result<bool, DisplayError> {
        match self.mode() {
            RibbonMode::Static => {
                if !self.dirty {
                    return Ok(false);
                }
                self.compose_static(sprite)?;
                self.dirty = false;
                Ok(true)
            }
            RibbonMode::Scrolling => {
                if self.dirty || !self.built {
                    self.rebuild(&*sprite);
                }
                self.compose_scrolling(sprite)?;
                Ok(true)
            }
        }
    }

    fn compose_static<C: Canvas + ?Sized>(&self, sprite: &mut C) -> Result<(), DisplayError> {
        sprite.fill_rect(rect(0, 0, SCREEN_W, TICKER_H), HEAD_BG)?;
        let center = Point::new(SCREEN_W / 2, TICKER_H / 2);
        sprite.draw_text(POWERED_BY, center + Point::new(1, 1), Anchor::Center, TICKER_FONT, SHADOW)?;
        sprite.draw_text(POWERED_BY, center, Anchor::Center, TICKER_FONT, TEXT)
    }

    fn compose_scrolling<C: Canvas + ?Sized>(&self, sprite: &mut C) -> Result<(), DisplayError> {
        let avail = SCREEN_W - 2 * PAD;
        let right = PAD + avail;
        let base_y = TICKER_H - 2;
        let tile = self.tile_px.max(1);
        let x0 = PAD - self.scroll_px % tile;

        sprite.fill_rect(rect(0, 0, SCREEN_W, TICKER_H), HEAD_BG)?;

        let mut tile_x = x0;
        while tile_x < right {
            if let Some((x, visible)) = visible_span(&*sprite, &self.render, tile_x, 0, SCREEN_W) {
                sprite.draw_text(visible, Point::new(x + 1, base_y + 1), Anchor::BottomLeft, TICKER_FONT, SHADOW)?;
                sprite.draw_text(visible, Point::new(x, base_y), Anchor::BottomLeft, TICKER_FONT, TEXT)?;
            }
            tile_x += tile;
        }

        let font_h = sprite.font_height(TICKER_FONT).max(1);
        for k in 0..MAX_DIAMOND_TILES {
            let tile_base = x0 + k * tile;
            if tile_base > right {
                break;
            }
            for &px in &self.separators {
                let icon_x = tile_base + px;
                if icon_x >= PAD && icon_x < right {
                    draw_diamond(sprite, icon_x, font_h)?;
                }
            }
        }
        Ok(())
    }

    /// Step the scroll, wrapping at the tile width
    pub fn advance(&mut self) {
        if self.mode() == RibbonMode::Scrolling && self.tile_px > 0 {
            self.scroll_px = (self.scroll_px + SCROLL_STEP_PX) % self.tile_px;
        }
    }
}

/// The part of `text` drawn at `x` that lands inside `[left, right)`
///
/// Returns the x of the first visible char and the visible slice, so long
/// tiles cost only what is on screen.
fn visible_span<'s, M: TextMeasure + ?Sized>(
    measure: &M,
    text: &'s str,
    x: i32,
    left: i32,
    right: i32,
) -> Option<(i32, &'s str)> {
    let mut cursor = x;
    let mut start = None;
    let mut end = text.len();
    let mut buf = [0u8; 4];

    for (idx, ch) in text.char_indices() {
        if cursor >= right {
            end = idx;
            break;
        }
        let w = measure.text_width(TICKER_FONT, ch.encode_utf8(&mut buf));
        if start.is_none() && cursor + w > left {
            start = Some((idx, cursor));
        }
        cursor += w;
    }

    let (from, from_x) = start?;
    Some((from_x, &text[from..end]))
}

/// Clear a box behind the marker, then draw a diamond centred on `cx`
fn draw_diamond<C: Canvas + ?Sized>(sprite: &mut C, cx: i32, font_h: i32) -> Result<(), DisplayError> {
    let size = (font_h - 7).clamp(5, 9);
    let pad = (font_h / 5 + 2).clamp(3, 8);
    let cy = TICKER_H / 2;

    let clear_w = size + 2 * pad;
    let clear_h = font_h + 6;
    let clear_y = ((TICKER_H - clear_h) / 2).max(0);
    sprite.fill_rect(rect(cx - clear_w / 2, clear_y, clear_w, clear_h), HEAD_BG)?;

    let top = Point::new(cx, cy - size / 2);
    let bottom = Point::new(cx, cy + size / 2);
    sprite.fill_triangle(top, Point::new(cx - size / 2, cy), bottom, TEXT)?;
    sprite.fill_triangle(top, Point::new(cx + size / 2, cy), bottom, TEXT)
}
