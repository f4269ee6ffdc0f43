//! Ticker frame loop body
//!
//! The engine owns a band-sized sprite. Frames are composed into it without
//! touching the panel; only the final blit and border stroke run under the
//! shared display lock, so the board renderer is never held off for longer
//! than one band copy.

use alloc::string::String;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embedded_graphics::prelude::{Point, Size};

use super::cache::has_advisories;
use super::ribbon::Ribbon;
use crate::graphics::{Framebuffer, GraphicsCanvas};
use crate::render::layout::{rect, SCREEN_W, TICKER_H, TICKER_Y};
use crate::render::palette::HEAD_BORDER;
use crate::traits::{Canvas, Display, DisplayError};

pub struct TickerEngine {
    ribbon: Ribbon,
    sprite: GraphicsCanvas<Framebuffer>,
}

impl TickerEngine {
    pub fn new() -> Self {
        Self {
            ribbon: Ribbon::new(),
            sprite: GraphicsCanvas::new(Framebuffer::new(Size::new(
                SCREEN_W as u32,
                TICKER_H as u32,
            ))),
        }
    }

    /// Seed from the cached file read at boot
    ///
    /// Scrolls straight away only if the file holds real advisories.
    pub fn warm_start(&mut self, cached: Option<String>) {
        if let Some(content) = cached {
            let scrolling = has_advisories(&content);
            self.ribbon.set_content(content);
            self.ribbon.set_has_advisories(scrolling);
        }
    }

    /// Apply a notification from the fetch side
    pub fn update(&mut self, has_advisories: bool, content: Option<String>) {
        if let Some(content) = content {
            self.ribbon.set_content(content);
        }
        self.ribbon.set_has_advisories(has_advisories);
    }

    pub fn ribbon(&self) -> &Ribbon {
        &self.ribbon
    }

    /// Compose one frame and push it to the panel
    ///
    /// The band is pushed every frame, static or not, so anything the board
    /// painter drew over it is gone by the next tick.
    pub async fn frame<M, D>(&mut self, display: &Mutex<M, D>) -> Result<(), DisplayError>
    where
        M: RawMutex,
        D: Display,
    {
        self.ribbon.compose(&mut self.sprite)?;
        {
            let mut panel = display.lock().await;
            panel.blit(self.sprite.target(), Point::new(0, TICKER_Y))?;
            panel.stroke_rect(rect(0, TICKER_Y, SCREEN_W, TICKER_H), HEAD_BORDER)?;
        }
        self.ribbon.advance();
        Ok(())
    }
}

impl Default for TickerEngine {
    fn default() -> Self {
        Self::new()
    }
}
