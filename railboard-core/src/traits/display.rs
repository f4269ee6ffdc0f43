//! Pixel surface traits
//!
//! The renderer only needs filled shapes, text in a handful of fixed
//! bitmap faces, glyph measurement, and a way to push an off-screen
//! buffer to the panel.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use crate::graphics::Framebuffer;

/// Errors that can occur while drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus or driver failure while pushing pixels
    Bus,
    /// Drawing request outside the surface
    OutOfBounds,
}

/// Bitmap faces available to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontFace {
    /// Rows, column labels, ticker
    Tiny,
    /// Title and clock
    Small,
    /// Full-screen messages
    Regular,
}

/// Reference point of a text draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Anchor {
    TopLeft,
    MiddleLeft,
    BottomLeft,
    Center,
}

/// Glyph metrics
pub trait TextMeasure {
    /// Rendered width of `text` in pixels
    fn text_width(&self, font: FontFace, text: &str) -> i32;

    /// Line height of `font` in pixels
    fn font_height(&self, font: FontFace) -> i32;
}

/// A drawable pixel surface
pub trait Canvas: TextMeasure {
    /// Surface dimensions
    fn size(&self) -> Size;

    /// Fill a rectangle
    fn fill_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), DisplayError>;

    /// Draw a 1px rectangle outline
    fn stroke_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), DisplayError>;

    /// Fill a rectangle with rounded corners
    fn fill_round_rect(
        &mut self,
        area: Rectangle,
        radius: u32,
        color: Rgb565,
    ) -> Result<(), DisplayError>;

    /// Fill a circle of `radius` around `center`
    fn fill_circle(&mut self, center: Point, radius: u32, color: Rgb565)
        -> Result<(), DisplayError>;

    /// Fill a triangle
    fn fill_triangle(
        &mut self,
        a: Point,
        b: Point,
        c: Point,
        color: Rgb565,
    ) -> Result<(), DisplayError>;

    /// Draw text with its `anchor` point at `pos`
    fn draw_text(
        &mut self,
        text: &str,
        pos: Point,
        anchor: Anchor,
        font: FontFace,
        color: Rgb565,
    ) -> Result<(), DisplayError>;

    /// Fill the whole surface
    fn clear(&mut self, color: Rgb565) -> Result<(), DisplayError> {
        let area = Rectangle::new(Point::zero(), self.size());
        self.fill_rect(area, color)
    }

    /// Vertical 1px line
    fn vline(&mut self, top: Point, len: u32, color: Rgb565) -> Result<(), DisplayError> {
        self.fill_rect(Rectangle::new(top, Size::new(1, len)), color)
    }
}

/// The physical panel
pub trait Display: Canvas {
    /// Copy an off-screen buffer to the panel with its top-left at `origin`
    fn blit(&mut self, sprite: &Framebuffer, origin: Point) -> Result<(), DisplayError>;
}
