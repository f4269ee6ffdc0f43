//! embedded-graphics adaptor and off-screen buffer
//!
//! [`GraphicsCanvas`] implements the renderer's [`Canvas`] and [`Display`]
//! traits for any `DrawTarget<Color = Rgb565>`, whether that is the panel
//! driver or a [`Framebuffer`] sprite.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_7X13, FONT_9X18_BOLD};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, PrimitiveStyle, Rectangle, RoundedRectangle, Triangle,
};
use embedded_graphics::text::{Baseline, Text, TextStyleBuilder};

use crate::text::ELLIPSIS;
use crate::traits::{Anchor, Canvas, Display, DisplayError, FontFace, TextMeasure};

/// Bitmap font backing each face
pub fn mono_font(face: FontFace) -> &'static MonoFont<'static> {
    match face {
        FontFace::Tiny => &FONT_7X13,
        FontFace::Small => &FONT_9X18_BOLD,
        FontFace::Regular => &FONT_10X20,
    }
}

fn advance(font: &MonoFont<'_>) -> i32 {
    (font.character_size.width + font.character_spacing) as i32
}

/// Off-screen RGB565 pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    size: Size,
    pixels: Vec<Rgb565>,
}

impl Framebuffer {
    /// Allocate a black buffer
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![Rgb565::BLACK; (size.width * size.height) as usize],
        }
    }

    /// Row-major pixel data
    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    /// Pixel at `p`, if inside the buffer
    pub fn pixel(&self, p: Point) -> Option<Rgb565> {
        self.index(p).map(|i| self.pixels[i])
    }

    fn index(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 {
            return None;
        }
        let (x, y) = (p.x as u32, p.y as u32);
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some((y * self.size.width + x) as usize)
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(i) = self.index(point) {
                self.pixels[i] = color;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };
        let width = self.size.width as usize;
        for y in area.top_left.y..=bottom_right.y {
            let row = y as usize * width;
            let start = row + area.top_left.x as usize;
            let end = row + bottom_right.x as usize;
            self.pixels[start..=end].fill(color);
        }
        Ok(())
    }
}

/// Renderer surface over an embedded-graphics draw target
pub struct GraphicsCanvas<D> {
    target: D,
}

impl<D> GraphicsCanvas<D> {
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }
}

impl<D> TextMeasure for GraphicsCanvas<D> {
    fn text_width(&self, font: FontFace, text: &str) -> i32 {
        text.chars().count() as i32 * advance(mono_font(font))
    }

    fn font_height(&self, font: FontFace) -> i32 {
        mono_font(font).character_size.height as i32
    }
}

impl<D> GraphicsCanvas<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn draw_styled<S>(&mut self, shape: S) -> Result<(), DisplayError>
    where
        S: Drawable<Color = Rgb565>,
    {
        shape.draw(&mut self.target).map(|_| ()).map_err(|_| DisplayError::Bus)
    }

    /// The fonts have no ellipsis glyph, so draw three dots in one cell
    fn draw_ellipsis(
        &mut self,
        cell_left: i32,
        cell_top: i32,
        font: &MonoFont<'_>,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        let adv = advance(font);
        let dot = if adv >= 9 { 2 } else { 1 };
        let gap = ((adv - 3 * dot) / 4).max(0);
        let y = cell_top + font.baseline as i32 - dot + 1;
        for k in 0..3 {
            let x = cell_left + gap * (k + 1) + dot * k;
            let area = Rectangle::new(Point::new(x, y), Size::new(dot as u32, dot as u32));
            self.draw_styled(area.into_styled(PrimitiveStyle::with_fill(color)))?;
        }
        Ok(())
    }
}

impl<D> Canvas for GraphicsCanvas<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn size(&self) -> Size {
        self.target.bounding_box().size
    }

    fn fill_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), DisplayError> {
        self.target.fill_solid(&area, color).map_err(|_| DisplayError::Bus)
    }

    fn stroke_rect(&mut self, area: Rectangle, color: Rgb565) -> Result<(), DisplayError> {
        self.draw_styled(area.into_styled(PrimitiveStyle::with_stroke(color, 1)))
    }

    fn fill_round_rect(
        &mut self,
        area: Rectangle,
        radius: u32,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        let shape = RoundedRectangle::with_equal_corners(area, Size::new(radius, radius));
        self.draw_styled(shape.into_styled(PrimitiveStyle::with_fill(color)))
    }

    fn fill_circle(&mut self, center: Point, radius: u32, color: Rgb565) -> Result<(), DisplayError> {
        let shape = Circle::with_center(center, radius * 2 + 1);
        self.draw_styled(shape.into_styled(PrimitiveStyle::with_fill(color)))
    }

    fn fill_triangle(
        &mut self,
        a: Point,
        b: Point,
        c: Point,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        self.draw_styled(Triangle::new(a, b, c).into_styled(PrimitiveStyle::with_fill(color)))
    }

    fn draw_text(
        &mut self,
        text: &str,
        pos: Point,
        anchor: Anchor,
        face: FontFace,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        let font = mono_font(face);
        let height = font.character_size.height as i32;
        let (baseline, cell_top) = match anchor {
            Anchor::TopLeft => (Baseline::Top, pos.y),
            Anchor::MiddleLeft | Anchor::Center => (Baseline::Middle, pos.y - (height - 1) / 2),
            Anchor::BottomLeft => (Baseline::Bottom, pos.y - (height - 1)),
        };
        let mut x = match anchor {
            Anchor::Center => pos.x - self.text_width(face, text) / 2,
            _ => pos.x,
        };

        let style = MonoTextStyle::new(font, color);
        let layout = TextStyleBuilder::new().baseline(baseline).build();
        for (i, segment) in text.split(ELLIPSIS).enumerate() {
            if i > 0 {
                self.draw_ellipsis(x, cell_top, font, color)?;
                x += advance(font);
            }
            if !segment.is_empty() {
                let item = Text::with_text_style(segment, Point::new(x, pos.y), style, layout);
                self.draw_styled(item)?;
                x += self.text_width(face, segment);
            }
        }
        Ok(())
    }
}

impl<D> Display for GraphicsCanvas<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn blit(&mut self, sprite: &Framebuffer, origin: Point) -> Result<(), DisplayError> {
        let area = Rectangle::new(origin, sprite.size());
        self.target
            .fill_contiguous(&area, sprite.pixels().iter().copied())
            .map_err(|_| DisplayError::Bus)
    }
}
