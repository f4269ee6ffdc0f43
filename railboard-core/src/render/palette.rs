//! Board colours

use embedded_graphics::pixelcolor::Rgb565;

const fn rgb(r: u8, g: u8, b: u8) -> Rgb565 {
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

/// Row grid background
pub const BODY_BG: Rgb565 = rgb(0x0b, 0x10, 0x20);
/// Alternate rows and column bar
pub const ROW_ALT: Rgb565 = rgb(0x0d, 0x12, 0x30);
/// Header and ticker band
pub const HEAD_BG: Rgb565 = rgb(0x13, 0x1a, 0x33);
/// Header and ticker outline
pub const HEAD_BORDER: Rgb565 = rgb(0x24, 0x30, 0x59);
/// Late and retimed services
pub const WARN: Rgb565 = rgb(0xff, 0xd1, 0x66);
/// Cancelled and delayed services
pub const BAD: Rgb565 = rgb(0xff, 0x5d, 0x5d);
/// Column labels
pub const LABEL: Rgb565 = rgb(0x9f, 0xb3, 0xff);
/// Scheduled times
pub const TIME: Rgb565 = rgb(0xff, 0xff, 0x00);
pub const TEXT: Rgb565 = rgb(0xff, 0xff, 0xff);
pub const SHADOW: Rgb565 = rgb(0x00, 0x00, 0x00);

