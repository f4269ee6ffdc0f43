//! ILI9488 panel, 480×320 landscape over an 8-bit parallel GPIO bus.
//!
//! RD and RST are strapped high on the board, so the driver runs without a
//! reset pin and CS is simply held low.

use esp_hal::delay::Delay;
use esp_hal::gpio::{Level, Output, OutputConfig};
use mipidsi::interface::{Generic8BitBus, ParallelInterface};
use mipidsi::models::ILI9488Rgb565;
use mipidsi::options::{ColorOrder, Orientation, Rotation};
use mipidsi::NoResetPin;
use railboard_core::graphics::GraphicsCanvas;
use railboard_core::render::layout::{SCREEN_H, SCREEN_W};

use crate::PanelResources;

type Bus<'a> = Generic8BitBus<
    Output<'a>,
    Output<'a>,
    Output<'a>,
    Output<'a>,
    Output<'a>,
    Output<'a>,
    Output<'a>,
    Output<'a>,
>;

type Interface<'a> = ParallelInterface<Bus<'a>, Output<'a>, Output<'a>>;

/// The raw mipidsi driver
pub type Ili9488<'a> = mipidsi::Display<Interface<'a>, ILI9488Rgb565, NoResetPin>;

/// The panel as the renderer sees it
pub type Panel = GraphicsCanvas<Ili9488<'static>>;

/// Panel bring-up failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InitError;

fn out<'a>(pin: impl esp_hal::gpio::OutputPin + 'a, level: Level) -> Output<'a> {
    Output::new(pin, level, OutputConfig::default())
}

/// Bring up the panel in landscape and wrap it for the renderer
pub fn init(res: PanelResources<'static>) -> Result<Panel, InitError> {
    let mut delay = Delay::new();

    // Held low for the lifetime of the firmware
    let cs = out(res.cs, Level::Low);
    core::mem::forget(cs);

    let dc = out(res.dc, Level::Low);
    let wr = out(res.wr, Level::High);
    let bus = Generic8BitBus::new((
        out(res.d0, Level::Low),
        out(res.d1, Level::Low),
        out(res.d2, Level::Low),
        out(res.d3, Level::Low),
        out(res.d4, Level::Low),
        out(res.d5, Level::Low),
        out(res.d6, Level::Low),
        out(res.d7, Level::Low),
    ));
    let di = ParallelInterface::new(bus, dc, wr);

    let display = mipidsi::Builder::new(ILI9488Rgb565, di)
        .display_size(SCREEN_H as u16, SCREEN_W as u16)
        .color_order(ColorOrder::Bgr)
        .orientation(Orientation::new().rotate(Rotation::Deg90))
        .init(&mut delay)
        .map_err(|_| InitError)?;

    Ok(GraphicsCanvas::new(display))
}
