//! Board painting
//!
//! Each method paints one region and assumes the caller holds the panel.
//! Text is drawn with a one pixel black shadow under the foreground.

use heapless::String;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::Point;
use railboard_protocol::BoardKind;

use super::layout::{
    rect, ClockBox, RowMetrics, CH_ESTIMATE, CH_OPERATOR, CH_PLATFORM, CH_TIME, COLBAR_H,
    COLBAR_Y, HEADER_H, PAD, PLACE_MAX_PX, ROW_TOP, SCREEN_H, SCREEN_W, TICKER_Y, X_ESTIMATE,
    X_OPERATOR, X_PLACE, X_PLATFORM, X_TIME,
};
use super::palette::{BAD, BODY_BG, HEAD_BG, HEAD_BORDER, LABEL, ROW_ALT, SHADOW, TEXT, TIME, WARN};
use crate::board::ServiceRow;
use crate::text::{contains_ignore_case, ellipsize, fit_words_px};
use crate::traits::{Anchor, Canvas, DisplayError, FontFace};

/// Face for rows and column labels
pub const ROW_FONT: FontFace = FontFace::Tiny;
/// Face for the title and clock
pub const HEADER_FONT: FontFace = FontFace::Small;
/// Face for full-screen messages
pub const MESSAGE_FONT: FontFace = FontFace::Regular;

/// Text of the loading screen
pub const LOADING_TEXT: &str = "Loading Board";

/// Widest clock text, used to size the clock box
const CLOCK_TEMPLATE: &str = "88:88";

/// Column labels in column order
pub fn column_labels(kind: BoardKind) -> [&'static str; 5] {
    match kind {
        BoardKind::Departures => ["STD", "To", "ETD", "Plt", "Operator"],
        BoardKind::Arrivals => ["STA", "From", "ETA", "Plt", "Operator"],
    }
}

/// Colour for an estimate such as `On time`, `10:07` or `Cancelled`
pub fn estimate_color(estimate: &str) -> Rgb565 {
    if contains_ignore_case(estimate, "cancel") || contains_ignore_case(estimate, "delay") {
        BAD
    } else if contains_ignore_case(estimate, "late") || estimate.contains(':') {
        WARN
    } else {
        TEXT
    }
}

fn shadow_text<C: Canvas + ?Sized>(
    canvas: &mut C,
    text: &str,
    pos: Point,
    anchor: Anchor,
    font: FontFace,
    color: Rgb565,
) -> Result<(), DisplayError> {
    canvas.draw_text(text, pos + Point::new(1, 1), anchor, font, SHADOW)?;
    canvas.draw_text(text, pos, anchor, font, color)
}

/// Small coach outline drawn in place of a platform number
///
/// `(x, y)` is the top-left corner; the icon is twice as wide as its body.
pub fn draw_bus_icon<C: Canvas + ?Sized>(
    canvas: &mut C,
    x: i32,
    y: i32,
    h: i32,
    fg: Rgb565,
    bg: Rgb565,
) -> Result<(), DisplayError> {
    let h = h.max(10);
    let body_h = (h - 4).max(6);
    let w = body_h * 2;

    canvas.fill_round_rect(rect(x, y, w, body_h), 3, fg)?;
    canvas.fill_rect(rect(x + 3, y + 2, w - 6, (body_h / 2 - 1).max(2)), bg)?;
    canvas.vline(Point::new(x + w - 6, y + 2), (body_h - 4).max(0) as u32, bg)?;
    canvas.fill_circle(Point::new(x + 5, y + body_h + 1), 2, fg)?;
    canvas.fill_circle(Point::new(x + w - 5, y + body_h + 1), 2, fg)
}

/// Paints board regions and remembers the last clock text
#[derive(Debug, Clone, Default)]
pub struct BoardPainter {
    last_clock: Option<String<5>>,
}

impl BoardPainter {
    pub const fn new() -> Self {
        Self { last_clock: None }
    }

    /// Full-screen loading message
    pub fn loading<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> Result<(), DisplayError> {
        canvas.clear(BODY_BG)?;
        let center = Point::new(SCREEN_W / 2, SCREEN_H / 2);
        canvas.draw_text(LOADING_TEXT, center, Anchor::Center, MESSAGE_FONT, TEXT)
    }

    /// Header band; invalidates the clock so it is drawn again
    pub fn header<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> Result<(), DisplayError> {
        let band = rect(0, 0, SCREEN_W, HEADER_H);
        canvas.fill_rect(band, HEAD_BG)?;
        canvas.stroke_rect(band, HEAD_BORDER)?;
        self.last_clock = None;
        Ok(())
    }

    /// Clock box for the current header font
    pub fn clock_box<C: Canvas + ?Sized>(&self, canvas: &C) -> ClockBox {
        ClockBox::compute(
            canvas.text_width(HEADER_FONT, CLOCK_TEMPLATE),
            canvas.font_height(HEADER_FONT),
        )
    }

    /// `"<station> <Departures|Arrivals>"`, fitted left of the clock
    pub fn title<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        station: &str,
        kind: BoardKind,
    ) -> Result<(), DisplayError> {
        let stop_x = self.clock_box(&*canvas).left();
        canvas.fill_rect(rect(1, 1, stop_x - 3 - 1, HEADER_H - 2), HEAD_BG)?;

        let mut text = alloc::string::String::with_capacity(station.len() + 11);
        text.push_str(station.trim());
        text.push(' ');
        text.push_str(kind.label());

        let max_px = (stop_x - PAD - 6).max(20);
        let fitted = fit_words_px(&*canvas, HEADER_FONT, &text, max_px);
        let font_h = canvas.font_height(HEADER_FONT);
        let y = (HEADER_H - font_h.max(16)) / 2;
        shadow_text(canvas, &fitted, Point::new(PAD, y), Anchor::TopLeft, HEADER_FONT, TEXT)
    }

    /// Column label bar
    pub fn column_bar<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        kind: BoardKind,
    ) -> Result<(), DisplayError> {
        canvas.fill_rect(rect(0, COLBAR_Y, SCREEN_W, COLBAR_H), ROW_ALT)?;
        let y = COLBAR_Y + COLBAR_H / 2;
        let columns = [X_TIME, X_PLACE, X_ESTIMATE, X_PLATFORM, X_OPERATOR];
        for (x, label) in columns.into_iter().zip(column_labels(kind)) {
            canvas.draw_text(label, Point::new(x, y), Anchor::MiddleLeft, ROW_FONT, LABEL)?;
        }
        Ok(())
    }

    /// Service rows, then the rest of the grid cleared to the body colour
    pub fn rows<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        services: &[ServiceRow],
        rows: usize,
    ) -> Result<(), DisplayError> {
        let metrics = RowMetrics::compute(canvas.font_height(ROW_FONT), rows);
        let shown = services.len().min(metrics.visible);

        for (i, service) in services.iter().take(shown).enumerate() {
            let bg = if i % 2 == 0 { BODY_BG } else { ROW_ALT };
            canvas.fill_rect(rect(0, metrics.row_top(i), SCREEN_W, metrics.row_h), bg)?;
            self.row(canvas, service, &metrics, i, bg)?;
        }

        let rest = metrics.row_top(shown).max(ROW_TOP);
        if rest < TICKER_Y {
            canvas.fill_rect(rect(0, rest, SCREEN_W, TICKER_Y - rest), BODY_BG)?;
        }
        Ok(())
    }

    fn row<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        service: &ServiceRow,
        metrics: &RowMetrics,
        i: usize,
        bg: Rgb565,
    ) -> Result<(), DisplayError> {
        let mid = metrics.row_mid(i);
        let at = |x| Point::new(x, mid);

        let time = ellipsize(&service.time, CH_TIME);
        shadow_text(canvas, &time, at(X_TIME), Anchor::MiddleLeft, ROW_FONT, TIME)?;

        let place = fit_words_px(&*canvas, ROW_FONT, &service.place, PLACE_MAX_PX);
        shadow_text(canvas, &place, at(X_PLACE), Anchor::MiddleLeft, ROW_FONT, TEXT)?;

        let color = estimate_color(&service.estimate);
        let estimate = ellipsize(&service.estimate, CH_ESTIMATE);
        shadow_text(canvas, &estimate, at(X_ESTIMATE), Anchor::MiddleLeft, ROW_FONT, color)?;

        if service.is_bus {
            let top = metrics.row_top(i);
            canvas.fill_rect(rect(X_PLATFORM - 2, top + 1, 26, metrics.row_h - 2), bg)?;
            let icon_h = (metrics.row_h - 6).clamp(12, 16);
            let y = top + (metrics.row_h - icon_h) / 2;
            draw_bus_icon(canvas, X_PLATFORM, y, icon_h, TEXT, bg)?;
        } else {
            let platform = ellipsize(&service.platform, CH_PLATFORM);
            shadow_text(canvas, &platform, at(X_PLATFORM), Anchor::MiddleLeft, ROW_FONT, TEXT)?;
        }

        let operator = ellipsize(&service.operator, CH_OPERATOR);
        shadow_text(canvas, &operator, at(X_OPERATOR), Anchor::MiddleLeft, ROW_FONT, TEXT)
    }

    /// Redraw the clock if `text` differs from what is on screen
    pub fn clock_if_changed<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        text: &str,
    ) -> Result<bool, DisplayError> {
        if self.last_clock.as_deref() == Some(text) {
            return Ok(false);
        }
        let clock = self.clock_box(&*canvas);
        canvas.fill_rect(clock.area, HEAD_BG)?;
        shadow_text(canvas, text, clock.text_origin, Anchor::TopLeft, HEADER_FONT, TEXT)?;

        let mut shown = String::new();
        let _ = shown.push_str(text);
        self.last_clock = Some(shown);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{Framebuffer, GraphicsCanvas};
    use embedded_graphics::pixelcolor::RgbColor;
    use embedded_graphics::prelude::Size;

    fn screen() -> GraphicsCanvas<Framebuffer> {
        GraphicsCanvas::new(Framebuffer::new(Size::new(SCREEN_W as u32, SCREEN_H as u32)))
    }

    fn row(time: &str, place: &str, estimate: &str, is_bus: bool) -> ServiceRow {
        ServiceRow {
            time: time.into(),
            place: place.into(),
            estimate: estimate.into(),
            platform: if is_bus { "".into() } else { "3".into() },
            operator: "LNER".into(),
            is_bus,
        }
    }

    fn lit_in(
        c: &GraphicsCanvas<Framebuffer>,
        x0: i32,
        x1: i32,
        y0: i32,
        y1: i32,
        color: Rgb565,
    ) -> usize {
        (y0..y1)
            .flat_map(|y| (x0..x1).map(move |x| Point::new(x, y)))
            .filter(|&p| c.target().pixel(p) == Some(color))
            .count()
    }

    #[test]
    fn test_estimate_color() {
        assert_eq!(estimate_color("On time"), TEXT);
        assert_eq!(estimate_color("Cancelled"), BAD);
        assert_eq!(estimate_color("DELAYED"), BAD);
        assert_eq!(estimate_color("10:07"), WARN);
        assert_eq!(estimate_color("Running late"), WARN);
    }

    #[test]
    fn test_column_labels_follow_kind() {
        assert_eq!(column_labels(BoardKind::Departures)[0], "STD");
        assert_eq!(column_labels(BoardKind::Arrivals)[1], "From");
    }

    #[test]
    fn test_loading_screen() {
        let mut c = screen();
        BoardPainter::new().loading(&mut c).unwrap();
        assert_eq!(c.target().pixel(Point::new(0, 0)), Some(BODY_BG));
        assert!(lit_in(&c, 0, SCREEN_W, 140, 180, TEXT) > 0);
    }

    #[test]
    fn test_title_stops_before_clock() {
        let mut c = screen();
        let mut painter = BoardPainter::new();
        painter.header(&mut c).unwrap();
        painter
            .title(&mut c, "A Very Long Station Name Indeed International", BoardKind::Departures)
            .unwrap();
        let stop_x = painter.clock_box(&c).left();
        assert!(lit_in(&c, 0, stop_x, 0, HEADER_H, TEXT) > 0);
        assert_eq!(lit_in(&c, stop_x, SCREEN_W, 0, HEADER_H, TEXT), 0);
    }

    #[test]
    fn test_clock_redrawn_only_on_change() {
        let mut c = screen();
        let mut painter = BoardPainter::new();
        painter.header(&mut c).unwrap();
        assert_eq!(painter.clock_if_changed(&mut c, "10:05"), Ok(true));
        assert_eq!(painter.clock_if_changed(&mut c, "10:05"), Ok(false));
        assert_eq!(painter.clock_if_changed(&mut c, "10:06"), Ok(true));

        painter.header(&mut c).unwrap();
        assert_eq!(painter.clock_if_changed(&mut c, "10:06"), Ok(true));
    }

    #[test]
    fn test_rows_alternate_and_clear_remainder() {
        let mut c = screen();
        c.clear(Rgb565::RED).unwrap();
        let services = [
            row("10:05", "Manchester Piccadilly", "On time", false),
            row("10:12", "Glasgow Central", "Cancelled", false),
        ];
        BoardPainter::new().rows(&mut c, &services, 8).unwrap();

        let m = RowMetrics::compute(13, 8);
        assert_eq!(c.target().pixel(Point::new(SCREEN_W - 1, m.row_top(0) + 1)), Some(BODY_BG));
        assert_eq!(c.target().pixel(Point::new(SCREEN_W - 1, m.row_top(1) + 1)), Some(ROW_ALT));
        assert_eq!(c.target().pixel(Point::new(SCREEN_W - 1, m.row_top(2) + 1)), Some(BODY_BG));
        assert_eq!(c.target().pixel(Point::new(5, TICKER_Y - 1)), Some(BODY_BG));
        assert_eq!(lit_in(&c, 0, SCREEN_W, m.row_top(2), TICKER_Y, TEXT), 0);

        assert!(lit_in(&c, X_TIME, X_PLACE, m.row_top(0), m.row_top(1), TIME) > 0);
        assert!(lit_in(&c, X_ESTIMATE, X_PLATFORM, m.row_top(1), m.row_top(2), BAD) > 0);
        assert_eq!(c.target().pixel(Point::new(5, TICKER_Y)), Some(Rgb565::RED));
    }

    #[test]
    fn test_bus_row_draws_icon() {
        let mut c = screen();
        let services = [row("10:20", "Milton Keynes", "On time", true)];
        BoardPainter::new().rows(&mut c, &services, 8).unwrap();
        let m = RowMetrics::compute(13, 8);
        let lit = lit_in(&c, X_PLATFORM, X_PLATFORM + 24, m.row_top(0), m.row_top(1), TEXT);
        assert!(lit > 40);
    }

    #[test]
    fn test_bus_icon_geometry() {
        let mut c = screen();
        draw_bus_icon(&mut c, 10, 10, 12, TEXT, BODY_BG).unwrap();
        // body 8 high, 16 wide; window cleared in the upper half
        assert_eq!(c.target().pixel(Point::new(12, 14)), Some(TEXT));
        assert_eq!(c.target().pixel(Point::new(14, 12)), Some(BODY_BG));
        assert_eq!(c.target().pixel(Point::new(15, 19)), Some(TEXT));
        assert_eq!(c.target().pixel(Point::new(30, 14)), Some(Rgb565::BLACK));
    }
}
