// GestLock — Screen Layout & Rendering
//
// 128×64 monochrome layout:
//
//   ┌──────────────────────────────┐
//   │ GestLock          [key|----] │  title + enrollment marker
//   │ <status line>                │
//   │ <detail line>                │
//   │ [Record] [Unlock] [ Erase ]  │  touch buttons
//   └──────────────────────────────┘
//
// Rendering goes to any `embedded-graphics` draw target; `FrameBuffer` is the
// SSD1306 page-ordered buffer the OLED driver flushes.

use embedded_graphics::mono_font::ascii::{FONT_5X8, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{ContainsPoint, PointsIter, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use super::touch::TouchPoint;
use crate::config::*;
use crate::events::Command;

// ---------------------------------------------------------------------------
// Frame buffer
// ---------------------------------------------------------------------------

/// SSD1306 layout: byte `x + (y / 8) * WIDTH`, bit `y % 8`.
#[derive(Clone)]
pub struct FrameBuffer {
    buf: [u8; DISPLAY_BUFFER_SIZE],
}

impl FrameBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; DISPLAY_BUFFER_SIZE],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return false;
        }
        let (idx, bit) = Self::locate(x, y);
        self.buf[idx] & bit != 0
    }

    /// Number of lit pixels inside `area`.
    pub fn lit_in(&self, area: &Rectangle) -> usize {
        area.points()
            .filter(|p| p.x >= 0 && p.y >= 0 && self.pixel(p.x as u32, p.y as u32))
            .count()
    }

    fn locate(x: u32, y: u32) -> (usize, u8) {
        ((x + (y / 8) * SCREEN_WIDTH) as usize, 1 << (y % 8))
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if p.x < 0 || p.y < 0 || p.x as u32 >= SCREEN_WIDTH || p.y as u32 >= SCREEN_HEIGHT {
                continue;
            }
            let (idx, bit) = Self::locate(p.x as u32, p.y as u32);
            if color.is_on() {
                self.buf[idx] |= bit;
            } else {
                self.buf[idx] &= !bit;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

const BUTTON_Y: i32 = 42;
const BUTTON_W: u32 = 40;
const BUTTON_H: u32 = 20;
const BUTTON_GAP: i32 = 3;

/// A labelled touch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchButton {
    pub command: Command,
    pub area: Rectangle,
}

/// The three command buttons, left to right.
pub fn buttons() -> [TouchButton; 3] {
    let at = |i: i32, command| TouchButton {
        command,
        area: Rectangle::new(
            Point::new(1 + i * (BUTTON_W as i32 + BUTTON_GAP), BUTTON_Y),
            Size::new(BUTTON_W, BUTTON_H),
        ),
    };
    [
        at(0, Command::Enroll),
        at(1, Command::Authenticate),
        at(2, Command::Erase),
    ]
}

/// Command under a touch, if any.
pub fn hit_test(point: TouchPoint) -> Option<Command> {
    let p = Point::new(i32::from(point.x), i32::from(point.y));
    buttons()
        .into_iter()
        .find(|b| b.area.contains(p))
        .map(|b| b.command)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// What the screen currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenState {
    pub status: String,
    pub detail: String,
    pub enrolled: bool,
    /// Command whose button is drawn filled (capture in progress).
    pub active: Option<Command>,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            status: "Ready".into(),
            detail: String::new(),
            enrolled: false,
            active: None,
        }
    }
}

/// Draw a rectangle with a centred label; `filled` inverts it.
pub fn draw_labeled_rect<D>(
    target: &mut D,
    area: Rectangle,
    label: &str,
    filled: bool,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let (fill, ink) = if filled {
        (PrimitiveStyle::with_fill(BinaryColor::On), BinaryColor::Off)
    } else {
        (PrimitiveStyle::with_stroke(BinaryColor::On, 1), BinaryColor::On)
    };
    area.into_styled(fill).draw(target)?;

    let centred = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Middle)
        .build();
    let ink = MonoTextStyle::new(&FONT_6X10, ink);
    Text::with_text_style(label, area.center(), ink, centred).draw(target)?;
    Ok(())
}

/// Draw a single line of text with its top-left corner at `origin`.
pub fn draw_text<D>(target: &mut D, text: &str, origin: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    Text::with_baseline(text, origin, style, Baseline::Top).draw(target)?;
    Ok(())
}

/// Render a full frame.
pub fn render<D>(target: &mut D, state: &ScreenState) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off)?;

    draw_text(target, "GestLock", Point::new(2, 0))?;
    let marker = if state.enrolled { "key" } else { "----" };
    Text::with_alignment(
        marker,
        Point::new(SCREEN_WIDTH as i32 - 2, 7),
        MonoTextStyle::new(&FONT_5X8, BinaryColor::On),
        Alignment::Right,
    )
    .draw(target)?;

    draw_text(target, &state.status, Point::new(2, 14))?;
    draw_text(target, &state.detail, Point::new(2, 26))?;

    for b in buttons() {
        draw_labeled_rect(target, b.area, b.command.label(), state.active == Some(b.command))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_fit_on_screen_without_overlap() {
        let bs = buttons();
        let screen = Rectangle::new(Point::zero(), Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
        for (i, a) in bs.iter().enumerate() {
            assert!(screen.contains(a.area.top_left));
            assert!(a.area.bottom_right().map_or(false, |p| screen.contains(p)));
            for b in &bs[i + 1..] {
                assert!(a.area.intersection(&b.area).is_zero_sized());
            }
        }
    }

    #[test]
    fn hit_test_maps_centres_and_misses_gaps() {
        for b in buttons() {
            let c = b.area.center();
            let p = TouchPoint { x: c.x as u16, y: c.y as u16 };
            assert_eq!(hit_test(p), Some(b.command));
        }
        assert_eq!(hit_test(TouchPoint { x: 43, y: 50 }), None);
        assert_eq!(hit_test(TouchPoint { x: 60, y: 5 }), None);
    }

    #[test]
    fn framebuffer_uses_page_layout() {
        let mut fb = FrameBuffer::new();
        Pixel(Point::new(3, 9), BinaryColor::On).draw(&mut fb).unwrap();
        assert!(fb.pixel(3, 9));
        assert_eq!(fb.as_bytes()[3 + 128], 0b10);
        // Off-screen pixels are clipped, not a panic.
        Pixel(Point::new(-1, 200), BinaryColor::On).draw(&mut fb).unwrap();
    }

    #[test]
    fn render_draws_buttons_and_highlights_active() {
        let mut fb = FrameBuffer::new();
        let mut state = ScreenState::default();
        render(&mut fb, &state).unwrap();
        let record = buttons()[0].area;
        let outline = fb.lit_in(&record);
        assert!(outline > 0);

        state.active = Some(Command::Enroll);
        render(&mut fb, &state).unwrap();
        assert!(fb.lit_in(&record) > outline);
    }
}
