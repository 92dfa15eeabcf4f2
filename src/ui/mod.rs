// GestLock — User Interface
//
// The display, touch panel and status indicator are board collaborators
// behind small traits; this module owns what they show.

pub mod screen;
pub mod touch;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

use crate::events::{Command, UiEvent};
use crate::gesture::similarity::Score;

use self::screen::{FrameBuffer, ScreenState};

/// A monochrome display that is drawn off-screen and pushed out on `flush`.
pub trait Panel: DrawTarget<Color = BinaryColor> {
    fn flush(&mut self) -> anyhow::Result<()>;
}

/// Host builds render straight into a frame buffer with nothing to push.
impl Panel for FrameBuffer {
    fn flush(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Short user feedback (LED blink or haptic pulse).
pub trait Indicator: Send {
    fn pulse(&mut self);
}

impl ScreenState {
    /// Fold a worker event into what the screen shows.
    pub fn apply(&mut self, event: &UiEvent) {
        self.active = None;
        self.detail.clear();
        match *event {
            UiEvent::Capturing(cmd) => {
                self.active = Some(cmd);
                self.status = match cmd {
                    Command::Enroll => "Recording key...",
                    Command::Authenticate => "Perform key...",
                    Command::Erase => "Erasing...",
                }
                .into();
            }
            UiEvent::Enrolled(n) => {
                self.enrolled = true;
                self.status = "Key saved".into();
                self.detail = format!("{} samples", n);
            }
            UiEvent::Unlocked(score) => {
                self.status = "Unlocked".into();
                self.detail = describe(&score);
            }
            UiEvent::Rejected(score) => {
                self.status = "Unlock failed".into();
                self.detail = describe(&score);
            }
            UiEvent::NoTemplate => {
                self.enrolled = false;
                self.status = "No key saved".into();
            }
            UiEvent::NoMotion => self.status = "No motion seen".into(),
            UiEvent::Erased => {
                self.enrolled = false;
                self.status = "Key erased".into();
            }
            UiEvent::Fault => self.status = "Sensor/storage error".into(),
        }
    }
}

fn describe(score: &Score) -> String {
    match score {
        Score::Correlation([x, y, z]) => format!("r {:.2} {:.2} {:.2}", x, y, z),
        Score::Distance(d) => format!("dtw {:.1}", d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrollment_marker_follows_events() {
        let mut s = ScreenState::default();
        s.apply(&UiEvent::Enrolled(42));
        assert!(s.enrolled);
        assert_eq!(s.detail, "42 samples");

        s.apply(&UiEvent::Capturing(Command::Authenticate));
        assert_eq!(s.active, Some(Command::Authenticate));
        assert!(s.enrolled);

        s.apply(&UiEvent::Erased);
        assert!(!s.enrolled);
        assert_eq!(s.active, None);
    }

    #[test]
    fn scores_are_summarised_on_one_line() {
        let mut s = ScreenState::default();
        s.apply(&UiEvent::Rejected(Score::Correlation([0.91, -0.5, 0.333])));
        assert_eq!(s.status, "Unlock failed");
        assert_eq!(s.detail, "r 0.91 -0.50 0.33");
        assert!(s.detail.len() <= 21);
    }
}
