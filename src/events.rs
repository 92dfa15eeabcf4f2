// GestLock — System Events & Data Types

use crate::gesture::similarity::Score;
use crate::signals::Signals;

// ---------------------------------------------------------------------------
// Button gestures
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Short press with no second press inside the double-click window.
    Click,
    /// Two short presses inside the double-click window.
    DoubleClick,
    /// Press held past the long-press threshold.
    LongPress,
}

// ---------------------------------------------------------------------------
// Commands accepted by the capture/authentication task
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Enroll,
    Authenticate,
    Erase,
}

impl Command {
    pub fn signal(self) -> Signals {
        match self {
            Command::Enroll => Signals::RECORD,
            Command::Authenticate => Signals::UNLOCK,
            Command::Erase => Signals::ERASE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Command::Enroll => "Record",
            Command::Authenticate => "Unlock",
            Command::Erase => "Erase",
        }
    }

    /// Default mapping of the single user button.
    pub fn for_button(event: ButtonEvent) -> Self {
        match event {
            ButtonEvent::Click => Command::Authenticate,
            ButtonEvent::DoubleClick => Command::Enroll,
            ButtonEvent::LongPress => Command::Erase,
        }
    }
}

// ---------------------------------------------------------------------------
// UI Events — sent to the UI task via channel
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    /// A capture window opened for the given command.
    Capturing(Command),
    /// Template stored with this many samples.
    Enrolled(usize),
    /// Gesture matched the template.
    Unlocked(Score),
    /// Gesture compared and did not match.
    Rejected(Score),
    /// Authentication requested with nothing enrolled.
    NoTemplate,
    /// Capture held no motion after trimming.
    NoMotion,
    /// Template erased.
    Erased,
    /// Sensor or storage failure; the command was abandoned.
    Fault,
}
