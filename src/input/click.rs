// GestLock — Click Classifier
//
// Classifies confirmed press/release edges of one button:
//
//   press ─► Pressed ─release≥long─► LongPress, Idle
//                    └release<long─► pending? DoubleClick, Idle
//                                             : AwaitingSecondClick (arm window)
//   window expires in AwaitingSecondClick ─► Click, Idle
//
// Every transition is a field update plus at most one deadline arm/cancel.

use std::time::{Duration, Instant};

use crate::config::*;
use crate::events::ButtonEvent;

/// Thresholds for one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickTiming {
    pub debounce: Duration,
    pub long_press: Duration,
    pub double_click: Duration,
}

impl Default for ClickTiming {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEBOUNCE_MS),
            long_press: Duration::from_millis(LONG_PRESS_MS),
            double_click: Duration::from_millis(DOUBLE_CLICK_WINDOW_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickState {
    Idle,
    Pressed,
    AwaitingSecondClick,
    /// Second press is down while the first click is still pending.
    PressedAwaiting,
}

#[derive(Debug, Clone)]
pub struct ClickClassifier {
    timing: ClickTiming,
    /// Start of the current press, `None` while released.
    pressed_at: Option<Instant>,
    /// Double-click decision deadline, `Some` while a short press is pending.
    click_deadline: Option<Instant>,
}

impl ClickClassifier {
    pub fn new(timing: ClickTiming) -> Self {
        Self {
            timing,
            pressed_at: None,
            click_deadline: None,
        }
    }

    pub fn timing(&self) -> &ClickTiming {
        &self.timing
    }

    pub fn state(&self) -> ClickState {
        match (self.pressed_at.is_some(), self.click_deadline.is_some()) {
            (false, false) => ClickState::Idle,
            (true, false) => ClickState::Pressed,
            (false, true) => ClickState::AwaitingSecondClick,
            (true, true) => ClickState::PressedAwaiting,
        }
    }

    /// Press time so far, zero while released.
    pub fn held_for(&self, now: Instant) -> Duration {
        self.pressed_at
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or_default()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.click_deadline
    }

    /// Confirmed button-down.
    pub fn press(&mut self, now: Instant) {
        self.pressed_at = Some(now);
    }

    /// Confirmed button-up.
    pub fn release(&mut self, now: Instant) -> Option<ButtonEvent> {
        // A release without a press (e.g. pressed at boot) measures nothing.
        let start = self.pressed_at.take()?;
        let held = now.saturating_duration_since(start);

        if held >= self.timing.long_press {
            return Some(ButtonEvent::LongPress);
        }

        if self.click_deadline.take().is_some() {
            Some(ButtonEvent::DoubleClick)
        } else {
            self.click_deadline = Some(now + self.timing.double_click);
            None
        }
    }

    /// Fire the double-click window if it has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<ButtonEvent> {
        match self.click_deadline {
            Some(deadline) if deadline <= now => {
                self.click_deadline = None;
                Some(ButtonEvent::Click)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(t0: Instant, n: u64) -> Instant {
        t0 + Duration::from_millis(n)
    }

    /// Drive the classifier with (press_ms, release_ms) pairs, polling every
    /// millisecond up to `until`, and collect what it emits.
    fn run(presses: &[(u64, u64)], until: u64) -> Vec<ButtonEvent> {
        let t0 = Instant::now();
        let mut c = ClickClassifier::new(ClickTiming::default());
        let mut out = Vec::new();
        for n in 0..=until {
            let now = ms(t0, n);
            out.extend(c.poll(now));
            for &(down, up) in presses {
                if n == down {
                    c.press(now);
                }
                if n == up {
                    out.extend(c.release(now));
                }
            }
        }
        out
    }

    #[test]
    fn long_press_only() {
        assert_eq!(run(&[(0, 500)], 2000), vec![ButtonEvent::LongPress]);
        assert_eq!(run(&[(0, 1500)], 3000), vec![ButtonEvent::LongPress]);
    }

    #[test]
    fn single_click_fires_after_window() {
        let t0 = Instant::now();
        let mut c = ClickClassifier::new(ClickTiming::default());
        c.press(t0);
        assert_eq!(c.release(ms(t0, 80)), None);
        assert_eq!(c.state(), ClickState::AwaitingSecondClick);
        assert_eq!(c.poll(ms(t0, 329)), None);
        assert_eq!(c.poll(ms(t0, 330)), Some(ButtonEvent::Click));
        assert_eq!(c.state(), ClickState::Idle);
        assert_eq!(c.poll(ms(t0, 1000)), None);
    }

    #[test]
    fn two_quick_presses_make_one_double_click() {
        assert_eq!(run(&[(0, 80), (200, 260)], 2000), vec![ButtonEvent::DoubleClick]);
    }

    #[test]
    fn slow_second_press_gives_two_clicks() {
        assert_eq!(
            run(&[(0, 80), (400, 450)], 2000),
            vec![ButtonEvent::Click, ButtonEvent::Click]
        );
    }

    #[test]
    fn long_press_after_click_does_not_leak_state() {
        let out = run(&[(0, 80), (200, 900), (1200, 1250)], 3000);
        assert_eq!(
            out,
            vec![ButtonEvent::Click, ButtonEvent::LongPress, ButtonEvent::Click]
        );
    }

    #[test]
    fn long_press_resets_measurement() {
        let t0 = Instant::now();
        let mut c = ClickClassifier::new(ClickTiming::default());
        c.press(t0);
        assert_eq!(c.held_for(ms(t0, 300)), Duration::from_millis(300));
        assert_eq!(c.release(ms(t0, 700)), Some(ButtonEvent::LongPress));
        assert_eq!(c.held_for(ms(t0, 800)), Duration::ZERO);
        assert_eq!(c.state(), ClickState::Idle);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let t0 = Instant::now();
        let mut c = ClickClassifier::new(ClickTiming::default());
        assert_eq!(c.release(t0), None);
        assert_eq!(c.state(), ClickState::Idle);
    }
}
