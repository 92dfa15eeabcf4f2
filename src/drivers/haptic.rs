// GestLock — Status Indicator Driver
//
// GPIO-driven LED or vibration motor.

use std::thread;
use std::time::Duration;

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

use gestlock::config::INDICATOR_PULSE_MS;
use gestlock::ui::Indicator;

pub struct IndicatorDriver<'d> {
    pin: PinDriver<'d, AnyOutputPin, Output>,
}

impl<'d> IndicatorDriver<'d> {
    pub fn new(pin: PinDriver<'d, AnyOutputPin, Output>) -> Self {
        Self { pin }
    }

    /// Drive the output for a custom duration (blocks the calling thread).
    pub fn buzz(&mut self, duration: Duration) {
        let _ = self.pin.set_high();
        thread::sleep(duration);
        let _ = self.pin.set_low();
    }
}

impl Indicator for IndicatorDriver<'static> {
    fn pulse(&mut self) {
        self.buzz(Duration::from_millis(INDICATOR_PULSE_MS));
    }
}
