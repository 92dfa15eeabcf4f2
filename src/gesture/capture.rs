// GestLock — Sample Window Capture
//
// Records a fixed wall-clock window of gyroscope samples. Each sample is read
// when the sensor raises DATA_READY inside the window, then the loop idles for
// one cadence period. The window is time-bounded: a slow sensor simply yields
// fewer samples.

use std::thread;
use std::time::{Duration, Instant};

use super::{GestureSequence, Sample3};
use crate::config::*;
use crate::signals::{SignalSet, Signals};

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Sensor set-up handed to [`Gyroscope::initiate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorConfig {
    /// Output data rate in Hz.
    pub rate_hz: u32,
    /// Zero-rate offset subtracted from every reading (rad/s).
    pub offset: Sample3,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            rate_hz: CAPTURE_RATE_HZ,
            offset: Sample3::new(GYRO_OFFSET_RAD_S[0], GYRO_OFFSET_RAD_S[1], GYRO_OFFSET_RAD_S[2]),
        }
    }
}

/// 3-axis angular-rate source.
pub trait Gyroscope: Send {
    /// Configure rate, range and the data-ready interrupt.
    fn initiate(&mut self, config: &SensorConfig) -> anyhow::Result<()>;
    /// Latest reading with the calibration offset applied.
    fn read_calibrated(&mut self) -> anyhow::Result<Sample3>;
}

/// Anything that can report the current level of a digital line.
pub trait LevelSource {
    fn is_high(&self) -> bool;
}

impl<F: Fn() -> bool> LevelSource for F {
    fn is_high(&self) -> bool {
        self()
    }
}

/// Finish installing the data-ready handler.
///
/// The sensor keeps its configuration across a warm boot, so its interrupt
/// line can already be asserted before the edge handler existed. No edge will
/// arrive for that sample; inject the signal by hand so the first capture does
/// not stall.
pub fn prime_data_ready(signals: &SignalSet, line: &impl LevelSource) -> bool {
    let asserted = line.is_high() && !signals.get().contains(Signals::DATA_READY);
    if asserted {
        log::debug!("Data-ready line already high, injecting signal");
        signals.set(Signals::DATA_READY);
    }
    asserted
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// Window length and nominal sampling rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConfig {
    pub window: Duration,
    pub rate_hz: u32,
}

impl CaptureConfig {
    /// Idle time between samples.
    pub fn cadence(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.rate_hz.max(1)))
    }

    /// Samples expected in a full window.
    pub fn nominal_samples(&self) -> usize {
        (self.window.as_millis() as u64 * u64::from(self.rate_hz) / 1000) as usize
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(CAPTURE_WINDOW_MS),
            rate_hz: CAPTURE_RATE_HZ,
        }
    }
}

/// Record one capture window.
///
/// Blocks only on DATA_READY (never past the window end) and on the cadence
/// delay. A sensor read error aborts the capture.
pub fn capture_window<G: Gyroscope + ?Sized>(
    gyro: &mut G,
    signals: &SignalSet,
    config: &CaptureConfig,
) -> anyhow::Result<GestureSequence> {
    let mut sequence = GestureSequence::with_capacity(config.nominal_samples());
    let cadence = config.cadence();
    let start = Instant::now();

    loop {
        let Some(remaining) = config.window.checked_sub(start.elapsed()) else {
            break;
        };
        if remaining.is_zero() {
            break;
        }

        if signals.wait_any_timeout(Signals::DATA_READY, remaining).is_none() {
            break;
        }
        signals.clear(Signals::DATA_READY);
        sequence.push(gyro.read_calibrated()?);

        thread::sleep(cadence);
    }

    log::debug!(
        "Captured {} samples in {} ms (nominal {})",
        sequence.len(),
        start.elapsed().as_millis(),
        config.nominal_samples()
    );
    Ok(sequence)
}
