// GestLock — Simulated Collaborators
//
// Stand-ins for the board peripherals so the engine and the tasks can run on
// a host: a gyroscope that replays scripted samples, a data-ready clock that
// raises DATA_READY at the sensor rate, a scripted touch panel and an
// indicator that counts its pulses.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::bail;

use crate::gesture::capture::{Gyroscope, SensorConfig};
use crate::gesture::Sample3;
use crate::signals::{SignalSet, Signals};
use crate::ui::touch::{TouchPanel, TouchPoint};
use crate::ui::Indicator;

// ---------------------------------------------------------------------------
// Gyroscope
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Script {
    samples: VecDeque<Sample3>,
    failing: bool,
    config: Option<SensorConfig>,
}

/// Replays queued samples, then reports a hand at rest.
///
/// Clones share the queue, so a test can keep one clone and feed the next
/// gesture while another clone is owned by the capture task.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGyro {
    script: Arc<Mutex<Script>>,
}

impl ScriptedGyro {
    pub fn new(samples: Vec<Sample3>) -> Self {
        let gyro = Self::default();
        gyro.queue(samples);
        gyro
    }

    /// Gyro whose every read fails.
    pub fn failing() -> Self {
        let gyro = Self::default();
        gyro.set_failing(true);
        gyro
    }

    /// Replace whatever is left of the script.
    pub fn queue(&self, samples: Vec<Sample3>) {
        self.lock().samples = samples.into();
    }

    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Config passed to the last `initiate`.
    pub fn config(&self) -> Option<SensorConfig> {
        self.lock().config
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Gyroscope for ScriptedGyro {
    fn initiate(&mut self, config: &SensorConfig) -> anyhow::Result<()> {
        self.lock().config = Some(*config);
        Ok(())
    }

    fn read_calibrated(&mut self) -> anyhow::Result<Sample3> {
        let mut script = self.lock();
        if script.failing {
            bail!("simulated bus error");
        }
        Ok(script.samples.pop_front().unwrap_or_default())
    }
}

/// Raise DATA_READY at `rate_hz` until `stop` is set.
///
/// `signals` is anything that owns the signal set: the set itself or the
/// shared task context.
pub fn spawn_data_ready_clock<T>(
    signals: Arc<T>,
    rate_hz: u32,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()>
where
    T: AsRef<SignalSet> + Send + Sync + 'static,
{
    let period = Duration::from_micros(1_000_000 / u64::from(rate_hz.max(1)));
    thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            (*signals).as_ref().set(Signals::DATA_READY);
            thread::sleep(period);
        }
    })
}

// ---------------------------------------------------------------------------
// Touch panel
// ---------------------------------------------------------------------------

/// Touch panel fed from a queue of readings; idle once the queue is empty.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTouch {
    readings: Arc<Mutex<VecDeque<Option<TouchPoint>>>>,
}

impl ScriptedTouch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a tap: `hold` touched readings at (x, y), then one release.
    pub fn tap(&self, x: u16, y: u16, hold: usize) {
        let mut q = self.readings.lock().unwrap_or_else(|e| e.into_inner());
        q.extend(std::iter::repeat(Some(TouchPoint { x, y })).take(hold.max(1)));
        q.push_back(None);
    }

    pub fn is_drained(&self) -> bool {
        self.readings.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }
}

impl TouchPanel for ScriptedTouch {
    fn read(&mut self) -> anyhow::Result<Option<TouchPoint>> {
        let mut q = self.readings.lock().unwrap_or_else(|e| e.into_inner());
        Ok(q.pop_front().flatten())
    }
}

// ---------------------------------------------------------------------------
// Indicator
// ---------------------------------------------------------------------------

/// Counts pulses instead of blinking anything.
#[derive(Debug, Clone, Default)]
pub struct CountingIndicator {
    pulses: Arc<AtomicUsize>,
}

impl CountingIndicator {
    pub fn pulses(&self) -> usize {
        self.pulses.load(Ordering::SeqCst)
    }
}

impl Indicator for CountingIndicator {
    fn pulse(&mut self) {
        self.pulses.fetch_add(1, Ordering::SeqCst);
    }
}
