// GestLock — Shared Signal Set
//
// Producers (edge watchers, the button actor, the UI trigger task) raise
// condition bits; the capture/authentication task waits on them. Raising a
// bit is an idempotent OR. Only the consumer that acted on a bit clears it.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use bitflags::bitflags;

bitflags! {
    /// Pending conditions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Signals: u32 {
        /// Touch panel is held down (UI trigger edge tracking).
        const PRESS = 1 << 0;
        /// Capture a gesture and enroll it.
        const RECORD = 1 << 1;
        /// Capture a gesture and authenticate it.
        const UNLOCK = 1 << 2;
        /// Forget the enrolled template.
        const ERASE = 1 << 3;
        /// The gyroscope has a fresh sample.
        const DATA_READY = 1 << 4;
        /// Stop the worker loops (host runs and tests).
        const HALT = 1 << 5;

        /// Requests the capture/authentication task reacts to.
        const COMMANDS = Self::RECORD.bits() | Self::UNLOCK.bits() | Self::ERASE.bits();
    }
}

/// Bit-set with blocking wait-for-any, in the spirit of an RTOS event group.
#[derive(Debug, Default)]
pub struct SignalSet {
    bits: Mutex<Signals>,
    changed: Condvar,
}

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise `signals` and wake every waiter.
    pub fn set(&self, signals: Signals) {
        let mut bits = self.lock();
        *bits |= signals;
        self.changed.notify_all();
    }

    /// Drop `signals`.
    pub fn clear(&self, signals: Signals) {
        self.lock().remove(signals);
    }

    /// Snapshot of every raised bit.
    pub fn get(&self) -> Signals {
        *self.lock()
    }

    /// Block until any bit of `mask` is raised; returns the raised subset of
    /// `mask` without clearing it.
    pub fn wait_any(&self, mask: Signals) -> Signals {
        let mut bits = self.lock();
        while !bits.intersects(mask) {
            bits = self.changed.wait(bits).unwrap_or_else(|e| e.into_inner());
        }
        *bits & mask
    }

    /// Like [`wait_any`](Self::wait_any) but gives up after `timeout`.
    pub fn wait_any_timeout(&self, mask: Signals, timeout: Duration) -> Option<Signals> {
        let deadline = Instant::now() + timeout;
        let mut bits = self.lock();
        while !bits.intersects(mask) {
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            bits = self
                .changed
                .wait_timeout(bits, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
        Some(*bits & mask)
    }

    /// Block until any bit of `mask` is raised, then clear that subset.
    pub fn take_any(&self, mask: Signals) -> Signals {
        let mut bits = self.lock();
        while !bits.intersects(mask) {
            bits = self.changed.wait(bits).unwrap_or_else(|e| e.into_inner());
        }
        let taken = *bits & mask;
        bits.remove(taken);
        taken
    }

    fn lock(&self) -> MutexGuard<'_, Signals> {
        // Flags stay consistent even if a holder panicked.
        self.bits.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AsRef<SignalSet> for SignalSet {
    fn as_ref(&self) -> &SignalSet {
        self
    }
}
