// GestLock — Shared Task Context
//
// One `GestureContext` is created at boot and shared (`Arc`) between the
// tasks. The signal set is the only thing producers touch; the engine (and the
// template inside it) is mutated by the capture/authentication task alone and
// sits behind a mutex so no reader ever sees a half-committed enrollment.

use std::sync::{Mutex, MutexGuard};

use crate::events::Command;
use crate::gesture::capture::CaptureConfig;
use crate::gesture::engine::GestureEngine;
use crate::signals::{SignalSet, Signals};

pub struct GestureContext<S> {
    signals: SignalSet,
    engine: Mutex<GestureEngine<S>>,
    capture: CaptureConfig,
}

impl<S> GestureContext<S> {
    pub fn new(engine: GestureEngine<S>, capture: CaptureConfig) -> Self {
        Self {
            signals: SignalSet::new(),
            engine: Mutex::new(engine),
            capture,
        }
    }

    pub fn signals(&self) -> &SignalSet {
        &self.signals
    }

    pub fn capture_config(&self) -> &CaptureConfig {
        &self.capture
    }

    pub fn engine(&self) -> MutexGuard<'_, GestureEngine<S>> {
        // The engine swaps its template in a single assignment, so a panic
        // elsewhere cannot leave it half-written.
        self.engine.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a command for the capture/authentication task.
    pub fn request(&self, command: Command) {
        log::debug!("Requested {:?}", command);
        self.signals.set(command.signal());
    }

    pub fn begin_enrollment(&self) {
        self.request(Command::Enroll);
    }

    pub fn begin_authentication(&self) {
        self.request(Command::Authenticate);
    }

    pub fn erase_template(&self) {
        self.request(Command::Erase);
    }

    /// Ask the capture/authentication task to return.
    pub fn halt(&self) {
        self.signals.set(Signals::HALT);
    }
}

impl<S> AsRef<SignalSet> for GestureContext<S> {
    fn as_ref(&self) -> &SignalSet {
        &self.signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::engine::EngineConfig;
    use crate::gesture::template::MemoryStore;

    fn context() -> GestureContext<MemoryStore> {
        GestureContext::new(
            GestureEngine::new(MemoryStore::new(), EngineConfig::default()),
            CaptureConfig::default(),
        )
    }

    #[test]
    fn entry_points_raise_their_command_bits() {
        let ctx = context();

        ctx.begin_enrollment();
        assert_eq!(ctx.signals().get(), Signals::RECORD);

        ctx.begin_authentication();
        assert_eq!(ctx.signals().get(), Signals::RECORD | Signals::UNLOCK);

        ctx.erase_template();
        assert_eq!(ctx.signals().get(), Signals::COMMANDS);

        // Raising again changes nothing.
        ctx.begin_enrollment();
        assert_eq!(ctx.signals().get(), Signals::COMMANDS);

        ctx.halt();
        assert!(ctx.signals().get().contains(Signals::HALT));
    }

    #[test]
    fn context_exposes_its_signal_set() {
        let ctx = context();
        ctx.request(Command::Erase);
        assert_eq!(AsRef::<SignalSet>::as_ref(&ctx).get(), Signals::ERASE);
    }
}
