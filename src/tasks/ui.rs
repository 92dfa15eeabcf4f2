// GestLock — UI Task
//
// Owns the display, the touch panel and the indicator. Polls the touch panel
// at UI_POLL_INTERVAL_MS: touch-down raises PRESS, lift-off over a button
// raises that button's command. Also drains outcome events from the auth task
// and redraws when something changed. Returns when the auth task hangs up.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::events::UiEvent;
use crate::signals::{SignalSet, Signals};
use crate::ui::screen::{self, ScreenState};
use crate::ui::touch::{TouchPanel, TouchPoint};
use crate::ui::{Indicator, Panel};

pub fn ui_task<P, T, I>(
    mut panel: P,
    mut touch: T,
    mut indicator: I,
    signals: &SignalSet,
    ui_rx: Receiver<UiEvent>,
    mut state: ScreenState,
    poll_interval: Duration,
) -> ScreenState
where
    P: Panel,
    T: TouchPanel,
    I: Indicator,
{
    log::info!("UI task started");

    let mut touch_origin: Option<TouchPoint> = None;
    let mut dirty = true;

    loop {
        // 1. Poll the touch panel.
        match touch.read() {
            Ok(Some(point)) => {
                if touch_origin.is_none() {
                    touch_origin = Some(point);
                    signals.set(Signals::PRESS);
                }
            }
            Ok(None) => {
                if let Some(origin) = touch_origin.take() {
                    signals.clear(Signals::PRESS);
                    if let Some(command) = screen::hit_test(origin) {
                        log::debug!("Touch {:?} -> {:?}", origin, command);
                        indicator.pulse();
                        signals.set(command.signal());
                    }
                }
            }
            Err(e) => log::warn!("Touch read error: {:#}", e),
        }

        // 2. Drain all pending UI events (non-blocking).
        loop {
            match ui_rx.try_recv() {
                Ok(event) => {
                    if !matches!(event, UiEvent::Capturing(_)) {
                        indicator.pulse();
                    }
                    state.apply(&event);
                    dirty = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::info!("UI channel closed, exiting UI task");
                    return state;
                }
            }
        }

        // 3. Redraw.
        if dirty {
            if screen::render(&mut panel, &state).is_err() {
                log::error!("Display draw failed");
            } else if let Err(e) = panel.flush() {
                log::error!("Display error: {:#}", e);
            }
            dirty = false;
        }

        thread::sleep(poll_interval);
    }
}
