// GestLock — GPIO Edge Watchers
//
// Each watcher parks a thread on a GPIO interrupt and forwards every edge to
// a callback that only touches the button queue or the signal set. Nothing
// here decides what an edge means.

use esp_idf_hal::gpio::{Input, InputPin, PinDriver};
use esp_idf_hal::task::block_on;

use gestlock::input::debounce::Edge;

/// Report both edges of `pin`, tagged with the level seen after the edge.
pub fn watch_edges<T: InputPin>(mut pin: PinDriver<'_, T, Input>, mut on_edge: impl FnMut(Edge)) {
    loop {
        if let Err(e) = block_on(pin.wait_for_any_edge()) {
            log::error!("GPIO{} edge wait failed: {:?}", pin.pin(), e);
            return;
        }
        on_edge(Edge::towards(pin.is_high()));
    }
}

/// Report rising edges of `pin`.
pub fn watch_rising<T: InputPin>(mut pin: PinDriver<'_, T, Input>, mut on_rise: impl FnMut()) {
    loop {
        if let Err(e) = block_on(pin.wait_for_rising_edge()) {
            log::error!("GPIO{} edge wait failed: {:?}", pin.pin(), e);
            return;
        }
        on_rise();
    }
}
