// GestLock — Button Task
//
// Owns one `Button` and is its only mutator. Sleeps on the queue until either
// a message arrives or the earliest debounce / double-click deadline passes,
// then services timers. Returns when every `ButtonHandle` is dropped.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Instant;

use crate::context::GestureContext;
use crate::events::{ButtonEvent, Command};
use crate::gesture::capture::LevelSource;
use crate::input::{Button, ButtonHandle, ButtonMsg};

pub fn button_task<L: LevelSource>(mut button: Button<L>, rx: Receiver<ButtonMsg>) {
    log::info!("Button task started");

    loop {
        let msg = match button.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                match rx.recv_timeout(wait) {
                    Ok(msg) => Some(msg),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(msg) => Some(msg),
                Err(_) => break,
            },
        };

        if let Some(msg) = msg {
            button.handle(msg);
        }
        button.service(Instant::now());
    }

    log::info!("Button queue closed, exiting button task");
}

/// Route click / double-click / long-press to unlock / record / erase.
pub fn bind_commands<S: Send + 'static>(handle: &ButtonHandle, ctx: &Arc<GestureContext<S>>) {
    for event in [ButtonEvent::Click, ButtonEvent::DoubleClick, ButtonEvent::LongPress] {
        let ctx = Arc::clone(ctx);
        let command = Command::for_button(event);
        handle.register(event, Some(Box::new(move || ctx.request(command))));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::engine::{EngineConfig, GestureEngine};
    use crate::gesture::template::MemoryStore;
    use crate::input::click::ClickTiming;
    use crate::input::debounce::Edge;
    use crate::input::{self, ButtonHandle};
    use crate::signals::Signals;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn fast_timing() -> ClickTiming {
        ClickTiming {
            debounce: Duration::from_millis(5),
            long_press: Duration::from_millis(150),
            double_click: Duration::from_millis(60),
        }
    }

    /// Raise the line, post the edge, hold, drop it, post the edge.
    fn press(handle: &ButtonHandle, level: &AtomicBool, hold: Duration) {
        level.store(true, Ordering::SeqCst);
        handle.raw_edge(Edge::Rise);
        thread::sleep(hold);
        level.store(false, Ordering::SeqCst);
        handle.raw_edge(Edge::Fall);
    }

    #[test]
    fn task_turns_presses_into_commands() {
        let ctx = Arc::new(GestureContext::new(
            GestureEngine::new(MemoryStore::new(), EngineConfig::default()),
            Default::default(),
        ));
        let level = Arc::new(AtomicBool::new(false));
        let line = {
            let level = Arc::clone(&level);
            move || level.load(Ordering::SeqCst)
        };

        let (handle, rx) = input::channel();
        let task = thread::spawn(move || button_task(Button::new(line, fast_timing()), rx));
        bind_commands(&handle, &ctx);

        press(&handle, &level, Duration::from_millis(30));
        let got = ctx.signals().wait_any_timeout(Signals::COMMANDS, Duration::from_secs(2));
        assert_eq!(got, Some(Signals::UNLOCK));
        ctx.signals().clear(Signals::COMMANDS);

        press(&handle, &level, Duration::from_millis(300));
        let got = ctx.signals().wait_any_timeout(Signals::COMMANDS, Duration::from_secs(2));
        assert_eq!(got, Some(Signals::ERASE));

        drop(handle);
        task.join().unwrap();
    }

    fn count_into(n: &Arc<AtomicUsize>) -> impl FnMut() + Send + 'static {
        let n = Arc::clone(n);
        move || {
            n.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn wait_for(n: &AtomicUsize, want: usize) {
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while n.load(Ordering::SeqCst) < want && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn handle_registrations_reach_the_task() {
        let level = Arc::new(AtomicBool::new(false));
        let line = {
            let level = Arc::clone(&level);
            move || level.load(Ordering::SeqCst)
        };
        let (handle, rx) = input::channel();
        let task = thread::spawn(move || button_task(Button::new(line, fast_timing()), rx));

        let stale = Arc::new(AtomicUsize::new(0));
        let clicks = Arc::new(AtomicUsize::new(0));
        let doubles = Arc::new(AtomicUsize::new(0));
        let longs = Arc::new(AtomicUsize::new(0));
        handle.on_click(count_into(&stale));
        handle.on_click(count_into(&clicks));
        handle.on_double_click(count_into(&doubles));
        handle.on_long_click(count_into(&longs));

        press(&handle, &level, Duration::from_millis(30));
        wait_for(&clicks, 1);

        press(&handle, &level, Duration::from_millis(20));
        thread::sleep(Duration::from_millis(15));
        press(&handle, &level, Duration::from_millis(20));
        wait_for(&doubles, 1);

        press(&handle, &level, Duration::from_millis(300));
        wait_for(&longs, 1);

        assert_eq!(stale.load(Ordering::SeqCst), 0);
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
        assert_eq!(doubles.load(Ordering::SeqCst), 1);
        assert_eq!(longs.load(Ordering::SeqCst), 1);

        drop(handle);
        task.join().unwrap();
    }
}
