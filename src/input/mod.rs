// GestLock — Button Input Manager
//
// Debounced button with single-click, double-click and long-press handlers.
// All per-button state lives in one `Button`, owned by one task (see
// `tasks::button`). Interrupt-side code never touches it directly: it posts
// timestamped raw edges through a `ButtonHandle`, which is a plain queue
// sender and therefore cheap and non-blocking.

pub mod click;
pub mod debounce;

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use crate::events::ButtonEvent;
use crate::gesture::capture::LevelSource;

use self::click::{ClickClassifier, ClickTiming};
use self::debounce::{Debouncer, Edge};

/// Zero-argument callback run on the button task.
pub type Handler = Box<dyn FnMut() + Send>;

/// Messages understood by the button task.
pub enum ButtonMsg {
    /// Raw edge observed by the interrupt side at the given instant.
    RawEdge(Edge, Instant),
    /// Replace (or with `None`, drop) the handler for one event.
    Register(ButtonEvent, Option<Handler>),
    /// Enable or disable debouncing of one raw direction.
    Listen(Edge, bool),
}

/// Producer side of a button task queue.
#[derive(Clone)]
pub struct ButtonHandle {
    tx: Sender<ButtonMsg>,
}

impl ButtonHandle {
    /// Post a raw edge. Never blocks; a stopped task just drops it.
    pub fn raw_edge(&self, edge: Edge) {
        let _ = self.tx.send(ButtonMsg::RawEdge(edge, Instant::now()));
    }

    pub fn on_click(&self, handler: impl FnMut() + Send + 'static) {
        self.register(ButtonEvent::Click, Some(Box::new(handler)));
    }

    pub fn on_double_click(&self, handler: impl FnMut() + Send + 'static) {
        self.register(ButtonEvent::DoubleClick, Some(Box::new(handler)));
    }

    pub fn on_long_click(&self, handler: impl FnMut() + Send + 'static) {
        self.register(ButtonEvent::LongPress, Some(Box::new(handler)));
    }

    pub fn register(&self, event: ButtonEvent, handler: Option<Handler>) {
        let _ = self.tx.send(ButtonMsg::Register(event, handler));
    }

    pub fn listen(&self, edge: Edge, enabled: bool) {
        let _ = self.tx.send(ButtonMsg::Listen(edge, enabled));
    }
}

/// Create a button queue: the handle for producers and the receiver for the
/// button task.
pub fn channel() -> (ButtonHandle, Receiver<ButtonMsg>) {
    let (tx, rx) = mpsc::channel();
    (ButtonHandle { tx }, rx)
}

#[derive(Default)]
struct Handlers {
    click: Option<Handler>,
    double_click: Option<Handler>,
    long_click: Option<Handler>,
}

impl Handlers {
    fn slot(&mut self, event: ButtonEvent) -> &mut Option<Handler> {
        match event {
            ButtonEvent::Click => &mut self.click,
            ButtonEvent::DoubleClick => &mut self.double_click,
            ButtonEvent::LongPress => &mut self.long_click,
        }
    }
}

/// Debouncer + classifier + handlers for one physical button.
pub struct Button<L> {
    line: L,
    debouncer: Debouncer,
    classifier: ClickClassifier,
    handlers: Handlers,
}

impl<L: LevelSource> Button<L> {
    /// `line` re-reads the pin level when a debounce window closes.
    pub fn new(line: L, timing: ClickTiming) -> Self {
        Self {
            line,
            debouncer: Debouncer::new(timing.debounce),
            classifier: ClickClassifier::new(timing),
            handlers: Handlers::default(),
        }
    }

    pub fn classifier(&self) -> &ClickClassifier {
        &self.classifier
    }

    /// Apply one queued message.
    pub fn handle(&mut self, msg: ButtonMsg) {
        match msg {
            ButtonMsg::RawEdge(edge, at) => {
                self.debouncer.raw_edge(edge, at);
            }
            ButtonMsg::Register(event, handler) => {
                *self.handlers.slot(event) = handler;
            }
            ButtonMsg::Listen(edge, enabled) => self.debouncer.listen(edge, enabled),
        }
    }

    /// Earliest debounce or double-click deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debouncer.next_deadline(), self.classifier.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run every timer due at `now` and dispatch resulting events. Returns the
    /// events emitted, in order.
    pub fn service(&mut self, now: Instant) -> Vec<ButtonEvent> {
        let mut emitted = Vec::new();

        // Press and release are both timed at confirmation, one debounce
        // window after the raw edge, so hold durations are unaffected.
        let high = self.line.is_high();
        while let Some(edge) = self.debouncer.poll(now, high) {
            match edge {
                Edge::Rise => self.classifier.press(now),
                Edge::Fall => emitted.extend(self.classifier.release(now)),
            }
        }
        emitted.extend(self.classifier.poll(now));

        for &event in &emitted {
            log::debug!("Button {:?}", event);
            match self.handlers.slot(event) {
                Some(handler) => handler(),
                None => log::trace!("No handler for {:?}", event),
            }
        }
        emitted
    }
}
