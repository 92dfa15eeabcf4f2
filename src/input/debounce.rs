// GestLock — Edge Debouncer
//
// Turns a bouncing raw line into confirmed rise / fall events. A raw edge arms
// a per-direction deadline; when it expires the line is re-read and the edge
// is confirmed only if the level still agrees. Further raw edges of the same
// direction while the deadline is pending are absorbed by it.
//
// Timers are plain deadlines owned by this struct. Whoever drives it (the
// button task) sleeps until `next_deadline()` and calls `poll()`, so a
// cancelled timer can never fire later against reset state.

use std::time::{Duration, Instant};

/// Logical transition direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rise,
    Fall,
}

impl Edge {
    /// Direction that ends at the given level.
    pub fn towards(high: bool) -> Self {
        if high {
            Edge::Rise
        } else {
            Edge::Fall
        }
    }

    fn settled(self, high: bool) -> bool {
        match self {
            Edge::Rise => high,
            Edge::Fall => !high,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct EdgeWatch {
    listening: bool,
    pending: Option<Instant>,
}

impl EdgeWatch {
    const fn new() -> Self {
        Self {
            listening: true,
            pending: None,
        }
    }

    fn due(&self, now: Instant) -> Option<Instant> {
        self.pending.filter(|&deadline| deadline <= now)
    }
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    rise: EdgeWatch,
    fall: EdgeWatch,
}

impl Debouncer {
    /// Both directions start enabled.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            rise: EdgeWatch::new(),
            fall: EdgeWatch::new(),
        }
    }

    /// Enable or disable one direction. Disabling also drops its pending
    /// deadline, leaving nothing to fire later.
    pub fn listen(&mut self, edge: Edge, enabled: bool) {
        let watch = self.watch_mut(edge);
        watch.listening = enabled;
        if !enabled {
            watch.pending = None;
        }
    }

    pub fn is_listening(&self, edge: Edge) -> bool {
        self.watch(edge).listening
    }

    pub fn is_pending(&self, edge: Edge) -> bool {
        self.watch(edge).pending.is_some()
    }

    /// Feed a raw edge seen at `at`. Returns true when it armed a new deadline.
    pub fn raw_edge(&mut self, edge: Edge, at: Instant) -> bool {
        let window = self.window;
        let watch = self.watch_mut(edge);
        if !watch.listening || watch.pending.is_some() {
            return false;
        }
        watch.pending = Some(at + window);
        true
    }

    /// Earliest pending deadline of either direction.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.rise.pending, self.fall.pending) {
            (Some(r), Some(f)) => Some(r.min(f)),
            (r, f) => r.or(f),
        }
    }

    /// Expire due deadlines in order and return the first confirmed edge.
    ///
    /// `high` is the line level re-read now. A bounce that fails the check is
    /// dropped silently; call again until `None` to drain both directions.
    pub fn poll(&mut self, now: Instant, high: bool) -> Option<Edge> {
        loop {
            let edge = match (self.rise.due(now), self.fall.due(now)) {
                (Some(r), Some(f)) if f < r => Edge::Fall,
                (Some(_), _) => Edge::Rise,
                (None, Some(_)) => Edge::Fall,
                (None, None) => return None,
            };
            self.watch_mut(edge).pending = None;
            if edge.settled(high) {
                return Some(edge);
            }
            log::trace!("Dropped bounced {:?}", edge);
        }
    }

    fn watch(&self, edge: Edge) -> &EdgeWatch {
        match edge {
            Edge::Rise => &self.rise,
            Edge::Fall => &self.fall,
        }
    }

    fn watch_mut(&mut self, edge: Edge) -> &mut EdgeWatch {
        match edge {
            Edge::Rise => &mut self.rise,
            Edge::Fall => &mut self.fall,
        }
    }
}
