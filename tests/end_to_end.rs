// Full command path on the host: requests raised on the signal set are picked
// up by the auth task, captured from a scripted gyroscope paced by a simulated
// data-ready line, and answered on the UI channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use gestlock::context::GestureContext;
use gestlock::events::{Command, UiEvent};
use gestlock::gesture::capture::{CaptureConfig, SensorConfig};
use gestlock::gesture::engine::{EngineConfig, GestureEngine};
use gestlock::gesture::similarity::{MatchPolicy, Score};
use gestlock::gesture::template::MemoryStore;
use gestlock::gesture::Sample3;
use gestlock::input::click::ClickTiming;
use gestlock::input::debounce::Edge;
use gestlock::input::{self, Button};
use gestlock::signals::Signals;
use gestlock::sim::{self, ScriptedGyro};
use gestlock::tasks;

const RATE_HZ: u32 = 50;
const WAIT: Duration = Duration::from_secs(5);

struct Rig {
    ctx: Arc<GestureContext<MemoryStore>>,
    gyro: ScriptedGyro,
    events: Receiver<UiEvent>,
    stop: Arc<AtomicBool>,
    clock: JoinHandle<()>,
    auth: JoinHandle<()>,
}

impl Rig {
    fn start(store: MemoryStore, config: EngineConfig) -> Self {
        let capture = CaptureConfig {
            window: Duration::from_millis(600),
            rate_hz: RATE_HZ,
        };
        let ctx = Arc::new(GestureContext::new(GestureEngine::new(store, config), capture));

        let stop = Arc::new(AtomicBool::new(false));
        let clock = sim::spawn_data_ready_clock(Arc::clone(&ctx), RATE_HZ, Arc::clone(&stop));

        let mut gyro = ScriptedGyro::default();
        let sensor = SensorConfig::default();
        tasks::auth::prepare_sensor(&mut gyro, &sensor, ctx.signals(), &|| true).unwrap();
        let script = gyro.clone();

        let (ui_tx, events) = mpsc::channel();
        let auth = {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || tasks::auth::auth_task(ctx, gyro, ui_tx))
        };

        Rig {
            ctx,
            gyro: script,
            events,
            stop,
            clock,
            auth,
        }
    }

    /// Next outcome, skipping "capturing" notices.
    fn outcome(&self) -> UiEvent {
        loop {
            match self.events.recv_timeout(WAIT).expect("no answer from auth task") {
                UiEvent::Capturing(_) => continue,
                event => return event,
            }
        }
    }

    fn run(&self, command: Command, gesture: Vec<Sample3>) -> UiEvent {
        self.gyro.queue(gesture);
        self.ctx.request(command);
        self.outcome()
    }

    fn shutdown(self) {
        self.ctx.halt();
        self.auth.join().unwrap();
        self.stop.store(true, Ordering::Relaxed);
        self.clock.join().unwrap();
    }
}

fn ramp() -> Vec<Sample3> {
    (1..=10)
        .map(|i| {
            let v = i as f32 * 0.1;
            Sample3::new(v, 2.0 * v, -v)
        })
        .collect()
}

fn negated(samples: &[Sample3]) -> Vec<Sample3> {
    samples.iter().map(|s| s.scaled(-1.0)).collect()
}

#[test]
fn enroll_then_unlock_with_same_gesture() {
    let rig = Rig::start(MemoryStore::new(), EngineConfig::default());

    assert_eq!(rig.run(Command::Enroll, ramp()), UiEvent::Enrolled(10));
    match rig.run(Command::Authenticate, ramp()) {
        UiEvent::Unlocked(Score::Correlation(r)) => assert!(r.iter().all(|c| *c > 0.99), "{r:?}"),
        other => panic!("expected unlock, got {other:?}"),
    }
    rig.shutdown();
}

#[test]
fn mirrored_gesture_is_rejected() {
    let rig = Rig::start(MemoryStore::new(), EngineConfig::default());

    assert_eq!(rig.run(Command::Enroll, ramp()), UiEvent::Enrolled(10));
    assert!(matches!(rig.run(Command::Authenticate, negated(&ramp())), UiEvent::Rejected(_)));
    rig.shutdown();
}

#[test]
fn dtw_policy_decides_on_distance() {
    let config = EngineConfig {
        policy: MatchPolicy::dtw(),
        ..EngineConfig::default()
    };
    let rig = Rig::start(MemoryStore::new(), config);

    rig.run(Command::Enroll, ramp());
    let outcome = rig.run(Command::Authenticate, ramp());
    assert!(matches!(outcome, UiEvent::Unlocked(Score::Distance(d)) if d < 1e-3), "{outcome:?}");
    rig.shutdown();
}

#[test]
fn erase_runs_before_unlock_in_the_same_wakeup() {
    let rig = Rig::start(MemoryStore::new(), EngineConfig::default());
    rig.run(Command::Enroll, ramp());

    rig.ctx.signals().set(Signals::ERASE | Signals::UNLOCK);
    assert_eq!(rig.outcome(), UiEvent::Erased);
    assert_eq!(rig.outcome(), UiEvent::NoTemplate);
    assert!(!rig.ctx.engine().has_template());
    rig.shutdown();
}

#[test]
fn unlock_without_template_skips_capture() {
    let rig = Rig::start(MemoryStore::new(), EngineConfig::default());

    rig.ctx.request(Command::Authenticate);
    let first = rig.events.recv_timeout(WAIT).unwrap();
    assert_eq!(first, UiEvent::NoTemplate);
    rig.shutdown();
}

#[test]
fn still_hand_enrolls_nothing() {
    let rig = Rig::start(MemoryStore::new(), EngineConfig::default());

    assert_eq!(rig.run(Command::Enroll, Vec::new()), UiEvent::NoMotion);
    assert!(!rig.ctx.engine().has_template());
    rig.shutdown();
}

#[test]
fn sensor_failure_is_reported_as_fault() {
    let rig = Rig::start(MemoryStore::new(), EngineConfig::default());
    rig.gyro.set_failing(true);

    assert_eq!(rig.run(Command::Enroll, ramp()), UiEvent::Fault);
    rig.shutdown();
}

#[test]
fn template_survives_restart() {
    let store = MemoryStore::new();

    let rig = Rig::start(store.clone(), EngineConfig::default());
    rig.run(Command::Enroll, ramp());
    rig.shutdown();
    assert!(store.blob().is_some());

    let rig = Rig::start(store, EngineConfig::default());
    assert!(rig.ctx.engine().has_template());
    assert!(matches!(rig.run(Command::Authenticate, ramp()), UiEvent::Unlocked(_)));
    rig.shutdown();
}

#[test]
fn double_click_records_and_click_unlocks() {
    let rig = Rig::start(MemoryStore::new(), EngineConfig::default());

    let timing = ClickTiming {
        debounce: Duration::from_millis(5),
        long_press: Duration::from_millis(300),
        double_click: Duration::from_millis(120),
    };
    let level = Arc::new(AtomicBool::new(false));
    let line = {
        let level = Arc::clone(&level);
        move || level.load(Ordering::SeqCst)
    };
    let (button, rx) = input::channel();
    let button_task =
        thread::spawn(move || tasks::button::button_task(Button::new(line, timing), rx));
    tasks::button::bind_commands(&button, &rig.ctx);

    let tap = |hold_ms: u64| {
        level.store(true, Ordering::SeqCst);
        button.raw_edge(Edge::Rise);
        thread::sleep(Duration::from_millis(hold_ms));
        level.store(false, Ordering::SeqCst);
        button.raw_edge(Edge::Fall);
    };

    rig.gyro.queue(ramp());
    tap(20);
    thread::sleep(Duration::from_millis(20));
    tap(20);
    assert_eq!(rig.outcome(), UiEvent::Enrolled(10));

    rig.gyro.queue(ramp());
    tap(20);
    assert!(matches!(rig.outcome(), UiEvent::Unlocked(_)));

    drop(button);
    button_task.join().unwrap();
    rig.shutdown();
}
