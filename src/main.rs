// GestLock — Firmware Entry Point
//
// Board boot sequence:
//   1. Bring up logging, the shared I2C bus and the OLED.
//   2. Open the NVS template store and restore any enrolled gesture.
//   3. Start the button actor and its edge watcher, bind click / double-click
//      / long-press to unlock / record / erase.
//   4. Start the data-ready watcher, then configure the gyroscope.
//   5. Spawn the capture/authentication task and the UI task.
//
// On a development host the same tasks run against simulated peripherals and
// a short scripted session is played through them.

#[cfg(target_os = "espidf")]
mod drivers;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::sync::{mpsc, Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::gpio::{OutputPin, PinDriver, Pull};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use gestlock::config::*;
    use gestlock::context::GestureContext;
    use gestlock::gesture::capture::{CaptureConfig, SensorConfig};
    use gestlock::gesture::engine::{EngineConfig, GestureEngine};
    use gestlock::input::click::ClickTiming;
    use gestlock::input::{self, Button};
    use gestlock::signals::Signals;
    use gestlock::tasks;
    use gestlock::ui::screen::ScreenState;
    use gestlock::ui::touch::NoTouch;

    use crate::drivers::display::OledDisplay;
    use crate::drivers::edge;
    use crate::drivers::haptic::IndicatorDriver;
    use crate::drivers::imu::{Mpu6050, SharedBus};
    use crate::drivers::storage::NvsStore;

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("GestLock firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ---- I2C bus (shared between OLED and MPU6050) ------------------------
    let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA
        peripherals.pins.gpio7, // SCL
        &i2c_config,
    )?;
    // Firmware never exits, so the bus lives for the rest of the program.
    let i2c_bus: SharedBus = Box::leak(Box::new(Mutex::new(i2c)));

    let mut display = OledDisplay::new(i2c_bus);
    display.init()?;

    let mut gyro = Mpu6050::new(i2c_bus);
    if !display.is_connected() || !gyro.is_connected() {
        log::error!(
            "Boot check FAILED — OLED:{} IMU:{}",
            display.is_connected(),
            gyro.is_connected()
        );
        // Continue anyway so we can still debug via serial.
    }

    // ---- Engine & shared context ------------------------------------------
    let engine = GestureEngine::new(NvsStore::new(nvs)?, EngineConfig::default());
    let enrolled = engine.has_template();
    let ctx = Arc::new(GestureContext::new(engine, CaptureConfig::default()));

    // ---- Button: actor + edge watcher -------------------------------------
    let mut button_pin = PinDriver::input(peripherals.pins.gpio3)?;
    button_pin.set_pull(Pull::Down)?;
    debug_assert_eq!(button_pin.pin(), PIN_BUTTON);
    // SAFETY: reading a configured input level has no side effects.
    let button_level = || unsafe { esp_idf_sys::gpio_get_level(PIN_BUTTON) != 0 };

    let (button, button_rx) = input::channel();
    thread::Builder::new()
        .name("button".into())
        .stack_size(STACK_BUTTON)
        .spawn(move || {
            let button = Button::new(button_level, ClickTiming::default());
            tasks::button::button_task(button, button_rx);
        })?;
    tasks::button::bind_commands(&button, &ctx);

    thread::Builder::new()
        .name("button-edge".into())
        .stack_size(STACK_EDGE)
        .spawn(move || edge::watch_edges(button_pin, |e| button.raw_edge(e)))?;

    // ---- Gyroscope: data-ready watcher, then sensor set-up ----------------
    let mut gyro_int = PinDriver::input(peripherals.pins.gpio5)?;
    gyro_int.set_pull(Pull::Down)?;
    debug_assert_eq!(gyro_int.pin(), PIN_GYRO_INT);
    let dr_ctx = Arc::clone(&ctx);
    thread::Builder::new()
        .name("gyro-int".into())
        .stack_size(STACK_EDGE)
        .spawn(move || edge::watch_rising(gyro_int, || dr_ctx.signals().set(Signals::DATA_READY)))?;
    // Let the watcher arm its interrupt before the sensor starts asserting it.
    thread::sleep(Duration::from_millis(10));

    // SAFETY: as above.
    let int_level = || unsafe { esp_idf_sys::gpio_get_level(PIN_GYRO_INT) != 0 };
    tasks::auth::prepare_sensor(&mut gyro, &SensorConfig::default(), ctx.signals(), &int_level)?;

    // ---- Workers ----------------------------------------------------------
    let (ui_tx, ui_rx) = mpsc::channel();

    let auth_ctx = Arc::clone(&ctx);
    thread::Builder::new()
        .name("auth".into())
        .stack_size(STACK_AUTH)
        .spawn(move || tasks::auth::auth_task(auth_ctx, gyro, ui_tx))?;

    let indicator_pin = PinDriver::output(peripherals.pins.gpio4.downgrade_output())?;
    debug_assert_eq!(indicator_pin.pin(), PIN_INDICATOR);
    let indicator = IndicatorDriver::new(indicator_pin);
    let ui_ctx = Arc::clone(&ctx);
    thread::Builder::new()
        .name("ui".into())
        .stack_size(STACK_UI)
        .spawn(move || {
            let state = ScreenState {
                enrolled,
                ..ScreenState::default()
            };
            tasks::ui::ui_task(
                display,
                NoTouch,
                indicator,
                ui_ctx.signals(),
                ui_rx,
                state,
                Duration::from_millis(UI_POLL_INTERVAL_MS),
            );
        })?;

    log::info!("Boot complete, waiting for gestures");

    // The spawned tasks own everything now.
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}

// ---------------------------------------------------------------------------
// Host simulation
// ---------------------------------------------------------------------------
#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    use anyhow::Context;

    use gestlock::context::GestureContext;
    use gestlock::events::{Command, UiEvent};
    use gestlock::gesture::capture::{CaptureConfig, SensorConfig};
    use gestlock::gesture::engine::{EngineConfig, GestureEngine};
    use gestlock::gesture::template::MemoryStore;
    use gestlock::gesture::Sample3;
    use gestlock::sim::{self, ScriptedGyro};
    use gestlock::tasks;
    use gestlock::ui::screen::ScreenState;

    env_logger::builder().filter_level(log::LevelFilter::Info).init();

    let capture = CaptureConfig {
        window: Duration::from_millis(1500),
        rate_hz: 40,
    };
    let ctx = Arc::new(GestureContext::new(
        GestureEngine::new(MemoryStore::new(), EngineConfig::default()),
        capture,
    ));

    let stop = Arc::new(AtomicBool::new(false));
    let clock = sim::spawn_data_ready_clock(Arc::clone(&ctx), capture.rate_hz, Arc::clone(&stop));

    let mut gyro = ScriptedGyro::default();
    tasks::auth::prepare_sensor(&mut gyro, &SensorConfig::default(), ctx.signals(), &|| false)?;
    let script = gyro.clone();

    let (ui_tx, ui_rx) = mpsc::channel();
    let auth = {
        let ctx = Arc::clone(&ctx);
        thread::spawn(move || tasks::auth::auth_task(ctx, gyro, ui_tx))
    };

    // Figure-of-eight wrist twist.
    let twist: Vec<Sample3> = (0..24)
        .map(|i| {
            let t = i as f32 / 24.0 * std::f32::consts::TAU;
            Sample3::new(t.sin(), (2.0 * t).sin(), 0.5 * t.cos())
        })
        .collect();
    let mirrored: Vec<Sample3> = twist.iter().map(|s| s.scaled(-1.0)).collect();

    let steps = [
        (Command::Enroll, twist.clone()),
        (Command::Authenticate, twist),
        (Command::Authenticate, mirrored),
        (Command::Erase, Vec::new()),
        (Command::Authenticate, Vec::new()),
    ];

    let mut screen = ScreenState::default();
    for (command, gesture) in steps {
        script.queue(gesture);
        ctx.request(command);
        loop {
            let event = ui_rx
                .recv_timeout(Duration::from_secs(10))
                .context("auth task went quiet")?;
            screen.apply(&event);
            println!("{:<14} {:<16} {}", command.label(), screen.status, screen.detail);
            if !matches!(event, UiEvent::Capturing(_)) {
                break;
            }
        }
    }

    ctx.halt();
    stop.store(true, Ordering::Relaxed);
    let _ = auth.join();
    let _ = clock.join();
    Ok(())
}
