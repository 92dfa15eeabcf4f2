// GestLock — Capture / Authentication Task
//
// Waits for RECORD / UNLOCK / ERASE. Requests that arrive in the same wake-up
// run one after another in a fixed order: erase first, then record, then
// unlock, so an "erase + unlock" pair sees the cleared template. Each bit is
// cleared just before the action it triggers.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::context::GestureContext;
use crate::events::{Command, UiEvent};
use crate::gesture::capture::{self, Gyroscope, LevelSource, SensorConfig};
use crate::gesture::engine::EngineError;
use crate::gesture::similarity::SimilarityError;
use crate::gesture::template::TemplateStore;
use crate::gesture::GestureSequence;
use crate::signals::{SignalSet, Signals};

/// Configure the sensor, then catch a data-ready line that was already high.
///
/// Call after the data-ready edge handler is installed.
pub fn prepare_sensor<G: Gyroscope + ?Sized>(
    gyro: &mut G,
    config: &SensorConfig,
    signals: &SignalSet,
    data_ready: &impl LevelSource,
) -> anyhow::Result<()> {
    gyro.initiate(config)?;
    capture::prime_data_ready(signals, data_ready);
    Ok(())
}

pub fn auth_task<S, G>(ctx: Arc<GestureContext<S>>, mut gyro: G, ui_tx: Sender<UiEvent>)
where
    S: TemplateStore,
    G: Gyroscope,
{
    log::info!("Auth task started");

    loop {
        let pending = ctx.signals().wait_any(Signals::COMMANDS | Signals::HALT);
        if pending.contains(Signals::HALT) {
            ctx.signals().clear(Signals::HALT);
            break;
        }

        for command in [Command::Erase, Command::Enroll, Command::Authenticate] {
            if !pending.contains(command.signal()) {
                continue;
            }
            ctx.signals().clear(command.signal());

            let event = run_command(&ctx, &mut gyro, command, &ui_tx);
            log::info!("{:?} -> {:?}", command, event);
            let _ = ui_tx.send(event);
        }
    }

    log::info!("Auth task stopped");
}

/// Execute one command and describe its outcome for the UI.
pub fn run_command<S, G>(
    ctx: &GestureContext<S>,
    gyro: &mut G,
    command: Command,
    ui_tx: &Sender<UiEvent>,
) -> UiEvent
where
    S: TemplateStore,
    G: Gyroscope + ?Sized,
{
    let result = match command {
        Command::Erase => ctx.engine().erase().map(|()| UiEvent::Erased),
        Command::Enroll => {
            let _ = ui_tx.send(UiEvent::Capturing(command));
            capture_for(ctx, gyro).and_then(|seq| ctx.engine().enroll(seq).map(UiEvent::Enrolled))
        }
        Command::Authenticate => {
            // Without a template there is nothing to compare against; do not
            // make the user perform a gesture first.
            if !ctx.engine().has_template() {
                Err(EngineError::NoTemplate)
            } else {
                let _ = ui_tx.send(UiEvent::Capturing(command));
                capture_for(ctx, gyro).and_then(|seq| ctx.engine().authenticate(seq)).map(|d| {
                    if d.accepted {
                        UiEvent::Unlocked(d.score)
                    } else {
                        UiEvent::Rejected(d.score)
                    }
                })
            }
        }
    };

    result.unwrap_or_else(|e| {
        match &e {
            EngineError::Sensor(_) | EngineError::Storage(_) => {
                log::error!("{:?} failed: {}", command, e)
            }
            _ => log::warn!("{:?} failed: {}", command, e),
        }
        ui_event_for(&e)
    })
}

fn capture_for<S, G>(ctx: &GestureContext<S>, gyro: &mut G) -> Result<GestureSequence, EngineError>
where
    G: Gyroscope + ?Sized,
{
    capture::capture_window(gyro, ctx.signals(), ctx.capture_config()).map_err(EngineError::Sensor)
}

fn ui_event_for(e: &EngineError) -> UiEvent {
    match e {
        EngineError::NoTemplate => UiEvent::NoTemplate,
        EngineError::EmptyGesture | EngineError::Similarity(SimilarityError::EmptySeries) => {
            UiEvent::NoMotion
        }
        EngineError::Similarity(SimilarityError::LengthMismatch { .. })
        | EngineError::Sensor(_)
        | EngineError::Storage(_) => UiEvent::Fault,
    }
}
