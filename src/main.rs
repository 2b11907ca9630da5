use std::io::BufRead;
use std::path::Path;
use std::thread;

use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Deserialize;

use gesture_pilot::{
    Command, EngineConfig, EngineContext, FrameInput, HandLandmarkSet, LogActuator,
    OperationMode, PointerActuator,
};

const CONFIG_PATH: &str = "config.json";
const CALIBRATION_PATH: &str = "calibration.json";

/// One landmark frame on the wire: newline-delimited JSON on stdin, one
/// object per camera frame.
#[derive(Deserialize)]
struct WireFrame {
    hands: Vec<Vec<[f32; 3]>>,
    width: u32,
    height: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EngineConfig::load_or_default(Path::new(CONFIG_PATH));
    log::info!(
        "expected provider settings: max {} hands, detection confidence {:.2}, \
         tracking confidence {:.2}",
        config.detection.max_hands,
        config.detection.min_detection_confidence,
        config.detection.min_tracking_confidence
    );
    let mode = match std::env::args().nth(1).as_deref() {
        Some("projected") => OperationMode::Projected,
        _ => OperationMode::Direct,
    };

    let (command_tx, command_rx) = unbounded();
    let (frame_tx, frame_rx) = unbounded();
    thread::spawn(move || read_stdin(frame_tx, command_tx));

    let mut engine = EngineContext::new(config, mode, build_actuator(), command_rx);
    if mode == OperationMode::Projected {
        engine.load_persisted_transform(Path::new(CALIBRATION_PATH));
    }

    run(&mut engine, frame_rx);
    log::info!("engine stopped");
    Ok(())
}

fn run(engine: &mut EngineContext, frames: Receiver<FrameInput>) {
    for frame in frames {
        let outcome = engine.step(&frame);
        if let Some(transform) = outcome.published {
            match transform.save(Path::new(CALIBRATION_PATH)) {
                Ok(()) => log::info!("calibration saved to {CALIBRATION_PATH}"),
                Err(err) => log::error!("could not save calibration: {err}"),
            }
        }
        if !engine.is_running() {
            break;
        }
    }
}

#[cfg(feature = "actuator-enigo")]
fn build_actuator() -> Box<dyn PointerActuator> {
    match gesture_pilot::EnigoActuator::new() {
        Ok(actuator) => Box::new(actuator),
        Err(err) => {
            log::warn!("pointer backend unavailable ({err}); actions will only be logged");
            Box::new(LogActuator::new(1920, 1080))
        }
    }
}

#[cfg(not(feature = "actuator-enigo"))]
fn build_actuator() -> Box<dyn PointerActuator> {
    Box::new(LogActuator::new(1920, 1080))
}

/// Feeds the control loop from stdin. JSON lines become frames; single
/// characters become commands (v overlay, m mode, c calibrate, u undo,
/// r reset, q quit).
fn read_stdin(frames: Sender<FrameInput>, commands: Sender<Command>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::error!("stdin read failed: {err}");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('{') {
            match serde_json::from_str::<WireFrame>(trimmed) {
                Ok(wire) => {
                    if frames.send(decode_frame(wire)).is_err() {
                        break;
                    }
                }
                Err(err) => log::warn!("dropping malformed frame: {err}"),
            }
            continue;
        }

        let command = match trimmed {
            "v" => Command::ToggleOverlay,
            "m" => Command::SwitchMode,
            "c" => Command::StartCalibration,
            "u" => Command::UndoCalibrationPoint,
            "r" => Command::ResetCalibration,
            "q" => Command::Quit,
            other => {
                log::warn!("unknown command {other:?}");
                continue;
            }
        };
        let quit = command == Command::Quit;
        if commands.send(command).is_err() {
            break;
        }
        if quit {
            // Push one empty frame through so the loop observes the quit.
            let _ = frames.send(FrameInput::empty(640, 480));
            break;
        }
    }
}

fn decode_frame(wire: WireFrame) -> FrameInput {
    let hands = wire
        .hands
        .iter()
        .filter_map(|points| {
            let hand = HandLandmarkSet::from_points(points);
            if hand.is_none() {
                log::warn!("dropping hand with {} landmarks", points.len());
            }
            hand
        })
        .collect();
    FrameInput::new(hands, wire.width, wire.height)
}
