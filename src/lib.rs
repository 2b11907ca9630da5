//! Gesture-driven pointer control: per-frame hand landmarks in, OS pointer
//! actions out, with a four-corner projection calibration in between.

pub mod actuator;
pub mod calibration;
pub mod classifier;
pub mod config;
pub mod confirm;
pub mod engine;
pub mod homography;
pub mod smoothing;
pub mod types;
pub mod zoom;

#[cfg(test)]
pub(crate) mod testutil;

pub use actuator::{ActuationError, LogActuator, PointerActuator};
pub use config::EngineConfig;
pub use engine::{EngineContext, FrameOutcome};
pub use homography::PerspectiveTransform;
pub use types::{
    Command, ConfirmOption, EngineState, FrameInput, GestureKind, GestureVerdict,
    HandLandmarkSet, OperationMode, OverlaySnapshot, PixelPoint,
};

#[cfg(feature = "actuator-enigo")]
pub use actuator::EnigoActuator;
