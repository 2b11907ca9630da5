use thiserror::Error;

use crate::types::PixelPoint;

#[derive(Debug, Error)]
pub enum ActuationError {
    /// The target sits inside the reserved fail-safe boundary; the action
    /// engine skips the call and logs instead of executing it.
    #[error("target ({x}, {y}) is inside the fail-safe boundary")]
    BoundaryRejected { x: i32, y: i32 },
    #[error("pointer backend failure: {0}")]
    Backend(String),
}

/// The OS pointer seam. Every method may fail; no failure is fatal to the
/// control loop.
pub trait PointerActuator {
    /// Current OS pointer position, queried during calibration point
    /// acquisition and before click-type actuations.
    fn position(&mut self) -> Result<PixelPoint, ActuationError>;

    fn screen_size(&mut self) -> Result<(u32, u32), ActuationError>;

    fn move_to(&mut self, target: PixelPoint) -> Result<(), ActuationError>;

    fn click(&mut self) -> Result<(), ActuationError>;

    fn double_click(&mut self) -> Result<(), ActuationError>;

    fn right_click(&mut self) -> Result<(), ActuationError>;

    /// Positive ticks scroll up (zoom in), negative scroll down.
    fn scroll(&mut self, ticks: i32) -> Result<(), ActuationError>;
}

/// Fallback backend that only logs what it would do. Used when the crate
/// is built without an actuation backend and in dry runs.
pub struct LogActuator {
    screen: (u32, u32),
    position: PixelPoint,
}

impl LogActuator {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            screen: (screen_width, screen_height),
            position: PixelPoint::new(screen_width as i32 / 2, screen_height as i32 / 2),
        }
    }
}

impl PointerActuator for LogActuator {
    fn position(&mut self) -> Result<PixelPoint, ActuationError> {
        Ok(self.position)
    }

    fn screen_size(&mut self) -> Result<(u32, u32), ActuationError> {
        Ok(self.screen)
    }

    fn move_to(&mut self, target: PixelPoint) -> Result<(), ActuationError> {
        self.position = target;
        log::debug!("pointer move to ({}, {})", target.x, target.y);
        Ok(())
    }

    fn click(&mut self) -> Result<(), ActuationError> {
        log::debug!("pointer click");
        Ok(())
    }

    fn double_click(&mut self) -> Result<(), ActuationError> {
        log::debug!("pointer double click");
        Ok(())
    }

    fn right_click(&mut self) -> Result<(), ActuationError> {
        log::debug!("pointer right click");
        Ok(())
    }

    fn scroll(&mut self, ticks: i32) -> Result<(), ActuationError> {
        log::debug!("pointer scroll {ticks}");
        Ok(())
    }
}

#[cfg(feature = "actuator-enigo")]
pub use enigo_backend::EnigoActuator;

#[cfg(feature = "actuator-enigo")]
mod enigo_backend {
    use enigo::{Axis, Button, Coordinate, Direction, Enigo, Mouse, Settings};

    use super::{ActuationError, PointerActuator};
    use crate::types::PixelPoint;

    fn backend_err(err: impl std::fmt::Debug) -> ActuationError {
        ActuationError::Backend(format!("{err:?}"))
    }

    /// System pointer backend on top of enigo.
    pub struct EnigoActuator {
        enigo: Enigo,
    }

    impl EnigoActuator {
        pub fn new() -> Result<Self, ActuationError> {
            let enigo = Enigo::new(&Settings::default()).map_err(backend_err)?;
            Ok(Self { enigo })
        }
    }

    impl PointerActuator for EnigoActuator {
        fn position(&mut self) -> Result<PixelPoint, ActuationError> {
            let (x, y) = self.enigo.location().map_err(backend_err)?;
            Ok(PixelPoint::new(x, y))
        }

        fn screen_size(&mut self) -> Result<(u32, u32), ActuationError> {
            let (w, h) = self.enigo.main_display().map_err(backend_err)?;
            Ok((w as u32, h as u32))
        }

        fn move_to(&mut self, target: PixelPoint) -> Result<(), ActuationError> {
            self.enigo
                .move_mouse(target.x, target.y, Coordinate::Abs)
                .map_err(backend_err)
        }

        fn click(&mut self) -> Result<(), ActuationError> {
            self.enigo
                .button(Button::Left, Direction::Click)
                .map_err(backend_err)
        }

        fn double_click(&mut self) -> Result<(), ActuationError> {
            self.enigo
                .button(Button::Left, Direction::Click)
                .map_err(backend_err)?;
            self.enigo
                .button(Button::Left, Direction::Click)
                .map_err(backend_err)
        }

        fn right_click(&mut self) -> Result<(), ActuationError> {
            self.enigo
                .button(Button::Right, Direction::Click)
                .map_err(backend_err)
        }

        fn scroll(&mut self, ticks: i32) -> Result<(), ActuationError> {
            // enigo's vertical axis is positive-down; scroll up for zoom in.
            self.enigo
                .scroll(-ticks, Axis::Vertical)
                .map_err(backend_err)
        }
    }
}
