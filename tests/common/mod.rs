//! Fixtures shared by the integration tests: synthetic landmark frames and
//! a recording pointer backend.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use gesture_pilot::{ActuationError, FrameInput, HandLandmarkSet, PixelPoint, PointerActuator};

pub const FRAME_W: u32 = 640;
pub const FRAME_H: u32 = 480;
pub const SCREEN_W: u32 = 1920;
pub const SCREEN_H: u32 = 1080;

const INDEX_PIP: usize = 6;
const INDEX_TIP: usize = 8;

/// Folded-fingers base posture with per-landmark overrides in normalized
/// coordinates.
pub fn hand_with(overrides: &[(usize, [f32; 2])]) -> HandLandmarkSet {
    let mut pts = [[0.5f32, 0.8, 0.0]; 21];
    let xs = [0.42f32, 0.47, 0.52, 0.57];
    for (finger, &x) in xs.iter().enumerate() {
        let mcp = 5 + finger * 4;
        pts[mcp] = [x, 0.60, 0.0];
        pts[mcp + 1] = [x, 0.55, 0.0];
        pts[mcp + 2] = [x, 0.58, 0.0];
        pts[mcp + 3] = [x, 0.62, 0.0];
    }
    pts[1] = [0.38, 0.75, 0.0];
    pts[2] = [0.36, 0.70, 0.0];
    pts[3] = [0.34, 0.66, 0.0];
    pts[4] = [0.32, 0.62, 0.0];

    for &(idx, [x, y]) in overrides {
        pts[idx] = [x, y, 0.0];
    }
    HandLandmarkSet::from_points(&pts).expect("21 points")
}

pub fn pointing_hand(tip_x: f32, tip_y: f32) -> HandLandmarkSet {
    hand_with(&[
        (INDEX_PIP, [tip_x, tip_y + 0.10]),
        (INDEX_TIP, [tip_x, tip_y]),
    ])
}

pub fn fist_hand() -> HandLandmarkSet {
    hand_with(&[])
}

/// Places the wrist landmark; used to steer the two-hand zoom detector.
pub fn hand_with_wrist(x: f32, y: f32) -> HandLandmarkSet {
    hand_with(&[(0, [x, y])])
}

pub fn frame_at(hands: Vec<HandLandmarkSet>, at: Instant) -> FrameInput {
    FrameInput {
        hands,
        width: FRAME_W,
        height: FRAME_H,
        timestamp: at,
    }
}

/// Recording backend whose pointer position the test scripts directly,
/// standing in for the operator pre-positioning the OS cursor.
pub struct PointerLog {
    pub pointer: PixelPoint,
    pub moves: Vec<PixelPoint>,
    pub clicks: usize,
    pub scrolls: Vec<i32>,
}

impl Default for PointerLog {
    fn default() -> Self {
        Self {
            pointer: PixelPoint::new(SCREEN_W as i32 / 2, SCREEN_H as i32 / 2),
            moves: Vec::new(),
            clicks: 0,
            scrolls: Vec::new(),
        }
    }
}

pub struct ScriptedActuator {
    pub log: Rc<RefCell<PointerLog>>,
}

impl PointerActuator for ScriptedActuator {
    fn position(&mut self) -> Result<PixelPoint, ActuationError> {
        Ok(self.log.borrow().pointer)
    }

    fn screen_size(&mut self) -> Result<(u32, u32), ActuationError> {
        Ok((SCREEN_W, SCREEN_H))
    }

    fn move_to(&mut self, target: PixelPoint) -> Result<(), ActuationError> {
        let mut log = self.log.borrow_mut();
        log.pointer = target;
        log.moves.push(target);
        Ok(())
    }

    fn click(&mut self) -> Result<(), ActuationError> {
        self.log.borrow_mut().clicks += 1;
        Ok(())
    }

    fn double_click(&mut self) -> Result<(), ActuationError> {
        self.log.borrow_mut().clicks += 2;
        Ok(())
    }

    fn right_click(&mut self) -> Result<(), ActuationError> {
        Ok(())
    }

    fn scroll(&mut self, ticks: i32) -> Result<(), ActuationError> {
        self.log.borrow_mut().scrolls.push(ticks);
        Ok(())
    }
}
