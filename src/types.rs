use std::time::Instant;

/// Anatomical landmark ids as delivered by the hand-pose provider.
/// 21 points per hand: wrist, then four joints per finger.
pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

pub const LANDMARK_COUNT: usize = 21;

/// A 2D position in integer pixel coordinates (camera frame or screen).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: PixelPoint) -> PixelPoint {
        PixelPoint {
            x: (self.x + other.x) / 2,
            y: (self.y + other.y) / 2,
        }
    }

    pub fn distance(self, other: PixelPoint) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// One hand's worth of frame-normalized landmarks, immutable once built.
#[derive(Clone, Debug)]
pub struct HandLandmarkSet {
    points: [[f32; 3]; LANDMARK_COUNT],
}

impl HandLandmarkSet {
    /// Builds a landmark set from provider output. Returns `None` when the
    /// provider delivered fewer than 21 points.
    pub fn from_points(points: &[[f32; 3]]) -> Option<Self> {
        if points.len() < LANDMARK_COUNT {
            return None;
        }
        let mut fixed = [[0.0f32; 3]; LANDMARK_COUNT];
        fixed.copy_from_slice(&points[..LANDMARK_COUNT]);
        Some(Self { points: fixed })
    }

    pub fn point(&self, idx: usize) -> [f32; 3] {
        self.points[idx]
    }

    /// Projects a normalized landmark into frame-pixel space.
    pub fn pixel(&self, idx: usize, width: u32, height: u32) -> PixelPoint {
        let [x, y, _z] = self.points[idx];
        PixelPoint {
            x: (x * width as f32) as i32,
            y: (y * height as f32) as i32,
        }
    }

    /// True when any coordinate is non-finite; such sets cannot be
    /// classified and degrade to a `NoGesture` verdict.
    pub fn is_malformed(&self) -> bool {
        self.points
            .iter()
            .any(|p| p.iter().any(|c| !c.is_finite()))
    }
}

/// One frame of provider output: zero, one or two hands plus the frame's
/// pixel dimensions and capture timestamp.
#[derive(Clone, Debug)]
pub struct FrameInput {
    pub hands: Vec<HandLandmarkSet>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

impl FrameInput {
    /// Stamps the frame with the current instant at construction.
    pub fn new(hands: Vec<HandLandmarkSet>, width: u32, height: u32) -> Self {
        Self {
            hands,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    pub fn empty(width: u32, height: u32) -> Self {
        Self::new(Vec::new(), width, height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Cursor,
    LeftClick,
    DoubleClick,
    RightClick,
    ZoomIn,
    ZoomOut,
    NoGesture,
}

impl GestureKind {
    pub fn label(&self) -> &'static str {
        match self {
            GestureKind::Cursor => "cursor",
            GestureKind::LeftClick => "left click",
            GestureKind::DoubleClick => "double click",
            GestureKind::RightClick => "right click",
            GestureKind::ZoomIn => "zoom in",
            GestureKind::ZoomOut => "zoom out",
            GestureKind::NoGesture => "none",
        }
    }

    pub fn is_click(&self) -> bool {
        matches!(
            self,
            GestureKind::LeftClick | GestureKind::DoubleClick | GestureKind::RightClick
        )
    }
}

/// Per-frame classification result, consumed immediately by the engine.
#[derive(Clone, Copy, Debug)]
pub struct GestureVerdict {
    pub kind: GestureKind,
    pub position: Option<PixelPoint>,
    pub confidence: f32,
}

impl GestureVerdict {
    pub fn new(kind: GestureKind, position: PixelPoint, confidence: f32) -> Self {
        Self {
            kind,
            position: Some(position),
            confidence,
        }
    }

    pub fn none() -> Self {
        Self {
            kind: GestureKind::NoGesture,
            position: None,
            confidence: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationMode {
    /// Linear frame-to-screen scaling, no calibration involved.
    Direct,
    /// Coordinates pass through the calibrated perspective transform.
    Projected,
}

impl OperationMode {
    pub fn label(&self) -> &'static str {
        match self {
            OperationMode::Direct => "direct",
            OperationMode::Projected => "projected",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Calibrating,
    ConfirmPending,
    Active,
}

impl EngineState {
    pub fn label(&self) -> &'static str {
        match self {
            EngineState::Idle => "idle",
            EngineState::Calibrating => "calibrating",
            EngineState::ConfirmPending => "confirm pending",
            EngineState::Active => "active",
        }
    }
}

/// Option presented while a freshly computed calibration awaits a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmOption {
    Confirm,
    Recalibrate,
    Cancel,
}

impl ConfirmOption {
    pub fn label(&self) -> &'static str {
        match self {
            ConfirmOption::Confirm => "confirm",
            ConfirmOption::Recalibrate => "recalibrate",
            ConfirmOption::Cancel => "cancel",
        }
    }
}

/// Discrete external commands, sampled once per frame between frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ToggleOverlay,
    SwitchMode,
    StartCalibration,
    UndoCalibrationPoint,
    ResetCalibration,
    Quit,
}

/// Display-agnostic per-frame description for an external overlay renderer.
/// The engine performs no drawing of its own.
#[derive(Clone, Debug)]
pub struct OverlaySnapshot {
    pub state: EngineState,
    pub mode: OperationMode,
    pub verdict: GestureKind,
    pub cursor: Option<PixelPoint>,
    pub corners_collected: usize,
    pub current_corner: Option<&'static str>,
    pub dwell_progress: Option<f32>,
    pub highlighted: Option<ConfirmOption>,
    pub calibrated: bool,
    pub overlay_visible: bool,
}
