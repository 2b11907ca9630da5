use std::time::{Duration, Instant};

use crate::classifier::is_pointing_pose;
use crate::types::{HandLandmarkSet, PixelPoint, INDEX_TIP};

pub const CORNER_COUNT: usize = 4;

/// Acquisition order of the projection quadrilateral.
pub const CORNER_NAMES: [&str; CORNER_COUNT] =
    ["top-left", "top-right", "bottom-right", "bottom-left"];

/// A dwell in progress: the operator is holding the pointing pose over one
/// corner. The screen point is the OS pointer position sampled when the
/// candidate opened; the operator pre-positions the pointer at the target
/// screen location before aiming the camera at the physical spot.
#[derive(Clone, Copy, Debug)]
struct DwellCandidate {
    started_at: Instant,
    camera: PixelPoint,
    screen: PixelPoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationProgress {
    /// No pointing pose this frame; any partial dwell was discarded.
    Waiting,
    /// Pointing pose held; dwell accumulating.
    Dwelling,
    /// A corner pair was just captured; more corners remain.
    CornerCaptured(usize),
    /// All four corner pairs collected.
    Complete,
}

/// Collects up to four (camera, screen) correspondences through dwell-time
/// confirmation of the pointing gesture.
pub struct CalibrationSession {
    pairs: Vec<(PixelPoint, PixelPoint)>,
    candidate: Option<DwellCandidate>,
    dwell: Duration,
}

impl CalibrationSession {
    pub fn new(dwell: Duration) -> Self {
        Self {
            pairs: Vec::with_capacity(CORNER_COUNT),
            candidate: None,
            dwell,
        }
    }

    pub fn corner_index(&self) -> usize {
        self.pairs.len()
    }

    pub fn corner_name(&self) -> Option<&'static str> {
        CORNER_NAMES.get(self.pairs.len()).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.pairs.len() >= CORNER_COUNT
    }

    /// Fraction of the dwell threshold accumulated so far, for the overlay.
    pub fn dwell_progress(&self, now: Instant) -> Option<f32> {
        let candidate = self.candidate.as_ref()?;
        let elapsed = now.duration_since(candidate.started_at).as_secs_f32();
        Some((elapsed / self.dwell.as_secs_f32()).min(1.0))
    }

    /// Advances the session by one frame. `query_pointer` is invoked only
    /// at the instant a new candidate opens.
    pub fn update(
        &mut self,
        hand: &HandLandmarkSet,
        width: u32,
        height: u32,
        now: Instant,
        query_pointer: impl FnOnce() -> Option<PixelPoint>,
    ) -> CalibrationProgress {
        if self.is_complete() {
            return CalibrationProgress::Complete;
        }

        // Losing the pointing pose even momentarily invalidates the dwell;
        // partial time is discarded, never carried over.
        if !is_pointing_pose(hand, width, height) {
            self.candidate = None;
            return CalibrationProgress::Waiting;
        }

        let candidate = match self.candidate {
            Some(c) => c,
            None => {
                let Some(screen) = query_pointer() else {
                    log::warn!("pointer position query failed; dwell not started");
                    return CalibrationProgress::Waiting;
                };
                let camera = hand.pixel(INDEX_TIP, width, height);
                let opened = DwellCandidate {
                    started_at: now,
                    camera,
                    screen,
                };
                self.candidate = Some(opened);
                opened
            }
        };

        if now.duration_since(candidate.started_at) < self.dwell {
            return CalibrationProgress::Dwelling;
        }

        self.pairs.push((candidate.camera, candidate.screen));
        self.candidate = None;
        let captured = self.pairs.len() - 1;
        log::info!(
            "calibration corner {}/{} captured: {}",
            captured + 1,
            CORNER_COUNT,
            CORNER_NAMES[captured],
        );

        if self.is_complete() {
            CalibrationProgress::Complete
        } else {
            CalibrationProgress::CornerCaptured(captured)
        }
    }

    /// Called when no hand is visible; the dwell cannot survive the gap.
    pub fn interrupt(&mut self) {
        self.candidate = None;
    }

    /// Pops the most recent correspondence. A no-op on an empty session.
    pub fn undo(&mut self) -> bool {
        self.candidate = None;
        match self.pairs.pop() {
            Some(_) => {
                log::info!(
                    "calibration point removed; reposition at {}",
                    CORNER_NAMES[self.pairs.len()]
                );
                true
            }
            None => {
                log::warn!("no calibration points to undo");
                false
            }
        }
    }

    /// The four collected correspondences, available once complete.
    pub fn correspondences(&self) -> Option<[(PixelPoint, PixelPoint); 4]> {
        if !self.is_complete() {
            return None;
        }
        Some([self.pairs[0], self.pairs[1], self.pairs[2], self.pairs[3]])
    }

    pub fn restart(&mut self) {
        self.pairs.clear();
        self.candidate = None;
    }
}
