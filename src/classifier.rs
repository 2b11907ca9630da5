use std::time::{Duration, Instant};

use crate::config::GestureConfig;
use crate::types::{
    GestureKind, GestureVerdict, HandLandmarkSet, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP,
    PINKY_PIP, PINKY_TIP, RING_PIP, RING_TIP, THUMB_TIP,
};

/// Image-space "above": the fingertip is numerically higher in the frame
/// than its proximal-interphalangeal joint.
fn extended(hand: &HandLandmarkSet, tip: usize, pip: usize, width: u32, height: u32) -> bool {
    hand.pixel(tip, width, height).y < hand.pixel(pip, width, height).y
}

fn folded(hand: &HandLandmarkSet, tip: usize, pip: usize, width: u32, height: u32) -> bool {
    hand.pixel(tip, width, height).y > hand.pixel(pip, width, height).y
}

/// Index extended with middle, ring and pinky folded. The thumb does not
/// participate. Used for precision cursor control and calibration aiming.
pub fn is_pointing_pose(hand: &HandLandmarkSet, width: u32, height: u32) -> bool {
    extended(hand, INDEX_TIP, INDEX_PIP, width, height)
        && folded(hand, MIDDLE_TIP, MIDDLE_PIP, width, height)
        && folded(hand, RING_TIP, RING_PIP, width, height)
        && folded(hand, PINKY_TIP, PINKY_PIP, width, height)
}

/// All four non-thumb fingers folded. Used to commit a confirmation option.
pub fn is_fist_pose(hand: &HandLandmarkSet, width: u32, height: u32) -> bool {
    folded(hand, INDEX_TIP, INDEX_PIP, width, height)
        && folded(hand, MIDDLE_TIP, MIDDLE_PIP, width, height)
        && folded(hand, RING_TIP, RING_PIP, width, height)
        && folded(hand, PINKY_TIP, PINKY_PIP, width, height)
}

/// Maps one hand's landmarks to a gesture verdict using finger-extension
/// and inter-fingertip-distance heuristics. Stateful only for the
/// double-click window.
pub struct GestureClassifier {
    pinch_distance_px: f32,
    double_click_window: Duration,
    last_click_at: Option<Instant>,
}

impl GestureClassifier {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            pinch_distance_px: config.pinch_distance_px,
            double_click_window: config.double_click_window(),
            last_click_at: None,
        }
    }

    pub fn classify(
        &mut self,
        hand: &HandLandmarkSet,
        width: u32,
        height: u32,
        now: Instant,
    ) -> GestureVerdict {
        if hand.is_malformed() {
            return GestureVerdict::none();
        }

        let index_tip = hand.pixel(INDEX_TIP, width, height);

        // Precision mode: pointing pose moves the cursor from the index
        // tip regardless of where the thumb sits.
        if is_pointing_pose(hand, width, height) {
            return GestureVerdict::new(GestureKind::Cursor, index_tip, 0.95);
        }

        let thumb_tip = hand.pixel(THUMB_TIP, width, height);
        let middle_tip = hand.pixel(MIDDLE_TIP, width, height);

        if thumb_tip.distance(index_tip) < self.pinch_distance_px {
            return self.click_verdict(thumb_tip.midpoint(index_tip), now);
        }

        if thumb_tip.distance(middle_tip) < self.pinch_distance_px {
            return GestureVerdict::new(
                GestureKind::RightClick,
                thumb_tip.midpoint(middle_tip),
                0.9,
            );
        }

        // Open-hand fallback: still cursor control, lower confidence.
        GestureVerdict::new(GestureKind::Cursor, index_tip, 0.8)
    }

    fn click_verdict(&mut self, position: crate::types::PixelPoint, now: Instant) -> GestureVerdict {
        if let Some(last) = self.last_click_at {
            if now.duration_since(last) < self.double_click_window {
                // The stored click is consumed by the upgrade, so a third
                // pinch starts a fresh single-click cycle.
                self.last_click_at = None;
                return GestureVerdict::new(GestureKind::DoubleClick, position, 0.9);
            }
        }
        self.last_click_at = Some(now);
        GestureVerdict::new(GestureKind::LeftClick, position, 0.9)
    }

    pub fn reset(&mut self) {
        self.last_click_at = None;
    }
}
