use std::time::{Duration, Instant};

use crate::classifier::{is_fist_pose, is_pointing_pose};
use crate::homography::PerspectiveTransform;
use crate::types::{ConfirmOption, HandLandmarkSet, PixelPoint, INDEX_TIP};

/// Button strip geometry, relative to the camera frame: three equal
/// columns along the bottom edge.
const STRIP_BOTTOM_OFFSET: i32 = 80;
const STRIP_ABOVE: i32 = 25;
const STRIP_BELOW: i32 = 15;
const STRIP_MARGIN: i32 = 20;
const COLUMN_GAP: i32 = 10;

const OPTIONS: [ConfirmOption; 3] = [
    ConfirmOption::Confirm,
    ConfirmOption::Recalibrate,
    ConfirmOption::Cancel,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Pending,
    Committed(ConfirmOption),
}

/// Holds a freshly computed transform while the operator accepts or
/// rejects it. Pointing highlights an option; a fist held for the
/// confirmation dwell commits it.
pub struct ConfirmationSession {
    pending: PerspectiveTransform,
    highlighted: ConfirmOption,
    fist_since: Option<Instant>,
    dwell: Duration,
}

impl ConfirmationSession {
    pub fn new(pending: PerspectiveTransform, dwell: Duration) -> Self {
        Self {
            pending,
            highlighted: ConfirmOption::Confirm,
            fist_since: None,
            dwell,
        }
    }

    pub fn highlighted(&self) -> ConfirmOption {
        self.highlighted
    }

    pub fn into_pending(self) -> PerspectiveTransform {
        self.pending
    }

    pub fn update(
        &mut self,
        hand: &HandLandmarkSet,
        width: u32,
        height: u32,
        now: Instant,
    ) -> ConfirmOutcome {
        if is_pointing_pose(hand, width, height) {
            let tip = hand.pixel(INDEX_TIP, width, height);
            if let Some(option) = hit_test(width, height, tip) {
                self.highlighted = option;
            }
            self.fist_since = None;
            return ConfirmOutcome::Pending;
        }

        if is_fist_pose(hand, width, height) {
            let since = *self.fist_since.get_or_insert(now);
            if now.duration_since(since) >= self.dwell {
                self.fist_since = None;
                return ConfirmOutcome::Committed(self.highlighted);
            }
            return ConfirmOutcome::Pending;
        }

        // Any other pose resets the commit timer but keeps the highlight.
        self.fist_since = None;
        ConfirmOutcome::Pending
    }

    /// Called when no hand is visible this frame.
    pub fn interrupt(&mut self) {
        self.fist_since = None;
    }
}

/// Maps an index-tip position onto one of the three option regions.
fn hit_test(width: u32, height: u32, p: PixelPoint) -> Option<ConfirmOption> {
    let strip_y = height as i32 - STRIP_BOTTOM_OFFSET;
    if p.y < strip_y - STRIP_ABOVE || p.y > strip_y + STRIP_BELOW {
        return None;
    }
    let column = (width as i32 - 2 * STRIP_MARGIN) / OPTIONS.len() as i32;
    for (i, option) in OPTIONS.iter().enumerate() {
        let x0 = STRIP_MARGIN + i as i32 * column;
        if p.x >= x0 && p.x <= x0 + column - COLUMN_GAP {
            return Some(*option);
        }
    }
    None
}
