//! Synthetic landmark fixtures shared by the unit tests.

use crate::types::{
    HandLandmarkSet, INDEX_PIP, INDEX_TIP, MIDDLE_PIP, MIDDLE_TIP, PINKY_PIP, PINKY_TIP, RING_PIP,
    RING_TIP, THUMB_TIP,
};

pub const FRAME_W: u32 = 640;
pub const FRAME_H: u32 = 480;

/// Builds a hand from a folded-fingers base posture, applying per-landmark
/// overrides in normalized coordinates.
pub fn hand_with(overrides: &[(usize, [f32; 2])]) -> HandLandmarkSet {
    let mut pts = [[0.5f32, 0.8, 0.0]; 21];

    // Four finger columns: mcp, pip, dip, tip with the tip below the pip.
    let xs = [0.42f32, 0.47, 0.52, 0.57];
    for (finger, &x) in xs.iter().enumerate() {
        let mcp = 5 + finger * 4;
        pts[mcp] = [x, 0.60, 0.0];
        pts[mcp + 1] = [x, 0.55, 0.0];
        pts[mcp + 2] = [x, 0.58, 0.0];
        pts[mcp + 3] = [x, 0.62, 0.0];
    }

    // Thumb off to the side.
    pts[1] = [0.38, 0.75, 0.0];
    pts[2] = [0.36, 0.70, 0.0];
    pts[3] = [0.34, 0.66, 0.0];
    pts[4] = [0.32, 0.62, 0.0];

    for &(idx, [x, y]) in overrides {
        pts[idx] = [x, y, 0.0];
    }
    HandLandmarkSet::from_points(&pts).expect("21 points")
}

/// Index extended at the given normalized tip position, other fingers folded.
pub fn pointing_hand(tip_x: f32, tip_y: f32) -> HandLandmarkSet {
    hand_with(&[
        (INDEX_PIP, [tip_x, tip_y + 0.10]),
        (INDEX_TIP, [tip_x, tip_y]),
    ])
}

/// All four non-thumb fingers folded (the base posture).
pub fn fist_hand() -> HandLandmarkSet {
    hand_with(&[])
}

/// All four fingers extended, fingertips well separated from the thumb.
pub fn open_hand() -> HandLandmarkSet {
    hand_with(&[
        (INDEX_PIP, [0.42, 0.55]),
        (INDEX_TIP, [0.42, 0.40]),
        (MIDDLE_PIP, [0.47, 0.55]),
        (MIDDLE_TIP, [0.47, 0.38]),
        (RING_PIP, [0.52, 0.55]),
        (RING_TIP, [0.52, 0.40]),
        (PINKY_PIP, [0.57, 0.55]),
        (PINKY_TIP, [0.57, 0.42]),
    ])
}

/// Open posture with the thumb tip pinching the index tip; the middle tip
/// stays out of pinch range.
pub fn pinch_index_hand() -> HandLandmarkSet {
    hand_with(&[
        (INDEX_PIP, [0.42, 0.55]),
        (INDEX_TIP, [0.42, 0.40]),
        (MIDDLE_PIP, [0.60, 0.55]),
        (MIDDLE_TIP, [0.60, 0.38]),
        (RING_PIP, [0.65, 0.55]),
        (RING_TIP, [0.65, 0.40]),
        (PINKY_PIP, [0.70, 0.55]),
        (PINKY_TIP, [0.70, 0.42]),
        (THUMB_TIP, [0.43, 0.41]),
    ])
}

/// Open posture with the thumb tip pinching the middle tip instead.
pub fn pinch_middle_hand() -> HandLandmarkSet {
    hand_with(&[
        (INDEX_PIP, [0.25, 0.55]),
        (INDEX_TIP, [0.25, 0.40]),
        (MIDDLE_PIP, [0.47, 0.55]),
        (MIDDLE_TIP, [0.47, 0.38]),
        (RING_PIP, [0.65, 0.55]),
        (RING_TIP, [0.65, 0.40]),
        (PINKY_PIP, [0.70, 0.55]),
        (PINKY_TIP, [0.70, 0.42]),
        (THUMB_TIP, [0.48, 0.39]),
    ])
}

/// A landmark set with a non-finite coordinate.
pub fn malformed_hand() -> HandLandmarkSet {
    hand_with(&[(INDEX_TIP, [f32::NAN, 0.5])])
}

/// Places the wrist landmark; used to steer the two-hand zoom detector.
pub fn hand_with_wrist(x: f32, y: f32) -> HandLandmarkSet {
    hand_with(&[(crate::types::WRIST, [x, y])])
}
