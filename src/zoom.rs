use crate::config::GestureConfig;
use crate::types::{GestureKind, GestureVerdict, HandLandmarkSet, WRIST};

/// Two-hand zoom detection by comparing the inter-wrist pixel distance
/// against the previous frame's distance. Actuation-rate limiting is the
/// action engine's job; this only produces verdicts.
pub struct ZoomDetector {
    zoom_in_factor: f32,
    zoom_out_factor: f32,
    prev_distance: Option<f32>,
}

impl ZoomDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            zoom_in_factor: config.zoom_in_factor,
            zoom_out_factor: config.zoom_out_factor,
            prev_distance: None,
        }
    }

    pub fn detect(
        &mut self,
        first: &HandLandmarkSet,
        second: &HandLandmarkSet,
        width: u32,
        height: u32,
    ) -> GestureVerdict {
        if first.is_malformed() || second.is_malformed() {
            return GestureVerdict::none();
        }

        let a = first.pixel(WRIST, width, height);
        let b = second.pixel(WRIST, width, height);
        let distance = a.distance(b);

        let verdict = match self.prev_distance {
            Some(prev) if distance > prev * self.zoom_in_factor => {
                GestureVerdict::new(GestureKind::ZoomIn, a.midpoint(b), 0.8)
            }
            Some(prev) if distance < prev * self.zoom_out_factor => {
                GestureVerdict::new(GestureKind::ZoomOut, a.midpoint(b), 0.8)
            }
            _ => GestureVerdict::none(),
        };

        // The baseline tracks every two-hand frame so the comparison never
        // drifts away from the current hand separation.
        self.prev_distance = Some(distance);
        verdict
    }

    pub fn reset(&mut self) {
        self.prev_distance = None;
    }
}
