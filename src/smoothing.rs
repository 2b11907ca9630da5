use std::collections::VecDeque;

use crate::types::PixelPoint;

/// Moving-average filter over the last `window` raw cursor positions.
/// Applied to cursor-type verdicts only; click and zoom positions stay raw.
pub struct MovingAverage {
    xs: VecDeque<i32>,
    ys: VecDeque<i32>,
    window: usize,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            xs: VecDeque::with_capacity(window),
            ys: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Pushes a raw sample and returns the truncated mean of the history.
    pub fn push(&mut self, raw: PixelPoint) -> PixelPoint {
        self.xs.push_back(raw.x);
        self.ys.push_back(raw.y);
        if self.xs.len() > self.window {
            self.xs.pop_front();
        }
        if self.ys.len() > self.window {
            self.ys.pop_front();
        }

        PixelPoint {
            x: mean(&self.xs),
            y: mean(&self.ys),
        }
    }

    pub fn reset(&mut self) {
        self.xs.clear();
        self.ys.clear();
    }
}

fn mean(values: &VecDeque<i32>) -> i32 {
    let sum: i64 = values.iter().map(|&v| v as i64).sum();
    (sum / values.len() as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_input_converges_exactly() {
        let mut filter = MovingAverage::new(5);
        let target = PixelPoint::new(320, 240);
        let mut out = PixelPoint::new(0, 0);
        for _ in 0..8 {
            out = filter.push(target);
        }
        assert_eq!(out, target);
    }

    #[test]
    fn alternating_samples_average_to_midpoint() {
        let mut filter = MovingAverage::new(4);
        filter.push(PixelPoint::new(0, 0));
        filter.push(PixelPoint::new(10, 10));
        filter.push(PixelPoint::new(0, 0));
        let out = filter.push(PixelPoint::new(10, 10));
        assert_eq!(out, PixelPoint::new(5, 5));
    }

    #[test]
    fn history_is_bounded_by_window() {
        let mut filter = MovingAverage::new(2);
        filter.push(PixelPoint::new(1000, 1000));
        filter.push(PixelPoint::new(0, 0));
        let out = filter.push(PixelPoint::new(0, 0));
        // The old outlier fell out of the two-sample window.
        assert_eq!(out, PixelPoint::new(0, 0));
    }

    #[test]
    fn reset_discards_history() {
        let mut filter = MovingAverage::new(3);
        filter.push(PixelPoint::new(90, 90));
        filter.reset();
        let out = filter.push(PixelPoint::new(10, 20));
        assert_eq!(out, PixelPoint::new(10, 20));
    }
}
