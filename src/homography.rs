use std::fs;
use std::path::Path;

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use thiserror::Error;

use crate::types::PixelPoint;

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("calibration correspondences are degenerate (collinear or repeated points)")]
    DegenerateCorrespondences,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("transform i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("transform file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("transform file holds {0} values, expected 9")]
    BadLength(usize),
}

/// 3x3 homogeneous matrix mapping camera-pixel coordinates onto
/// screen-pixel coordinates. Identity until a calibration is published.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveTransform {
    m: Matrix3<f64>,
}

impl Default for PerspectiveTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl PerspectiveTransform {
    pub fn identity() -> Self {
        Self {
            m: Matrix3::identity(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.m == Matrix3::identity()
    }

    /// Solves the 4-point planar homography taking each camera point onto
    /// its paired screen point. Standard direct linear transform with the
    /// bottom-right element pinned to 1, the same system
    /// `cv2.getPerspectiveTransform` solves.
    pub fn from_correspondences(
        pairs: &[(PixelPoint, PixelPoint); 4],
    ) -> Result<Self, CalibrationError> {
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for (i, (src, dst)) in pairs.iter().enumerate() {
            let (x, y) = (src.x as f64, src.y as f64);
            let (u, v) = (dst.x as f64, dst.y as f64);
            let r = i * 2;
            a[(r, 0)] = x;
            a[(r, 1)] = y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -x * u;
            a[(r, 7)] = -y * u;
            b[r] = u;
            a[(r + 1, 3)] = x;
            a[(r + 1, 4)] = y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -x * v;
            a[(r + 1, 7)] = -y * v;
            b[r + 1] = v;
        }

        let h = a
            .lu()
            .solve(&b)
            .ok_or(CalibrationError::DegenerateCorrespondences)?;

        Ok(Self {
            m: Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0),
        })
    }

    /// Applies the transform with a perspective divide. A vanishing
    /// homogeneous component would divide by zero; such points pass
    /// through unmapped instead.
    pub fn apply(&self, p: PixelPoint) -> PixelPoint {
        let v = self.m * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        if !w.is_finite() || w == 0.0 {
            return p;
        }
        PixelPoint {
            x: (v[0] / w) as i32,
            y: (v[1] / w) as i32,
        }
    }

    /// Sub-pixel variant used by the calibration tests.
    pub fn apply_f64(&self, x: f64, y: f64) -> (f64, f64) {
        let v = self.m * Vector3::new(x, y, 1.0);
        let w = v[2];
        if !w.is_finite() || w == 0.0 {
            return (x, y);
        }
        (v[0] / w, v[1] / w)
    }

    pub fn to_row_major(&self) -> [f64; 9] {
        let mut out = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = self.m[(row, col)];
            }
        }
        out
    }

    pub fn from_row_major(values: [f64; 9]) -> Self {
        let mut m = Matrix3::zeros();
        for row in 0..3 {
            for col in 0..3 {
                m[(row, col)] = values[row * 3 + col];
            }
        }
        Self { m }
    }

    /// Persists the matrix as nine row-major floats.
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let values = self.to_row_major().to_vec();
        fs::write(path, serde_json::to_string(&values)?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        let contents = fs::read_to_string(path)?;
        let values: Vec<f64> = serde_json::from_str(&contents)?;
        let fixed: [f64; 9] = values
            .as_slice()
            .try_into()
            .map_err(|_| PersistenceError::BadLength(values.len()))?;
        Ok(Self::from_row_major(fixed))
    }
}
