use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Settings the external landmark provider is expected to run with. The
/// engine does not filter on these itself; the driver reports them at
/// startup so the provider side can be configured to match.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    pub max_hands: u8,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.5,
            max_hands: 2,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Fingertip distance in frame pixels below which a pinch registers.
    pub pinch_distance_px: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    pub zoom_cooldown_ms: u64,
    pub scroll_ticks: i32,
    pub smoothing_window: usize,
    pub double_click_window_secs: f32,
    pub calibration_dwell_secs: f32,
    pub confirm_dwell_secs: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_distance_px: 40.0,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            zoom_cooldown_ms: 100,
            scroll_ticks: 3,
            smoothing_window: 5,
            double_click_window_secs: 0.5,
            calibration_dwell_secs: 3.0,
            confirm_dwell_secs: 1.5,
        }
    }
}

impl GestureConfig {
    pub fn double_click_window(&self) -> Duration {
        Duration::from_secs_f32(self.double_click_window_secs)
    }

    pub fn calibration_dwell(&self) -> Duration {
        Duration::from_secs_f32(self.calibration_dwell_secs)
    }

    pub fn confirm_dwell(&self) -> Duration {
        Duration::from_secs_f32(self.confirm_dwell_secs)
    }

    pub fn zoom_cooldown(&self) -> Duration {
        Duration::from_millis(self.zoom_cooldown_ms)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub visible_by_default: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            visible_by_default: true,
        }
    }
}

/// Immutable per-session configuration, loaded once at startup.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub detection: DetectionConfig,
    pub gestures: GestureConfig,
    pub overlay: OverlayConfig,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: EngineConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.sanitize();
        Ok(config)
    }

    /// Loads the config file, falling back to defaults when it is missing
    /// or unreadable. A parse failure is still worth surfacing in the log.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                log::info!("loaded configuration from {}", path.display());
                config
            }
            Err(err) => {
                log::warn!("{err}; using default configuration");
                Self::default()
            }
        }
    }

    fn sanitize(&mut self) {
        self.detection.max_hands = self.detection.max_hands.clamp(1, 2);
        if self.gestures.smoothing_window == 0 {
            self.gestures.smoothing_window = 1;
        }
    }
}
