use serde::{Deserialize, Serialize};

use crate::error::SpeedError;
use crate::filter::{EmptyFilterPolicy, SpeedBand};
use crate::speed::SpeedModel;

/// Run configuration. Defaults reproduce the flight constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Feature-detector cap per image.
    pub max_features: usize,
    /// Minimum surviving cross-checked matches per pair.
    pub min_matches: usize,
    /// FAST intensity threshold.
    pub fast_threshold: u8,
    /// Implied-speed plausibility window for the outlier filter.
    pub speed_band: SpeedBand,
    /// What to do when the filter rejects every pair.
    pub on_empty: EmptyFilterPolicy,
    /// Nominal capture spacing, seconds. Informational for capture
    /// scheduling; the per-pair elapsed time always comes from EXIF.
    pub capture_interval_s: f64,
    /// Which speed model to evaluate.
    pub model: SpeedModel,
    /// Fixed GSD for the legacy model, cm per pixel.
    pub legacy_gsd_cm_per_px: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            min_matches: 10,
            fast_threshold: 20,
            speed_band: SpeedBand::default(),
            on_empty: EmptyFilterPolicy::FallbackUnfiltered,
            capture_interval_s: 35.0,
            model: SpeedModel::Geometric,
            legacy_gsd_cm_per_px: 12648.0,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<(), SpeedError> {
        if self.max_features == 0 {
            return Err(SpeedError::Config("max_features must be > 0".into()));
        }
        if self.min_matches == 0 {
            return Err(SpeedError::Config("min_matches must be > 0".into()));
        }
        if self.capture_interval_s <= 0.0 {
            return Err(SpeedError::Config("capture_interval_s must be > 0".into()));
        }
        if self.legacy_gsd_cm_per_px <= 0.0 {
            return Err(SpeedError::Config("legacy_gsd_cm_per_px must be > 0".into()));
        }
        Ok(())
    }
}
