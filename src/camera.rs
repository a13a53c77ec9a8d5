use serde::{Deserialize, Serialize};

use crate::error::SpeedError;

/// Fixed optical constants of the capture camera.
///
/// Immutable after construction; validated once and passed into
/// [`crate::geometry::GroundGeometry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    pub width_px: u32,
    pub height_px: u32,
    pub sensor_width_mm: f64,
    pub sensor_height_mm: f64,
    pub focal_length_mm: f64,
}

impl Default for CameraConfig {
    /// Raspberry Pi HQ camera as flown on the ISS Astro Pi units.
    fn default() -> Self {
        Self {
            width_px: 4056,
            height_px: 3040,
            sensor_width_mm: 6.287,
            sensor_height_mm: 4.712,
            focal_length_mm: 5.0,
        }
    }
}

impl CameraConfig {
    /// Checks that every constant is usable as a divisor.
    pub fn validate(&self) -> Result<(), SpeedError> {
        if self.width_px == 0 || self.height_px == 0 {
            return Err(SpeedError::Config("camera resolution must be non-zero".into()));
        }
        if self.sensor_width_mm <= 0.0 || self.sensor_height_mm <= 0.0 {
            return Err(SpeedError::Config("sensor dimensions must be > 0".into()));
        }
        if self.focal_length_mm <= 0.0 {
            return Err(SpeedError::Config("focal length must be > 0".into()));
        }
        Ok(())
    }

    /// Physical pixel pitch in mm, per axis.
    pub fn pixel_pitch_mm(&self) -> (f64, f64) {
        (
            self.sensor_width_mm / self.width_px as f64,
            self.sensor_height_mm / self.height_px as f64,
        )
    }

    /// Image center in pixel coordinates.
    pub fn center_px(&self) -> (f64, f64) {
        (self.width_px as f64 / 2.0, self.height_px as f64 / 2.0)
    }
}
