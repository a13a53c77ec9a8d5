use glam::Vec2;

use crate::camera::CameraConfig;
use crate::error::SpeedError;

/// Mean Earth radius used by the spherical curvature correction, meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Equatorial radius (WGS84 semi-major axis), meters.
pub const EARTH_EQUATORIAL_RADIUS_M: f64 = 6_378_137.0;

/// Polar radius (WGS84 semi-minor axis), meters.
pub const EARTH_POLAR_RADIUS_M: f64 = 6_356_752.3;

/// Sidereal rotation rate of the Earth, rad/s.
pub const EARTH_ROTATION_RATE: f64 = 7.292_115_9e-5;

/// Converts pixel measurements into ground measurements for a nadir-pointing
/// camera at orbital altitude.
///
/// Pure functions of the fixed camera intrinsics and the supplied altitude;
/// altitude is an argument everywhere because it drifts over a pass.
#[derive(Debug, Clone)]
pub struct GroundGeometry {
    camera: CameraConfig,
}

impl GroundGeometry {
    pub fn new(camera: CameraConfig) -> Result<Self, SpeedError> {
        camera.validate()?;
        Ok(Self { camera })
    }

    pub fn camera(&self) -> &CameraConfig {
        &self.camera
    }

    /// Ground sample distance in meters per pixel, (x, y).
    ///
    /// `gsd = altitude * sensor_size / (focal_length * resolution)` per axis.
    /// Strictly positive and monotonically increasing in altitude.
    pub fn ground_sample_distance(&self, altitude_m: f64) -> Result<(f64, f64), SpeedError> {
        if altitude_m <= 0.0 {
            return Err(SpeedError::InvalidAltitude(altitude_m));
        }
        let gsd_x = altitude_m * self.camera.sensor_width_mm
            / (self.camera.focal_length_mm * self.camera.width_px as f64);
        let gsd_y = altitude_m * self.camera.sensor_height_mm
            / (self.camera.focal_length_mm * self.camera.height_px as f64);
        Ok((gsd_x, gsd_y))
    }

    /// Average of the x and y ground sample distance, in cm per pixel.
    ///
    /// The unit matches the legacy scalar speed model.
    pub fn gsd_cm_per_px(&self, altitude_m: f64) -> Result<f64, SpeedError> {
        let (gx, gy) = self.ground_sample_distance(altitude_m)?;
        Ok((gx + gy) / 2.0 * 100.0)
    }

    /// Projects a pixel's signed offset from the image center into the view
    /// angle from the orbit, (x, y) in radians.
    ///
    /// Per axis: `beta = atan(offset_mm / focal_mm)` (the atan small-angle
    /// variant), then the curvature correction
    /// `alpha = asin(sin(beta) * (1 + altitude / earth_radius))` which maps
    /// the view angle onto the geocentric angle of the observed ground point.
    /// Signs are preserved so that displacements keep their direction.
    pub fn pixel_offset_to_angle(
        &self,
        pixel: Vec2,
        altitude_m: f64,
    ) -> Result<(f64, f64), SpeedError> {
        if altitude_m <= 0.0 {
            return Err(SpeedError::InvalidAltitude(altitude_m));
        }
        let (cx, cy) = self.camera.center_px();
        let (pitch_x, pitch_y) = self.camera.pixel_pitch_mm();

        let beta_x = ((pixel.x as f64 - cx) * pitch_x / self.camera.focal_length_mm).atan();
        let beta_y = ((pixel.y as f64 - cy) * pitch_y / self.camera.focal_length_mm).atan();

        let stretch = 1.0 + altitude_m / EARTH_RADIUS_M;
        let alpha_x = (beta_x.sin() * stretch).asin();
        let alpha_y = (beta_y.sin() * stretch).asin();
        Ok((alpha_x, alpha_y))
    }

    /// Euclidean distance between two angular positions scaled by the orbit
    /// radius `(earth_radius + altitude)`, in meters.
    pub fn angular_distance_to_ground(
        &self,
        pos1: (f64, f64),
        pos2: (f64, f64),
        altitude_m: f64,
    ) -> f64 {
        let dx = pos1.0 - pos2.0;
        let dy = pos1.1 - pos2.1;
        (dx * dx + dy * dy).sqrt() * (EARTH_RADIUS_M + altitude_m)
    }
}

/// Local Earth radius at the given sub-satellite longitude, meters.
///
/// Oblate-spheroid formula `(W*H) / (2*sqrt((H*cos(lon))^2 + (W*sin(lon))^2))`
/// with W and H the equatorial and polar diameters, so the result runs from
/// the equatorial radius down to the polar radius.
pub fn local_earth_radius(longitude_rad: f64) -> f64 {
    let w = 2.0 * EARTH_EQUATORIAL_RADIUS_M;
    let h = 2.0 * EARTH_POLAR_RADIUS_M;
    let (s, c) = longitude_rad.sin_cos();
    (w * h) / (2.0 * ((h * c).powi(2) + (w * s).powi(2)).sqrt())
}
