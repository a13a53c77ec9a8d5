use glam::Vec2;
use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::ephemeris::OrbitalSnapshot;
use crate::error::SpeedError;
use crate::geometry::{local_earth_radius, GroundGeometry, EARTH_ROTATION_RATE};

/// Which speed model a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedModel {
    /// Flat scalar model: median pixel distance times a fixed GSD.
    Legacy,
    /// Angular recomputation at the actual orbit with azimuth rotation and
    /// Earth-rotation compensation. The canonical model.
    Geometric,
}

/// Legacy scalar speed: `distance_px * gsd_cm_per_px / 100000 / elapsed_s`,
/// km/s.
pub fn linear_speed_kms(distance_px: f64, gsd_cm_per_px: f64, elapsed_s: f64) -> f64 {
    let distance_km = distance_px * gsd_cm_per_px / 100_000.0;
    distance_km / elapsed_s
}

/// Full geometric ground-track speed in km/s.
///
/// The pixel pair is projected into view angles at the snapshot altitude,
/// differenced into a camera-frame angular rate, rotated by the ground-track
/// azimuth into a North/East frame, and composed with the Earth's own
/// rotation as a vector (`rate * cos(latitude)` eastward) before scaling
/// the norm by the local orbit radius.
pub fn ground_track_speed(
    pair: (Vec2, Vec2),
    elapsed_s: f64,
    snapshot: &OrbitalSnapshot,
    geometry: &GroundGeometry,
) -> Result<f64, SpeedError> {
    if elapsed_s <= 0.0 {
        return Err(SpeedError::InvalidElapsedTime(elapsed_s));
    }
    let (a1x, a1y) = geometry.pixel_offset_to_angle(pair.0, snapshot.altitude_m)?;
    let (a2x, a2y) = geometry.pixel_offset_to_angle(pair.1, snapshot.altitude_m)?;

    // Camera-frame angular rate, rad/s.
    let omega_cam = na::Vector2::new((a2x - a1x) / elapsed_s, (a2y - a1y) / elapsed_s);

    // Rotate into (north, east).
    let omega_ne = na::Rotation2::new(snapshot.azimuth_rad) * omega_cam;

    // The observed ground drifts east under the orbit.
    let earth = na::Vector2::new(0.0, EARTH_ROTATION_RATE * snapshot.latitude_rad.cos());
    let total = omega_ne + earth;

    let radius_m = local_earth_radius(snapshot.longitude_rad) + snapshot.altitude_m;
    Ok(total.norm() * radius_m / 1000.0)
}

/// Accumulates per-pair speed estimates over a run, in capture order.
#[derive(Debug, Default, Clone)]
pub struct RunStatistics {
    samples: Vec<f64>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speed_kms: f64) {
        self.samples.push(speed_kms);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn raw_mean(&self) -> f64 {
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Population standard deviation of the untrimmed samples.
    pub fn std_dev(&self) -> f64 {
        if self.samples.len() < 2 {
            return 0.0;
        }
        let mean = self.raw_mean();
        let var = self
            .samples
            .iter()
            .map(|s| (s - mean) * (s - mean))
            .sum::<f64>()
            / self.samples.len() as f64;
        var.sqrt()
    }

    /// 2-sigma trimmed mean: samples more than two raw standard deviations
    /// from the raw mean are discarded, the rest averaged. With fewer than
    /// two samples (or a degenerate trim) the raw mean is returned.
    pub fn trimmed_mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let mean = self.raw_mean();
        let sigma = self.std_dev();
        if sigma == 0.0 {
            return Some(mean);
        }
        let kept: Vec<f64> = self
            .samples
            .iter()
            .copied()
            .filter(|s| (s - mean).abs() <= 2.0 * sigma)
            .collect();
        if kept.is_empty() {
            Some(mean)
        } else {
            Some(kept.iter().sum::<f64>() / kept.len() as f64)
        }
    }
}
