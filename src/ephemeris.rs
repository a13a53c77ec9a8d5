use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::error::SpeedError;

/// Narrow interface to the orbital ephemeris.
///
/// The live source (TLE propagation, telemetry) stays outside the crate; the
/// core only needs these four lookups, all fallible: missing orbital data
/// must propagate, never be defaulted silently.
pub trait OrbitProvider {
    /// Altitude above the surface at `t`, meters.
    fn altitude_at(&self, t: PrimitiveDateTime) -> Result<f64, SpeedError>;

    /// Sub-satellite point at `t`, (latitude, longitude) in radians.
    fn position_at(&self, t: PrimitiveDateTime) -> Result<(f64, f64), SpeedError>;

    /// Compass direction of the ground-track velocity at `t`, radians.
    fn azimuth_at(&self, t: PrimitiveDateTime) -> Result<f64, SpeedError>;

    /// Ephemeris speed at `t`, km/s. Only a sanity cross-check for the
    /// computed estimate, never ground truth.
    fn speed_estimate_at(&self, t: PrimitiveDateTime) -> Result<f64, SpeedError>;
}

/// Everything the speed estimator needs about the orbit at one instant.
#[derive(Debug, Clone, Copy)]
pub struct OrbitalSnapshot {
    pub altitude_m: f64,
    pub latitude_rad: f64,
    pub longitude_rad: f64,
    pub azimuth_rad: f64,
}

impl OrbitalSnapshot {
    pub fn sample(provider: &dyn OrbitProvider, t: PrimitiveDateTime) -> Result<Self, SpeedError> {
        let altitude_m = provider.altitude_at(t)?;
        let (latitude_rad, longitude_rad) = provider.position_at(t)?;
        let azimuth_rad = provider.azimuth_at(t)?;
        Ok(Self {
            altitude_m,
            latitude_rad,
            longitude_rad,
            azimuth_rad,
        })
    }
}

/// Fixed-value provider for offline runs and tests.
///
/// Loadable from JSON; defaults describe a typical ISS pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticOrbit {
    pub altitude_m: f64,
    pub latitude_rad: f64,
    pub longitude_rad: f64,
    pub azimuth_rad: f64,
    pub speed_kms: f64,
}

impl Default for StaticOrbit {
    fn default() -> Self {
        Self {
            altitude_m: 420_000.0,
            latitude_rad: 0.0,
            longitude_rad: 0.0,
            // Roughly east-north-east, matching the 51.6 degree inclination
            // ascending pass.
            azimuth_rad: 0.67,
            speed_kms: 7.66,
        }
    }
}

impl OrbitProvider for StaticOrbit {
    fn altitude_at(&self, _t: PrimitiveDateTime) -> Result<f64, SpeedError> {
        if self.altitude_m <= 0.0 {
            return Err(SpeedError::OrbitalDataUnavailable(format!(
                "static orbit has invalid altitude {} m",
                self.altitude_m
            )));
        }
        Ok(self.altitude_m)
    }

    fn position_at(&self, _t: PrimitiveDateTime) -> Result<(f64, f64), SpeedError> {
        Ok((self.latitude_rad, self.longitude_rad))
    }

    fn azimuth_at(&self, _t: PrimitiveDateTime) -> Result<f64, SpeedError> {
        Ok(self.azimuth_rad)
    }

    fn speed_estimate_at(&self, _t: PrimitiveDateTime) -> Result<f64, SpeedError> {
        Ok(self.speed_kms)
    }
}
