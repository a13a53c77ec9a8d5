use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SpeedError;

/// Physically plausible implied-speed window, km/h.
///
/// Coordinate pairs whose implied ground speed falls outside the band are
/// treated as mismatches (clouds, lens artifacts, moving objects). The band
/// is configuration, not a constant: GSD and expected speed vary with
/// altitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedBand {
    pub min_kmh: f64,
    pub max_kmh: f64,
}

impl Default for SpeedBand {
    /// The legacy scaled-model band.
    fn default() -> Self {
        Self {
            min_kmh: 6.0,
            max_kmh: 9.0,
        }
    }
}

impl SpeedBand {
    pub fn contains(&self, speed_kmh: f64) -> bool {
        speed_kmh >= self.min_kmh && speed_kmh <= self.max_kmh
    }

    fn validate(&self) -> Result<(), SpeedError> {
        if self.min_kmh < 0.0 || self.max_kmh <= 0.0 || self.min_kmh > self.max_kmh {
            return Err(SpeedError::Config(format!(
                "invalid speed band [{}, {}] km/h",
                self.min_kmh, self.max_kmh
            )));
        }
        Ok(())
    }
}

/// What to do when the plausibility filter rejects every pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFilterPolicy {
    /// Fail with an error reporting the pixel-displacement range that would
    /// have passed.
    Raise,
    /// Compute the median over all unfiltered pairs instead.
    FallbackUnfiltered,
}

/// The selected representative displacement.
#[derive(Debug, Clone, Copy)]
pub struct MedianSelection {
    /// Ground distance of the selected pair, meters.
    pub distance_m: f64,
    /// Pixel distance of the selected pair.
    pub distance_px: f64,
    /// The coordinate pair that produced the median distance.
    pub pair: (Vec2, Vec2),
}

/// Filters coordinate pairs by implied ground speed and selects the median
/// displacement.
///
/// The median convention is deliberate and must stay put for parity with the
/// recorded estimates: after sorting ascending by ground distance, an odd
/// count picks the exact middle element and an even count picks the *lower*
/// of the two middle elements (index `n/2 - 1`), never an averaged value, so
/// the returned distance always belongs to a real pair.
pub fn median_ground_distance(
    coordinates_1: &[Vec2],
    coordinates_2: &[Vec2],
    elapsed_s: f64,
    gsd_cm_per_px: f64,
    band: SpeedBand,
    on_empty: EmptyFilterPolicy,
) -> Result<MedianSelection, SpeedError> {
    if coordinates_1.is_empty() || coordinates_2.is_empty() {
        return Err(SpeedError::FeatureDetection(
            "no coordinate pairs to process (no matches)".into(),
        ));
    }
    if elapsed_s <= 0.0 {
        return Err(SpeedError::InvalidElapsedTime(elapsed_s));
    }
    if gsd_cm_per_px <= 0.0 {
        return Err(SpeedError::Config(format!(
            "gsd_cm_per_px must be > 0, got {gsd_cm_per_px}"
        )));
    }
    band.validate()?;

    let gsd_m_per_px = gsd_cm_per_px / 100.0;
    let n = coordinates_1.len().min(coordinates_2.len());

    let mut all_pairs: Vec<MedianSelection> = Vec::with_capacity(n);
    let mut kept: Vec<MedianSelection> = Vec::new();

    for (p1, p2) in coordinates_1[..n].iter().zip(&coordinates_2[..n]) {
        let d_px = (p1.as_dvec2() - p2.as_dvec2()).length();
        let d_m = d_px * gsd_m_per_px;
        let speed_kmh = (d_m / 1000.0) / (elapsed_s / 3600.0);

        let entry = MedianSelection {
            distance_m: d_m,
            distance_px: d_px,
            pair: (*p1, *p2),
        };
        all_pairs.push(entry);
        if band.contains(speed_kmh) {
            kept.push(entry);
        }
    }

    let mut chosen = if kept.is_empty() {
        if on_empty == EmptyFilterPolicy::Raise {
            // Report the pixel displacement the band would have accepted.
            let min_dist_m = band.min_kmh * 1000.0 * (elapsed_s / 3600.0);
            let max_dist_m = band.max_kmh * 1000.0 * (elapsed_s / 3600.0);
            return Err(SpeedError::NoPlausiblePairs {
                min_kmh: band.min_kmh,
                max_kmh: band.max_kmh,
                elapsed_s,
                gsd_cm_per_px,
                min_px: min_dist_m / gsd_m_per_px,
                max_px: max_dist_m / gsd_m_per_px,
            });
        }
        log::warn!(
            "speed filter [{}, {}] km/h left no pairs; falling back to all {} unfiltered pairs",
            band.min_kmh,
            band.max_kmh,
            all_pairs.len()
        );
        all_pairs
    } else {
        kept
    };

    // Stable sort: equal distances keep match (descriptor-distance) order.
    chosen.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

    let m = chosen.len();
    let median_idx = if m % 2 == 1 { m / 2 } else { m / 2 - 1 };
    Ok(chosen[median_idx])
}
