use std::path::{Path, PathBuf};

use glam::Vec2;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;
use time::macros::datetime;
use time::PrimitiveDateTime;

use crate::config::EstimatorConfig;
use crate::data_loader::{consecutive_pairs, load_grayscale};
use crate::ephemeris::{OrbitProvider, OrbitalSnapshot};
use crate::error::SpeedError;
use crate::features::{match_features, matching_coordinates, FeatureExtractor};
use crate::filter::median_ground_distance;
use crate::geometry::GroundGeometry;
use crate::io::write_result;
use crate::metadata::{capture_time, elapsed_seconds};
use crate::speed::{ground_track_speed, linear_speed_kms, RunStatistics, SpeedModel};

/// Timestamp used for ephemeris lookups when the caller supplied an explicit
/// elapsed time and the images carry no EXIF (synthetic pairs).
const SYNTHETIC_EPOCH: PrimitiveDateTime = datetime!(2000-01-01 00:00:00);

/// The outcome of one image-pair evaluation.
#[derive(Debug, Clone)]
pub struct PairEstimate {
    pub speed_kms: f64,
    pub ground_distance_m: f64,
    pub pixel_distance_px: f64,
    pub elapsed_s: f64,
    pub match_count: usize,
    /// The coordinate pair that produced the median ground distance.
    pub pair: (Vec2, Vec2),
}

/// Summary of a multi-pair run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pair_count: usize,
    pub failed: usize,
    /// 2-sigma trimmed mean over the successful pairs, km/s.
    pub speed_kms: Option<f64>,
    /// Standard deviation of the untrimmed estimates, km/s.
    pub std_kms: f64,
}

fn pair_times(
    path_a: &Path,
    path_b: &Path,
    elapsed_override: Option<f64>,
) -> Result<(PrimitiveDateTime, f64), SpeedError> {
    match elapsed_override {
        Some(dt) => {
            if dt <= 0.0 {
                return Err(SpeedError::InvalidElapsedTime(dt));
            }
            let t_a = capture_time(path_a).unwrap_or(SYNTHETIC_EPOCH);
            Ok((t_a, dt))
        }
        None => {
            let t_a = capture_time(path_a)?;
            let t_b = capture_time(path_b)?;
            Ok((t_a, elapsed_seconds(t_a, t_b)?))
        }
    }
}

/// Runs the full estimation pipeline on one image pair.
///
/// `elapsed_override` bypasses EXIF for images without timestamps; without
/// it, missing metadata fails the pair.
pub fn evaluate_pair(
    path_a: &Path,
    path_b: &Path,
    elapsed_override: Option<f64>,
    config: &EstimatorConfig,
    geometry: &GroundGeometry,
    orbit: &dyn OrbitProvider,
) -> Result<PairEstimate, SpeedError> {
    config.validate()?;
    let (t_a, elapsed_s) = pair_times(path_a, path_b, elapsed_override)?;

    let img_a = load_grayscale(path_a)?;
    let img_b = load_grayscale(path_b)?;

    let extractor = FeatureExtractor::new(config.fast_threshold, config.max_features);
    let (kp_a, desc_a) = extractor.detect_and_describe(&img_a)?;
    let (kp_b, desc_b) = extractor.detect_and_describe(&img_b)?;
    log::trace!(
        "{}: {} keypoints, {}: {} keypoints",
        path_a.display(),
        kp_a.len(),
        path_b.display(),
        kp_b.len()
    );

    let matches = match_features(&desc_a, &desc_b, config.min_matches)?;
    let (coords_a, coords_b) = matching_coordinates(&kp_a, &kp_b, &matches);

    // The GSD is recomputed per pair in geometric mode: altitude drifts over
    // a pass. Legacy mode keeps the configured constant and never touches
    // the ephemeris.
    let (gsd_cm_per_px, snapshot) = match config.model {
        SpeedModel::Legacy => (config.legacy_gsd_cm_per_px, None),
        SpeedModel::Geometric => {
            let snapshot = OrbitalSnapshot::sample(orbit, t_a)?;
            (geometry.gsd_cm_per_px(snapshot.altitude_m)?, Some(snapshot))
        }
    };

    let selection = median_ground_distance(
        &coords_a,
        &coords_b,
        elapsed_s,
        gsd_cm_per_px,
        config.speed_band,
        config.on_empty,
    )?;

    let speed_kms = match snapshot {
        None => linear_speed_kms(selection.distance_px, gsd_cm_per_px, elapsed_s),
        Some(ref snap) => ground_track_speed(selection.pair, elapsed_s, snap, geometry)?,
    };

    // Sanity cross-check only; the ephemeris figure is never the answer.
    if let Ok(reference_kms) = orbit.speed_estimate_at(t_a) {
        log::info!(
            "{} -> {}: {:.4} km/s over {} matches (ephemeris says {:.4} km/s)",
            path_a.display(),
            path_b.display(),
            speed_kms,
            matches.len(),
            reference_kms
        );
    }

    Ok(PairEstimate {
        speed_kms,
        ground_distance_m: selection.distance_m,
        pixel_distance_px: selection.distance_px,
        elapsed_s,
        match_count: matches.len(),
        pair: selection.pair,
    })
}

/// Evaluates every consecutive photo pair and maintains the result artifact.
///
/// Pairs are independent, so they are mapped in parallel; statistics then
/// fold in capture order. A failed pair is logged and skipped; bad input
/// (blurry frame, broken EXIF) is not retried, the only retry axis is taking
/// another photo.
pub fn run(
    photo_paths: &[PathBuf],
    elapsed_override: Option<f64>,
    config: &EstimatorConfig,
    geometry: &GroundGeometry,
    orbit: &(dyn OrbitProvider + Sync),
    result_path: &Path,
) -> RunSummary {
    let pairs = consecutive_pairs(photo_paths);
    let results: Vec<Result<PairEstimate, SpeedError>> = pairs
        .par_iter()
        .progress_count(pairs.len() as u64)
        .map(|(a, b)| evaluate_pair(a, b, elapsed_override, config, geometry, orbit))
        .collect();

    let mut stats = RunStatistics::new();
    let mut failed = 0usize;
    for ((a, b), result) in pairs.iter().zip(results) {
        match result {
            Ok(estimate) => {
                stats.push(estimate.speed_kms);
                if let Some(best) = stats.trimmed_mean() {
                    if let Err(e) = write_result(result_path, best, stats.std_dev(), stats.len())
                    {
                        log::error!("could not write {}: {}", result_path.display(), e);
                    }
                }
            }
            Err(e) => {
                failed += 1;
                log::warn!("pair {} / {}: {}", a.display(), b.display(), e);
            }
        }
    }

    RunSummary {
        pair_count: pairs.len(),
        failed,
        speed_kms: stats.trimmed_mean(),
        std_kms: stats.std_dev(),
    }
}
