use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while evaluating an image pair.
///
/// All variants are terminal for the pair that produced them; a multi-pair
/// run logs them and moves on to the next pair.
#[derive(Error, Debug)]
pub enum SpeedError {
    #[error("no capture timestamp in {path}: {reason}")]
    MissingTimestamp { path: PathBuf, reason: String },

    #[error("could not load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("feature detection failed: {0}")]
    FeatureDetection(String),

    #[error("too few matches ({found} < {required}); try more features or better images")]
    InsufficientMatches { found: usize, required: usize },

    #[error(
        "no coordinate pairs remain after filtering by speed [{min_kmh}, {max_kmh}] km/h; \
         with elapsed {elapsed_s} s and GSD {gsd_cm_per_px} cm/px that band implies a pixel \
         displacement of ~[{min_px:.2}, {max_px:.2}] px; widen the band, fix units, or use \
         the unfiltered fallback policy"
    )]
    NoPlausiblePairs {
        min_kmh: f64,
        max_kmh: f64,
        elapsed_s: f64,
        gsd_cm_per_px: f64,
        min_px: f64,
        max_px: f64,
    },

    #[error("elapsed time must be > 0, got {0} s")]
    InvalidElapsedTime(f64),

    #[error("orbital data unavailable: {0}")]
    OrbitalDataUnavailable(String),

    #[error("invalid altitude {0} m (must be > 0)")]
    InvalidAltitude(f64),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
