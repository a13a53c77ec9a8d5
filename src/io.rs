use std::io::Write;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::SpeedError;

/// Serializes an object to a JSON file.
pub fn object_to_json<T: Serialize>(output_path: &Path, object: &T) -> Result<(), SpeedError> {
    let j = serde_json::to_string_pretty(object)
        .map_err(|e| SpeedError::Config(format!("serialize failed: {e}")))?;
    std::fs::write(output_path, j).map_err(|e| SpeedError::Io {
        path: output_path.to_path_buf(),
        source: e,
    })
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned>(file_path: &Path) -> Result<T, SpeedError> {
    let contents = std::fs::read_to_string(file_path).map_err(|e| SpeedError::Io {
        path: file_path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&contents)
        .map_err(|e| SpeedError::Config(format!("{}: {e}", file_path.display())))
}

/// Overwrites the plain-text result artifact with the current best estimate.
///
/// First line is the bare speed in km/s to 4 decimals; the rest is context
/// for a human reader. Overwritten after every successful pair, never
/// appended.
pub fn write_result(
    output_path: &Path,
    speed_kms: f64,
    std_kms: f64,
    pair_count: usize,
) -> Result<(), SpeedError> {
    let mut s = String::new();
    s += format!("{:.4}\n", speed_kms).as_str();
    s += format!("std dev: {:.4} km/s\n", std_kms).as_str();
    s += format!("pairs used: {}\n", pair_count).as_str();

    let mut file = std::fs::File::create(output_path).map_err(|e| SpeedError::Io {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    file.write_all(s.as_bytes()).map_err(|e| SpeedError::Io {
        path: output_path.to_path_buf(),
        source: e,
    })
}
