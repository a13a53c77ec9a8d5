use std::path::{Path, PathBuf};

use glob::glob;
use image::{GrayImage, ImageReader};

use crate::error::SpeedError;

/// Loads an image and converts it to 8-bit grayscale.
pub fn load_grayscale(path: &Path) -> Result<GrayImage, SpeedError> {
    let img = ImageReader::open(path)
        .map_err(|e| SpeedError::Io {
            path: path.to_path_buf(),
            source: e,
        })?
        .decode()
        .map_err(|e| SpeedError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(img.to_luma8())
}

fn img_filter(rp: glob::GlobResult) -> Option<PathBuf> {
    if let Ok(p) = rp {
        for ext in &[".png", ".jpg", ".jpeg"] {
            if p.as_os_str().to_string_lossy().ends_with(ext) {
                return Some(p);
            }
        }
    }
    None
}

/// Finds capture files named `prefix_*.{png,jpg,jpeg}` under `dir`, sorted
/// by name. The capture script numbers photos `prefix_001.jpg`, ... so name
/// order is capture order.
pub fn discover_photos(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, SpeedError> {
    let pattern = format!("{}/{}_*", dir.display(), prefix);
    let paths =
        glob(&pattern).map_err(|e| SpeedError::Config(format!("bad photo pattern: {e}")))?;
    let mut sorted: Vec<PathBuf> = paths.filter_map(img_filter).collect();
    sorted.sort();
    log::trace!("found {} photos matching {}", sorted.len(), pattern);
    Ok(sorted)
}

/// Consecutive photo pairs in capture order.
pub fn consecutive_pairs(paths: &[PathBuf]) -> Vec<(PathBuf, PathBuf)> {
    paths
        .windows(2)
        .map(|w| (w[0].clone(), w[1].clone()))
        .collect()
}
