use glam::Vec2;
use image::GrayImage;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::SpeedError;

/// 256-bit BRIEF descriptor, 32 bytes.
pub type Descriptor = [u8; 32];

/// Bresenham circle of radius 3: 16 (dx, dy) offsets, clockwise from
/// 12 o'clock (Rosten's convention).
const CIRCLE_OFFSETS: [(i32, i32); 16] = [
    (0, -3), (1, -3), (2, -2), (3, -1),
    (3, 0), (3, 1), (2, 2), (1, 3),
    (0, 3), (-1, 3), (-2, 2), (-3, 1),
    (-3, 0), (-3, -1), (-2, -2), (-1, -3),
];

/// FAST-9 needs a 9-pixel contiguous arc.
const ARC_LENGTH: usize = 9;

/// Half-size of the BRIEF sampling patch.
const PATCH_RADIUS: i32 = 15;

/// Keypoints closer than this to the image edge are skipped so every
/// keypoint can host the full descriptor patch (and the FAST circle).
const BORDER: i32 = PATCH_RADIUS + 1;

/// Seed for the BRIEF sampling pattern. Fixed so detection and matching are
/// fully deterministic across runs.
const PATTERN_SEED: u64 = 0x0b5e55ed;

/// Minimum center distance between two kept keypoints.
const SUPPRESSION_RADIUS: f32 = 4.0;

/// A detected salient image point.
#[derive(Debug, Clone, Copy)]
pub struct Keypoint {
    /// Pixel coordinate.
    pub pt: Vec2,
    /// Corner strength; only used to pick the strongest `max_features`.
    pub response: f32,
}

/// An ordered keypoint-index pair with its descriptor-space distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub query_idx: usize,
    pub train_idx: usize,
    /// Hamming distance; lower is more similar.
    pub distance: u32,
}

/// ORB-style feature extractor: FAST-9 corners + unoriented BRIEF-256
/// descriptors over a 5x5 box-blurred patch.
pub struct FeatureExtractor {
    threshold: u8,
    max_features: usize,
    /// 256 precomputed (xa, ya, xb, yb) sample offsets.
    pattern: Vec<(i32, i32, i32, i32)>,
}

impl FeatureExtractor {
    /// `threshold` is the FAST intensity threshold (typical 20-40 for u8
    /// images); `max_features` caps the number of keypoints per image.
    pub fn new(threshold: u8, max_features: usize) -> Self {
        // Sample inside the patch minus the blur apron so every test pixel
        // of the blurred image is defined.
        let r = PATCH_RADIUS - 2;
        let mut rng = ChaCha8Rng::seed_from_u64(PATTERN_SEED);
        let pattern = (0..256)
            .map(|_| {
                (
                    rng.random_range(-r..=r),
                    rng.random_range(-r..=r),
                    rng.random_range(-r..=r),
                    rng.random_range(-r..=r),
                )
            })
            .collect();
        Self {
            threshold,
            max_features,
            pattern,
        }
    }

    /// Detects keypoints and computes their descriptors.
    ///
    /// Fails with [`SpeedError::FeatureDetection`] when nothing can be
    /// detected (blank or low-contrast image).
    pub fn detect_and_describe(
        &self,
        img: &GrayImage,
    ) -> Result<(Vec<Keypoint>, Vec<Descriptor>), SpeedError> {
        let keypoints = self.select_strongest(self.detect(img));
        if keypoints.is_empty() {
            return Err(SpeedError::FeatureDetection(
                "no keypoints detected (blank or low-contrast image?)".into(),
            ));
        }
        let blurred = box_blur_5x5(img);
        let descriptors = keypoints
            .iter()
            .map(|kp| self.describe(&blurred, img.width() as i32, kp))
            .collect();
        Ok((keypoints, descriptors))
    }

    /// FAST-9 corner scan with Rosten's cardinal-point quick rejection.
    fn detect(&self, img: &GrayImage) -> Vec<Keypoint> {
        let w = img.width() as i32;
        let h = img.height() as i32;
        let mut found = Vec::new();
        if w <= 2 * BORDER || h <= 2 * BORDER {
            return found;
        }
        let thresh = self.threshold as i16;
        let raw = img.as_raw();
        let at = |x: i32, y: i32| -> i16 { raw[(y * w + x) as usize] as i16 };

        for y in BORDER..h - BORDER {
            for x in BORDER..w - BORDER {
                let center = at(x, y);

                // Quick rejection: FAST-9 needs at least 2 of the 4 cardinal
                // circle points on the same side of the threshold.
                let cardinals = [0usize, 4, 8, 12].map(|i| {
                    let (dx, dy) = CIRCLE_OFFSETS[i];
                    at(x + dx, y + dy)
                });
                let bright = cardinals.iter().filter(|&&v| v > center + thresh).count();
                let dark = cardinals.iter().filter(|&&v| v < center - thresh).count();
                if bright < 2 && dark < 2 {
                    continue;
                }

                let mut ring = [0i16; 16];
                for (i, &(dx, dy)) in CIRCLE_OFFSETS.iter().enumerate() {
                    ring[i] = at(x + dx, y + dy);
                }
                if let Some(response) = fast_corner_response(center, &ring, thresh) {
                    found.push(Keypoint {
                        pt: Vec2::new(x as f32, y as f32),
                        response,
                    });
                }
            }
        }
        found
    }

    /// Greedy non-max suppression by response, then cap to `max_features`.
    ///
    /// Stable: ties in response keep raster order, so output is
    /// deterministic for identical input.
    fn select_strongest(&self, mut candidates: Vec<Keypoint>) -> Vec<Keypoint> {
        candidates.sort_by(|a, b| b.response.total_cmp(&a.response));
        let r2 = SUPPRESSION_RADIUS * SUPPRESSION_RADIUS;
        let mut kept: Vec<Keypoint> = Vec::with_capacity(self.max_features.min(candidates.len()));
        for kp in candidates {
            if kept.len() >= self.max_features {
                break;
            }
            if kept
                .iter()
                .all(|k| k.pt.distance_squared(kp.pt) >= r2)
            {
                kept.push(kp);
            }
        }
        kept
    }

    /// BRIEF-256: each bit is an intensity comparison between two blurred
    /// pixels of the patch around the keypoint.
    fn describe(&self, blurred: &[u8], width: i32, kp: &Keypoint) -> Descriptor {
        let cx = kp.pt.x as i32;
        let cy = kp.pt.y as i32;
        let at = |dx: i32, dy: i32| blurred[((cy + dy) * width + cx + dx) as usize];

        let mut desc = [0u8; 32];
        for (bit, &(xa, ya, xb, yb)) in self.pattern.iter().enumerate() {
            if at(xa, ya) < at(xb, yb) {
                desc[bit / 8] |= 1 << (bit % 8);
            }
        }
        desc
    }
}

/// Checks for a contiguous arc of `ARC_LENGTH` circle pixels all brighter or
/// all darker than `center` by more than `thresh`, using the doubled-array
/// scan to handle wrap-around. Returns the contrast-sum response when the
/// pixel is a corner.
fn fast_corner_response(center: i16, ring: &[i16; 16], thresh: i16) -> Option<f32> {
    let mut flags = [0i8; 32];
    for i in 0..16 {
        let d = ring[i] - center;
        let f = if d > thresh {
            1
        } else if d < -thresh {
            -1
        } else {
            0
        };
        flags[i] = f;
        flags[i + 16] = f;
    }

    let has_arc = |sign: i8| {
        let mut run = 0usize;
        for &f in &flags {
            if f == sign {
                run += 1;
                if run >= ARC_LENGTH {
                    return true;
                }
            } else {
                run = 0;
            }
        }
        false
    };

    if has_arc(1) || has_arc(-1) {
        let response = ring
            .iter()
            .map(|&v| ((v - center).abs() - thresh).max(0) as f32)
            .sum();
        Some(response)
    } else {
        None
    }
}

/// 5x5 box blur, separable two-pass. Pixels closer than 2 to the edge keep a
/// truncated kernel; descriptors never sample there.
fn box_blur_5x5(img: &GrayImage) -> Vec<u8> {
    let w = img.width() as i32;
    let h = img.height() as i32;
    let raw = img.as_raw();

    let mut horiz = vec![0u16; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0u16;
            let mut n = 0u16;
            for dx in -2..=2 {
                let xx = x + dx;
                if xx >= 0 && xx < w {
                    sum += raw[(y * w + xx) as usize] as u16;
                    n += 1;
                }
            }
            horiz[(y * w + x) as usize] = sum / n;
        }
    }

    let mut out = vec![0u8; (w * h) as usize];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0u16;
            let mut n = 0u16;
            for dy in -2..=2 {
                let yy = y + dy;
                if yy >= 0 && yy < h {
                    sum += horiz[(yy * w + x) as usize];
                    n += 1;
                }
            }
            out[(y * w + x) as usize] = (sum / n) as u8;
        }
    }
    out
}

/// Hamming distance between two descriptors.
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum()
}

/// Index and distance of the nearest descriptor in `pool`, first-minimum on
/// ties (deterministic).
fn nearest(query: &Descriptor, pool: &[Descriptor]) -> (usize, u32) {
    let mut best_idx = 0;
    let mut best_dist = u32::MAX;
    for (i, d) in pool.iter().enumerate() {
        let dist = hamming_distance(query, d);
        if dist < best_dist {
            best_dist = dist;
            best_idx = i;
        }
    }
    (best_idx, best_dist)
}

/// Cross-checked (mutual nearest neighbor) brute-force matching.
///
/// A match survives only if each descriptor is the other's nearest neighbor,
/// which drops many-to-one false matches. Output is sorted ascending by
/// Hamming distance; ties keep detection order (stable sort). Fewer than
/// `min_matches` results is [`SpeedError::InsufficientMatches`]; too few
/// matches make the downstream statistics unreliable.
pub fn match_features(
    descriptors_1: &[Descriptor],
    descriptors_2: &[Descriptor],
    min_matches: usize,
) -> Result<Vec<Match>, SpeedError> {
    let forward: Vec<(usize, u32)> = descriptors_1
        .iter()
        .map(|d| nearest(d, descriptors_2))
        .collect();
    let backward: Vec<usize> = descriptors_2
        .iter()
        .map(|d| nearest(d, descriptors_1).0)
        .collect();

    let mut matches: Vec<Match> = forward
        .iter()
        .enumerate()
        .filter(|&(query_idx, &(train_idx, _))| backward[train_idx] == query_idx)
        .map(|(query_idx, &(train_idx, distance))| Match {
            query_idx,
            train_idx,
            distance,
        })
        .collect();
    matches.sort_by(|a, b| a.distance.cmp(&b.distance));

    if matches.len() < min_matches {
        return Err(SpeedError::InsufficientMatches {
            found: matches.len(),
            required: min_matches,
        });
    }
    Ok(matches)
}

/// Resolves match indices to the two pixel coordinate lists the filter
/// operates on.
pub fn matching_coordinates(
    keypoints_1: &[Keypoint],
    keypoints_2: &[Keypoint],
    matches: &[Match],
) -> (Vec<Vec2>, Vec<Vec2>) {
    matches
        .iter()
        .map(|m| (keypoints_1[m.query_idx].pt, keypoints_2[m.train_idx].pt))
        .unzip()
}
