use std::path::Path;

use clap::{Parser, Subcommand};
use image::{GrayImage, Luma};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic photo pair related by a pure translation
    Generate {
        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Image width
        #[arg(long, default_value = "640")]
        width: u32,

        /// Image height
        #[arg(long, default_value = "480")]
        height: u32,

        /// Ground-track shift between the two frames, pixels (x)
        #[arg(long, default_value = "12", allow_hyphen_values = true)]
        dx: i32,

        /// Shift in y, pixels
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dy: i32,

        /// RNG seed for the synthetic terrain
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            output,
            width,
            height,
            dx,
            dy,
            seed,
        } => generate_pair(&output, width, height, dx, dy, seed),
    }
}

/// Renders a blobby seeded "terrain" canvas larger than the output frame,
/// then crops two views offset by (dx, dy), which is what a nadir camera sees when
/// the platform translates between exposures.
fn generate_pair(
    output_dir: &str,
    width: u32,
    height: u32,
    dx: i32,
    dy: i32,
    seed: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    use std::fs;

    fs::create_dir_all(output_dir)?;

    let margin_x = dx.unsigned_abs();
    let margin_y = dy.unsigned_abs();
    let canvas_w = width + margin_x;
    let canvas_h = height + margin_y;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut canvas = GrayImage::from_pixel(canvas_w, canvas_h, Luma([90u8]));

    // Scatter bright and dark discs of mixed scale to give the detector
    // something to bite on.
    let blobs = (canvas_w * canvas_h / 600).max(64);
    for _ in 0..blobs {
        let cx = rng.random_range(0..canvas_w) as i32;
        let cy = rng.random_range(0..canvas_h) as i32;
        let r = rng.random_range(2..14) as i32;
        let val: u8 = rng.random_range(0..=255);
        for y in (cy - r).max(0)..(cy + r).min(canvas_h as i32) {
            for x in (cx - r).max(0)..(cx + r).min(canvas_w as i32) {
                let ddx = x - cx;
                let ddy = y - cy;
                if ddx * ddx + ddy * ddy <= r * r {
                    canvas.put_pixel(x as u32, y as u32, Luma([val]));
                }
            }
        }
    }

    let crop = |ox: u32, oy: u32| -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| *canvas.get_pixel(x + ox, y + oy))
    };

    let (ox1, ox2) = if dx >= 0 { (0, margin_x) } else { (margin_x, 0) };
    let (oy1, oy2) = if dy >= 0 { (0, margin_y) } else { (margin_y, 0) };

    let frame_1 = crop(ox1, oy1);
    let frame_2 = crop(ox2, oy2);

    let path_1 = Path::new(output_dir).join("atlas_photo_001.png");
    let path_2 = Path::new(output_dir).join("atlas_photo_002.png");
    frame_1.save(&path_1)?;
    frame_2.save(&path_2)?;

    let truth = serde_json::json!({
        "dx_px": dx,
        "dy_px": dy,
        "seed": seed,
        "note": "frame 2 content = frame 1 content shifted by (-dx, -dy)",
    });
    fs::write(
        Path::new(output_dir).join("ground_truth.json"),
        serde_json::to_string_pretty(&truth)?,
    )?;

    println!(
        "wrote {} and {} (shift {},{} px)",
        path_1.display(),
        path_2.display(),
        dx,
        dy
    );
    Ok(())
}
