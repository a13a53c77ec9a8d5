use std::path::PathBuf;

use clap::Parser;
use ground_speed::camera::CameraConfig;
use ground_speed::config::EstimatorConfig;
use ground_speed::data_loader::discover_photos;
use ground_speed::ephemeris::StaticOrbit;
use ground_speed::geometry::GroundGeometry;
use ground_speed::io::object_from_json;
use ground_speed::pipeline::run;

#[derive(Parser)]
#[command(version, about, author)]
struct GsrsCli {
    /// path to the photo folder
    path: PathBuf,

    /// photo filename prefix (files are <prefix>_*.jpg/png)
    #[arg(long, default_value = "atlas_photo")]
    prefix: String,

    /// estimator configuration JSON (defaults used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// camera intrinsics JSON (defaults to the Astro Pi HQ camera)
    #[arg(long)]
    camera: Option<PathBuf>,

    /// static orbit JSON (altitude/position/azimuth; ISS-like defaults)
    #[arg(long)]
    orbit: Option<PathBuf>,

    /// override the elapsed time between frames in seconds (skips EXIF)
    #[arg(long)]
    elapsed: Option<f64>,

    /// result artifact path
    #[arg(long, default_value = "result.txt")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = GsrsCli::parse();

    let config: EstimatorConfig = match &cli.config {
        Some(p) => object_from_json(p)?,
        None => EstimatorConfig::default(),
    };
    config.validate()?;
    let camera: CameraConfig = match &cli.camera {
        Some(p) => object_from_json(p)?,
        None => CameraConfig::default(),
    };
    let orbit: StaticOrbit = match &cli.orbit {
        Some(p) => object_from_json(p)?,
        None => StaticOrbit::default(),
    };
    let geometry = GroundGeometry::new(camera)?;

    let photos = discover_photos(&cli.path, &cli.prefix)?;
    if photos.len() < 2 {
        return Err(format!(
            "need at least 2 photos, found {} under {}",
            photos.len(),
            cli.path.display()
        )
        .into());
    }

    let summary = run(&photos, cli.elapsed, &config, &geometry, &orbit, &cli.output);

    println!(
        "evaluated {} pairs ({} failed)",
        summary.pair_count, summary.failed
    );
    match summary.speed_kms {
        Some(speed) => println!("estimated speed: {:.4} ± {:.4} km/s", speed, summary.std_kms),
        None => println!("no pair produced an estimate"),
    }
    Ok(())
}
