mod settings;
mod snapshot_surface;

use std::path::PathBuf;
use std::process;

use clap::Parser;

use facecheck_core::capture::domain::device::DevicePosition;
use facecheck_core::capture::infrastructure::file_camera_discovery::FileCameraDiscovery;
use facecheck_core::controller::Controller;
use facecheck_core::detection::domain::detection_result::DetectionKind;
use facecheck_core::detection::domain::vision_capability::VisionCapability;
use facecheck_core::detection::infrastructure::detector_vision::DetectorVision;
use facecheck_core::detection::infrastructure::model_resolver::ModelResolver;
use facecheck_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use facecheck_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facecheck_core::shared::constants::{FACE_MODEL_NAME, FACE_MODEL_URL};
use facecheck_core::shared::geometry::Size;

use settings::{Gravity, Settings};
use snapshot_surface::SnapshotSurface;

/// Live face and text outlines over a camera feed.
///
/// The video file stands in for the front camera and is played at its
/// native frame rate; frames arriving while detection is busy are dropped.
#[derive(Parser)]
#[command(name = "facecheck")]
struct Cli {
    /// Video file used as the front camera.
    input: PathBuf,

    /// Face detection model (ONNX). Downloaded when omitted.
    #[arg(long)]
    face_model: Option<PathBuf>,

    /// Directory of pre-packaged models, searched after the download cache.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Text detection model (ONNX). Text detection is off without one.
    #[arg(long)]
    text_model: Option<PathBuf>,

    /// Detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// View bounds the preview is fitted to, as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_view_size)]
    view_size: Option<Size>,

    /// How the video fits the view.
    #[arg(long, value_enum)]
    gravity: Option<Gravity>,

    /// Write a PNG of the overlay here after every redraw.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Store the effective options as the new defaults.
    #[arg(long)]
    save_settings: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = merge_settings(Settings::load(), &cli);
    validate(&cli, &settings)?;
    if cli.save_settings {
        settings.save();
    }

    let discovery = FileCameraDiscovery::new().with_source(cli.input.clone(), DevicePosition::Front);
    let vision = build_vision(&cli, &settings)?;
    let surface = SnapshotSurface::new(settings.snapshot_dir.clone());
    let bounds = Size::new(settings.view_width, settings.view_height);

    let mut controller = Controller::new(
        Box::new(discovery),
        vision,
        Box::new(surface),
        Box::new(StdoutPipelineLogger::default()),
        bounds,
    )
    .with_gravity(settings.gravity.into());

    controller.activate()?;

    if let Some(stats) = controller.run() {
        log::info!(
            "Done: {} frames processed, {} dropped",
            stats.delivered,
            stats.dropped
        );
    }
    Ok(())
}

/// Command-line flags win over stored settings.
fn merge_settings(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(confidence) = cli.confidence {
        settings.confidence = confidence;
    }
    if let Some(size) = cli.view_size {
        settings.view_width = size.width;
        settings.view_height = size.height;
    }
    if let Some(gravity) = cli.gravity {
        settings.gravity = gravity;
    }
    if cli.text_model.is_some() {
        settings.text_model = cli.text_model.clone();
    }
    if cli.snapshot_dir.is_some() {
        settings.snapshot_dir = cli.snapshot_dir.clone();
    }
    settings
}

fn build_vision(
    cli: &Cli,
    settings: &Settings,
) -> Result<Box<dyn VisionCapability>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {FACE_MODEL_NAME}");
    let resolver = with_model_dir(ModelResolver::platform()?, cli);
    let face_model = resolver.resolve(
        FACE_MODEL_NAME,
        FACE_MODEL_URL,
        cli.face_model.as_deref(),
        Some(Box::new(download_progress)),
    )?;

    let mut vision = DetectorVision::new().with_detector(
        DetectionKind::FaceLandmarks,
        Box::new(OnnxYoloDetector::new(&face_model, settings.confidence)?),
    );

    match &settings.text_model {
        Some(path) => {
            vision = vision.with_detector(
                DetectionKind::TextRectangles,
                Box::new(OnnxYoloDetector::new(path, settings.confidence)?),
            );
        }
        None => log::info!("No text model given, text detection disabled"),
    }

    Ok(Box::new(vision))
}

fn with_model_dir(resolver: ModelResolver, cli: &Cli) -> ModelResolver {
    match &cli.model_dir {
        Some(dir) => resolver.with_bundled_dir(dir),
        None => resolver,
    }
}

fn validate(cli: &Cli, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !(0.0..=1.0).contains(&settings.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            settings.confidence
        )
        .into());
    }
    if let Some(path) = &settings.text_model {
        if !path.is_file() {
            return Err(format!("Text model not found: {}", path.display()).into());
        }
    }
    Ok(())
}

fn parse_view_size(value: &str) -> Result<Size, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| *v > 0.0)
            .ok_or_else(|| format!("invalid dimension '{s}' in '{value}'"))
    };
    Ok(Size::new(parse(width)?, parse(height)?))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
