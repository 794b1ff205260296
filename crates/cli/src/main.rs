use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use clap::Parser;

use facestream_core::capture::capture_faces_use_case::CaptureFacesUseCase;
use facestream_core::capture::capture_request::CaptureRequest;
use facestream_core::detection::infrastructure::detector_factory::create_detector;
use facestream_core::detection::infrastructure::model_resolver;
use facestream_core::pipeline::infrastructure::threaded_stream_runner::{
    PipelineCommand, ThreadedStreamRunner,
};
use facestream_core::pipeline::stream_faces_use_case::{system_clock, StreamFacesUseCase};
use facestream_core::shared::constants::{FACE_MODEL_NAME, FACE_MODEL_URL};
use facestream_core::shared::snapshot::SnapshotStore;
use facestream_core::streaming::domain::event_publisher::EventPublisher;
use facestream_core::streaming::domain::quality::{QualityController, QualityLevel};
use facestream_core::streaming::infrastructure::annotating_jpeg_encoder::AnnotatingJpegEncoder;
use facestream_core::streaming::infrastructure::json_line_publisher::JsonLinePublisher;
use facestream_core::video::domain::image_writer::ImageWriter;
use facestream_core::video::infrastructure::image_dir_source::ImageDirSource;
use facestream_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Streaming face detection with live quality control and captures.
#[derive(Parser)]
#[command(name = "facestream")]
struct Cli {
    /// Directory of image frames to stream, in sorted order.
    input: PathBuf,

    /// Face detection model file (resolved from the cache or downloaded
    /// when omitted).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Skip the learned model entirely and use the cascade detector.
    #[arg(long)]
    no_model: bool,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value = "0.7")]
    confidence: f64,

    /// Stream quality: low, medium or high.
    #[arg(long, default_value = "medium")]
    quality: String,

    /// Directory for on-demand capture artifacts.
    #[arg(long, default_value = "captures")]
    capture_dir: PathBuf,
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
    validate(&cli)?;

    let model_path = resolve_model(&cli);
    let detector = create_detector(model_path.as_deref(), cli.confidence);

    let source = ImageDirSource::open(&cli.input)?;
    let publisher: Box<dyn EventPublisher> = Box::new(JsonLinePublisher::new(io::stdout()));
    let image_writer: Box<dyn ImageWriter> = Box::new(ImageFileWriter::new());

    let snapshots = Arc::new(SnapshotStore::new());
    let quality = Arc::new(QualityController::new(QualityLevel::from_name(&cli.quality)));
    let stop = Arc::new(AtomicBool::new(false));

    let stream = StreamFacesUseCase::new(
        Box::new(source),
        detector,
        Box::new(AnnotatingJpegEncoder::new()),
        publisher,
        snapshots.clone(),
        quality.clone(),
        stop.clone(),
        system_clock(),
    );
    let capture = CaptureFacesUseCase::new(snapshots, image_writer, cli.capture_dir);

    let (tx, rx) = crossbeam_channel::bounded(16);
    spawn_command_reader(tx);

    let runner = ThreadedStreamRunner::new(quality, stop);
    runner.run(stream, capture, rx)
}

/// Reads control commands from stdin, one per line, until EOF or quit.
///
/// Recognized commands: `quality <low|medium|high>`, `capture all`,
/// `capture <n>`, `quit`. Unknown input is logged and skipped.
fn spawn_command_reader(tx: crossbeam_channel::Sender<PipelineCommand>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => break,
            };
            let command = match parse_command(&line) {
                Some(command) => command,
                None => {
                    log::warn!("Unrecognized command: {line}");
                    continue;
                }
            };
            let is_shutdown = matches!(command, PipelineCommand::Shutdown);
            if tx.send(command).is_err() || is_shutdown {
                break;
            }
        }
        // EOF: the channel disconnects and the runner shuts down
    });
}

fn parse_command(line: &str) -> Option<PipelineCommand> {
    let mut parts = line.split_whitespace();
    match (parts.next()?, parts.next(), parts.next()) {
        ("quit", None, None) => Some(PipelineCommand::Shutdown),
        ("quality", Some(level), None) => Some(PipelineCommand::SetQuality(level.to_string())),
        ("capture", Some("all"), None) => Some(PipelineCommand::Capture(CaptureRequest::All)),
        ("capture", Some(n), None) => n
            .parse::<usize>()
            .ok()
            .map(|n| PipelineCommand::Capture(CaptureRequest::Face(n))),
        _ => None,
    }
}

fn resolve_model(cli: &Cli) -> Option<PathBuf> {
    if cli.no_model {
        return None;
    }
    if let Some(ref path) = cli.model {
        return Some(path.clone());
    }
    log::info!("Resolving model: {FACE_MODEL_NAME}");
    match model_resolver::resolve(FACE_MODEL_NAME, FACE_MODEL_URL, None) {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("Model resolution failed ({e}), continuing without a model");
            None
        }
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.is_dir() {
        return Err(format!("Input directory not found: {}", cli.input.display()).into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    let valid_qualities = ["low", "medium", "high"];
    if !valid_qualities.contains(&cli.quality.as_str()) {
        return Err(format!(
            "Quality must be one of: low, medium, high, got '{}'",
            cli.quality
        )
        .into());
    }
    if let Some(ref model) = cli.model {
        if !model.exists() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    Ok(())
}
