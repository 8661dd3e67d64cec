use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};

use faceblur_core::blurring::infrastructure::cpu_box_blurrer::CpuBoxBlurrer;
use faceblur_core::detection::infrastructure::model_resolver::{self, ModelSource};
use faceblur_core::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use faceblur_core::pipeline::frame_redactor::FrameRedactor;
use faceblur_core::pipeline::output_dir::prepare_output_dir;
use faceblur_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use faceblur_core::pipeline::redact_image_use_case::RedactImageUseCase;
use faceblur_core::pipeline::redact_video_use_case::RedactVideoUseCase;
use faceblur_core::pipeline::redaction_error::RedactionError;
use faceblur_core::shared::constants::{
    BLAZEFACE_MODEL_NAME, IMAGE_OUTPUT_NAME, MIN_DETECTION_CONFIDENCE, OUTPUT_DIR,
    VIDEO_OUTPUT_NAME,
};
use faceblur_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use faceblur_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use faceblur_core::video::infrastructure::image_file_reader::ImageFileReader;
use faceblur_core::video::infrastructure::image_file_writer::ImageFileWriter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Blur a single image file.
    Image,
    /// Blur every frame of a video file.
    Video,
    /// Blur a live camera feed in a preview window.
    Webcam,
}

impl Mode {
    fn name(self) -> &'static str {
        match self {
            Mode::Image => "image",
            Mode::Video => "video",
            Mode::Webcam => "webcam",
        }
    }
}

/// Detect faces and blur them in images, videos or a webcam stream.
#[derive(Parser, Debug)]
#[command(name = "faceblur", version)]
struct Cli {
    /// Input source.
    #[arg(long, value_enum, default_value_t = Mode::Webcam)]
    mode: Mode,

    /// Image or video to process (required for image and video modes).
    #[arg(long = "filePath")]
    file_path: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let input = validate(&cli)?;

    let output_dir = prepare_output_dir(Path::new(OUTPUT_DIR))?;
    let redactor = build_redactor()?;
    let mut logger = StdoutPipelineLogger::default();

    match (cli.mode, input) {
        (Mode::Image, Some(input)) => {
            let output = output_dir.join(IMAGE_OUTPUT_NAME);
            let mut use_case = RedactImageUseCase::new(
                Box::new(ImageFileReader::new()),
                Box::new(ImageFileWriter::new()),
                redactor,
            );
            let report = use_case.execute(input, &output, &mut logger)?;
            logger.summary();
            log::info!("{report}");
            println!("Image saved to {}", output.display());
        }
        (Mode::Video, Some(input)) => {
            let output = output_dir.join(VIDEO_OUTPUT_NAME);
            let mut use_case = RedactVideoUseCase::new(
                Box::new(FfmpegReader::new()),
                Box::new(FfmpegWriter::new()),
                redactor,
            );
            let report = use_case.execute(input, &output, &mut logger)?;
            logger.summary();
            log::info!("{report}");
            println!("Video saved to {}", output.display());
        }
        (Mode::Webcam, _) => {
            let report = run_webcam(redactor, &mut logger)?;
            logger.summary();
            log::info!("{report}");
        }
        (mode, None) => {
            return Err(RedactionError::MissingFilePath { mode: mode.name() }.into());
        }
    }

    Ok(())
}

/// Checks the preconditions that need no I/O and returns the input path for
/// file-based modes.
fn validate(cli: &Cli) -> Result<Option<&Path>, RedactionError> {
    match cli.mode {
        Mode::Image | Mode::Video => cli
            .file_path
            .as_deref()
            .map(Some)
            .ok_or(RedactionError::MissingFilePath {
                mode: cli.mode.name(),
            }),
        Mode::Webcam if !cfg!(feature = "webcam") => Err(RedactionError::WebcamUnsupported),
        Mode::Webcam => Ok(None),
    }
}

fn build_redactor() -> Result<FrameRedactor, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {BLAZEFACE_MODEL_NAME}");
    let model_path = model_resolver::resolve(
        BLAZEFACE_MODEL_NAME,
        &ModelSource::from_env(),
        Some(Box::new(download_progress)),
    )?;

    let detector = OnnxBlazefaceDetector::new(&model_path, MIN_DETECTION_CONFIDENCE)?;
    Ok(FrameRedactor::new(
        Box::new(detector),
        Box::new(CpuBoxBlurrer::default()),
    ))
}

#[cfg(feature = "webcam")]
fn run_webcam(
    redactor: FrameRedactor,
    logger: &mut dyn PipelineLogger,
) -> Result<faceblur_core::pipeline::run_report::RunReport, Box<dyn std::error::Error>> {
    use faceblur_core::pipeline::redact_webcam_use_case::{
        open_first_available, RedactWebcamUseCase,
    };
    use faceblur_core::shared::constants::CAMERA_INDICES;
    use faceblur_core::video::infrastructure::highgui_display::HighguiDisplay;
    use faceblur_core::video::infrastructure::opencv_camera::OpenCvCamera;

    let (index, camera) = open_first_available(CAMERA_INDICES, OpenCvCamera::open)?;
    log::info!("Capturing from camera {index}");
    println!("Webcam opened successfully! Press 'q' to quit.");

    let display = HighguiDisplay::new()?;
    let mut use_case = RedactWebcamUseCase::new(Box::new(camera), Box::new(display), redactor);
    use_case.execute(logger)
}

#[cfg(not(feature = "webcam"))]
fn run_webcam(
    _redactor: FrameRedactor,
    _logger: &mut dyn PipelineLogger,
) -> Result<faceblur_core::pipeline::run_report::RunReport, Box<dyn std::error::Error>> {
    Err(RedactionError::WebcamUnsupported.into())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
