/// Side length of the square mean-filter kernel applied to each face.
pub const BLUR_KERNEL_SIZE: usize = 30;

/// Detections scoring below this are discarded by the detector.
pub const MIN_DETECTION_CONFIDENCE: f64 = 0.5;

/// Short-range BlazeFace: the fastest, lowest-accuracy variant.
pub const BLAZEFACE_MODEL_NAME: &str = "blazeface_short_range.onnx";

/// Directory searched before the user cache when resolving the model.
pub const MODEL_DIR_ENV: &str = "FACEBLUR_MODEL_DIR";

/// Optional download location used when the model is not found locally.
pub const MODEL_URL_ENV: &str = "FACEBLUR_MODEL_URL";

/// Download location pinned when the binary was built (the same variable in
/// the build environment). A non-empty runtime `FACEBLUR_MODEL_URL` wins.
pub const BLAZEFACE_MODEL_URL: Option<&str> = option_env!("FACEBLUR_MODEL_URL");

/// Directory next to the executable that packaged installs ship models in.
pub const BUNDLED_MODELS_DIR: &str = "models";

pub const OUTPUT_DIR: &str = "./output";
pub const IMAGE_OUTPUT_NAME: &str = "output.png";
pub const VIDEO_OUTPUT_NAME: &str = "output.mp4";

/// Frame rate of the redacted video, independent of the source rate.
pub const OUTPUT_FPS: f64 = 25.0;

/// Video progress is reported every this many frames.
pub const PROGRESS_INTERVAL_FRAMES: usize = 30;

/// Capture devices tried in order for webcam mode.
pub const CAMERA_INDICES: &[i32] = &[0, 1];

pub const WINDOW_TITLE: &str = "Face Blur - Press Q to quit";
pub const QUIT_KEY: char = 'q';
pub const KEY_POLL_TIMEOUT_MS: i32 = 1;
