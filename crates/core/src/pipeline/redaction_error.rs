use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a redaction run before or while it produces output.
///
/// Anything that goes wrong inside a component (decoder, encoder, model
/// session) travels as a boxed error instead; these variants cover the
/// conditions a caller is expected to report to the user as-is.
#[derive(Error, Debug)]
pub enum RedactionError {
    #[error("--filePath is required for {mode} mode")]
    MissingFilePath { mode: &'static str },

    #[error("could not read image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("could not open video {path}: {reason}")]
    UnreadableVideo { path: PathBuf, reason: String },

    #[error("Could not read first frame")]
    EmptyVideo,

    #[error("Could not open any webcam (tried indices {tried:?})")]
    NoCamera { tried: Vec<i32> },

    #[error("webcam mode is not available in this build; enable the `webcam` feature")]
    WebcamUnsupported,

    #[error("could not create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "frame {index} is {}x{} but the output video was opened at {}x{}",
        .actual.0, .actual.1, .expected.0, .expected.1
    )]
    ResolutionChanged {
        index: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}
