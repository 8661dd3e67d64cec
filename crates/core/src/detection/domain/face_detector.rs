use crate::detection::domain::detection::Detection;
use crate::shared::frame::Frame;

/// Domain interface for face detection.
///
/// Implementations expect an RGB frame and report boxes in normalized
/// coordinates, so callers can apply them to a frame of any resolution.
/// Finding no faces is `Ok(vec![])`, never an error.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}
