use std::time::Instant;

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::PixelBox;
use crate::shared::frame::Frame;

use super::pipeline_logger::PipelineLogger;

/// Converts detections into in-frame pixel rectangles, dropping any that
/// clamp away to nothing.
pub fn pixel_boxes(detections: &[Detection], frame_width: u32, frame_height: u32) -> Vec<PixelBox> {
    detections
        .iter()
        .filter_map(|d| d.pixel_box(frame_width, frame_height))
        .collect()
}

/// Blurs every detected face in `frame` in place and hands the frame back.
///
/// Each detection is handled independently; overlapping boxes are blurred
/// once per box. Boxes that fall entirely outside the frame are skipped.
pub fn redact<'f>(
    frame: &'f mut Frame,
    detections: &[Detection],
    blurrer: &dyn FrameBlurrer,
) -> Result<&'f mut Frame, Box<dyn std::error::Error>> {
    let regions = pixel_boxes(detections, frame.width(), frame.height());
    if !regions.is_empty() {
        blurrer.blur(frame, &regions)?;
    }
    Ok(frame)
}

/// Detect-then-blur step shared by every mode driver.
pub struct FrameRedactor {
    detector: Box<dyn FaceDetector>,
    blurrer: Box<dyn FrameBlurrer>,
}

impl FrameRedactor {
    pub fn new(detector: Box<dyn FaceDetector>, blurrer: Box<dyn FrameBlurrer>) -> Self {
        Self { detector, blurrer }
    }

    /// Runs detection on an RGB view of `frame` and blurs the results into
    /// `frame` itself, whatever its channel order. Returns the number of
    /// regions blurred.
    pub fn process(
        &mut self,
        frame: &mut Frame,
        logger: &mut dyn PipelineLogger,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let started = Instant::now();
        let detections = self.detector.detect(&frame.to_rgb())?;
        logger.timing("detect", elapsed_ms(started));

        let started = Instant::now();
        let blurred = detections
            .iter()
            .filter(|d| d.pixel_box(frame.width(), frame.height()).is_some())
            .count();
        redact(frame, &detections, self.blurrer.as_ref())?;
        logger.timing("blur", elapsed_ms(started));
        logger.metric("faces", blurred as f64);

        if blurred < detections.len() {
            log::debug!(
                "Frame {}: skipped {} detection(s) outside the frame",
                frame.index(),
                detections.len() - blurred
            );
        }
        Ok(blurred)
    }
}

pub(crate) fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
