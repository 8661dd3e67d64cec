use std::time::Instant;

use crate::video::domain::camera::Camera;
use crate::video::domain::frame_display::FrameDisplay;

use super::frame_redactor::{elapsed_ms, FrameRedactor};
use super::pipeline_logger::PipelineLogger;
use super::redaction_error::RedactionError;
use super::run_report::RunReport;

/// Tries each device index in order and returns the first that opens.
///
/// `open` returns `Ok(None)` for an index with no usable device; errors are
/// logged and treated the same way.
pub fn open_first_available<C>(
    indices: &[i32],
    mut open: impl FnMut(i32) -> Result<Option<C>, Box<dyn std::error::Error>>,
) -> Result<(i32, C), RedactionError> {
    for (attempt, &index) in indices.iter().enumerate() {
        match open(index) {
            Ok(Some(camera)) => {
                if attempt > 0 {
                    log::info!("Using camera {index} instead");
                }
                return Ok((index, camera));
            }
            Ok(None) => log::warn!("Camera {index} is not available"),
            Err(e) => log::warn!("Camera {index} failed to open: {e}"),
        }
    }
    Err(RedactionError::NoCamera {
        tried: indices.to_vec(),
    })
}

/// Live pipeline: grab → detect → blur → show, until the quit key is pressed
/// or the camera stops delivering frames. Nothing is written to disk.
pub struct RedactWebcamUseCase {
    camera: Box<dyn Camera>,
    display: Box<dyn FrameDisplay>,
    redactor: FrameRedactor,
}

impl RedactWebcamUseCase {
    pub fn new(
        camera: Box<dyn Camera>,
        display: Box<dyn FrameDisplay>,
        redactor: FrameRedactor,
    ) -> Self {
        Self {
            camera,
            display,
            redactor,
        }
    }

    /// Runs the capture loop. Camera and window are released on every exit
    /// path.
    pub fn execute(
        &mut self,
        logger: &mut dyn PipelineLogger,
    ) -> Result<RunReport, Box<dyn std::error::Error>> {
        let result = self.run_loop(logger);
        self.camera.close();
        self.display.close();
        result
    }

    fn run_loop(
        &mut self,
        logger: &mut dyn PipelineLogger,
    ) -> Result<RunReport, Box<dyn std::error::Error>> {
        let mut report = RunReport::default();

        loop {
            let mut frame = match self.camera.grab() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::warn!("Failed to grab frame");
                    break;
                }
                Err(e) => {
                    log::warn!("Failed to grab frame: {e}");
                    break;
                }
            };

            let faces = self.redactor.process(&mut frame, logger)?;

            let started = Instant::now();
            self.display.show(&frame)?;
            logger.timing("display", elapsed_ms(started));

            report.record_frame(faces);
            logger.progress(report.frames, 0);

            if self.display.quit_requested()? {
                log::info!("Quit key pressed");
                break;
            }
        }

        Ok(report)
    }
}
