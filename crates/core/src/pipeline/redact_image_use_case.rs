use std::path::Path;
use std::time::Instant;

use crate::video::domain::image_reader::ImageReader;
use crate::video::domain::image_writer::ImageWriter;

use super::frame_redactor::{elapsed_ms, FrameRedactor};
use super::pipeline_logger::PipelineLogger;
use super::redaction_error::RedactionError;
use super::run_report::RunReport;

/// Single-image pipeline: read → detect → blur → write.
pub struct RedactImageUseCase {
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    redactor: FrameRedactor,
}

impl RedactImageUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        redactor: FrameRedactor,
    ) -> Self {
        Self {
            reader,
            writer,
            redactor,
        }
    }

    /// Redacts the image at `input_path` and writes it to `output_path` at
    /// the same dimensions. Nothing is written if the input cannot be read.
    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<RunReport, Box<dyn std::error::Error>> {
        let mut frame =
            self.reader
                .read(input_path)
                .map_err(|e| RedactionError::UnreadableImage {
                    path: input_path.to_path_buf(),
                    reason: e.to_string(),
                })?;

        let faces = self.redactor.process(&mut frame, logger)?;

        let started = Instant::now();
        self.writer.write(output_path, &frame)?;
        logger.timing("encode", elapsed_ms(started));

        let mut report = RunReport::default();
        report.record_frame(faces);
        logger.progress(report.frames, 1);
        Ok(report)
    }
}
