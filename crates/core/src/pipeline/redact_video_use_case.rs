use std::path::Path;
use std::time::Instant;

use crate::shared::constants::OUTPUT_FPS;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::frame_redactor::{elapsed_ms, FrameRedactor};
use super::pipeline_logger::PipelineLogger;
use super::redaction_error::RedactionError;
use super::run_report::RunReport;

type FrameResult = Result<Frame, Box<dyn std::error::Error>>;

/// Video pipeline: decode → detect → blur → encode, one frame at a time.
///
/// The output is sized from the first decoded frame and written at a fixed
/// rate, independent of the source's own rate. The writer is closed on every
/// path once it has been opened.
pub struct RedactVideoUseCase {
    reader: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
    redactor: FrameRedactor,
    output_fps: f64,
}

impl RedactVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        redactor: FrameRedactor,
    ) -> Self {
        Self {
            reader,
            writer,
            redactor,
            output_fps: OUTPUT_FPS,
        }
    }

    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<RunReport, Box<dyn std::error::Error>> {
        let source = self
            .reader
            .open(input_path)
            .map_err(|e| RedactionError::UnreadableVideo {
                path: input_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let result = pump(
            self.reader.frames(),
            self.writer.as_mut(),
            &mut self.redactor,
            logger,
            output_path,
            &VideoMetadata::for_output(0, 0, self.output_fps, source.total_frames),
        );
        self.reader.close();
        result
    }
}

/// Drives frames from `frames` through the redactor into `writer`.
///
/// `template` carries the output rate and expected frame count; its size is
/// replaced by the first frame's.
fn pump(
    mut frames: Box<dyn Iterator<Item = FrameResult> + '_>,
    writer: &mut dyn VideoWriter,
    redactor: &mut FrameRedactor,
    logger: &mut dyn PipelineLogger,
    output_path: &Path,
    template: &VideoMetadata,
) -> Result<RunReport, Box<dyn std::error::Error>> {
    let first = match frames.next() {
        Some(Ok(frame)) => frame,
        Some(Err(e)) => {
            log::debug!("First frame failed to decode: {e}");
            return Err(RedactionError::EmptyVideo.into());
        }
        None => return Err(RedactionError::EmptyVideo.into()),
    };

    let size = (first.width(), first.height());
    let output = VideoMetadata {
        width: size.0,
        height: size.1,
        ..template.clone()
    };
    writer.open(output_path, &output)?;

    let result = encode_all(first, frames, writer, redactor, logger, size, output.total_frames);
    let closed = writer.close();
    let report = result?;
    closed?;
    Ok(report)
}

fn encode_all(
    first: Frame,
    rest: Box<dyn Iterator<Item = FrameResult> + '_>,
    writer: &mut dyn VideoWriter,
    redactor: &mut FrameRedactor,
    logger: &mut dyn PipelineLogger,
    size: (u32, u32),
    total_frames: usize,
) -> Result<RunReport, Box<dyn std::error::Error>> {
    let mut report = RunReport::default();

    for item in std::iter::once(Ok(first)).chain(rest) {
        let mut frame = match item {
            Ok(frame) => frame,
            Err(e) => {
                // Treated like end of stream: everything decoded so far is kept.
                log::warn!("Stopping after {} frames: {e}", report.frames);
                break;
            }
        };

        let actual = (frame.width(), frame.height());
        if actual != size {
            return Err(RedactionError::ResolutionChanged {
                index: frame.index(),
                expected: size,
                actual,
            }
            .into());
        }

        let faces = redactor.process(&mut frame, logger)?;

        let started = Instant::now();
        writer.write(&frame)?;
        logger.timing("encode", elapsed_ms(started));

        report.record_frame(faces);
        logger.progress(report.frames, total_frames);
    }

    Ok(report)
}
