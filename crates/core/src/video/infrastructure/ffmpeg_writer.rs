use std::path::Path;

use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling::{Context as Scaler, Flags};
use ffmpeg_next::util::frame::video::Video;
use ffmpeg_next::Rational;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

use super::pixels::fill_rgb;

/// Index of the single video stream in the output container.
const STREAM_INDEX: usize = 0;

/// Encodes frames via ffmpeg-next with the encoder named in the metadata
/// passed to `open` (`mpeg4`, MPEG-4 Part 2, for redacted output).
///
/// Output is video-only at a constant rate taken from the metadata passed to
/// `open`; the source's own timing and audio are not carried over. Frames are
/// converted to RGB before encoding, whatever their channel order. Dropping
/// an open writer finalizes the file.
pub struct FfmpegWriter {
    state: Option<EncodeState>,
}

struct EncodeState {
    octx: Output,
    encoder: ffmpeg_next::codec::encoder::video::Encoder,
    scaler: Scaler,
    width: u32,
    height: u32,
    encoder_time_base: Rational,
    stream_time_base: Rational,
    frame_count: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self { state: None }
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Rounds to a whole frame rate; non-positive rates cannot be encoded.
fn whole_fps(fps: f64) -> Result<i32, Box<dyn std::error::Error>> {
    let rounded = fps.round();
    if !rounded.is_finite() || rounded < 1.0 {
        return Err(format!("cannot encode at {fps} fps").into());
    }
    Ok(rounded as i32)
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.state.is_some() {
            return Err("FfmpegWriter: already open".into());
        }
        ffmpeg_next::init()?;

        let fps = whole_fps(metadata.fps)?;
        let encoder_time_base = Rational(1, fps);

        let codec = ffmpeg_next::encoder::find_by_name(&metadata.codec)
            .ok_or_else(|| format!("{} encoder not found", metadata.codec))?;

        let mut octx = ffmpeg_next::format::output(path)?;
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;
        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(Pixel::YUV420P);
        encoder_ctx.set_time_base(encoder_time_base);
        encoder_ctx.set_frame_rate(Some(Rational(fps, 1)));
        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);
        ost.set_time_base(encoder_time_base);

        octx.write_header()?;
        // The muxer may pick its own stream time base while writing the header.
        let stream_time_base = octx
            .stream(STREAM_INDEX)
            .ok_or("output stream missing after header")?
            .time_base();

        let scaler = Scaler::get(
            Pixel::RGB24,
            metadata.width,
            metadata.height,
            Pixel::YUV420P,
            metadata.width,
            metadata.height,
            Flags::BILINEAR,
        )?;

        log::debug!(
            "Encoding {} at {}x{}, {fps} fps",
            path.display(),
            metadata.width,
            metadata.height
        );

        self.state = Some(EncodeState {
            octx,
            encoder,
            scaler,
            width: metadata.width,
            height: metadata.height,
            encoder_time_base,
            stream_time_base,
            frame_count: 0,
        });
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let state = self.state.as_mut().ok_or("FfmpegWriter: not opened")?;

        if frame.width() != state.width || frame.height() != state.height {
            return Err(format!(
                "frame is {}x{} but the encoder was opened at {}x{}",
                frame.width(),
                frame.height(),
                state.width,
                state.height
            )
            .into());
        }

        let rgb = frame.to_rgb();
        let mut rgb_frame = Video::new(Pixel::RGB24, state.width, state.height);
        fill_rgb(&mut rgb_frame, rgb.data());

        let mut yuv_frame = Video::empty();
        state.scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(state.frame_count as i64));

        state.encoder.send_frame(&yuv_frame)?;
        state.drain_packets()?;

        state.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(mut state) = self.state.take() else {
            return Ok(());
        };
        state.encoder.send_eof()?;
        state.drain_packets()?;
        state.octx.write_trailer()?;
        log::debug!("Encoder finished after {} frames", state.frame_count);
        Ok(())
    }
}

impl EncodeState {
    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let mut encoded = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(STREAM_INDEX);
            encoded.rescale_ts(self.encoder_time_base, self.stream_time_base);
            encoded.write_interleaved(&mut self.octx)?;
        }
        Ok(())
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        if self.state.is_some() {
            if let Err(e) = self.close() {
                log::warn!("Failed to finalize video output: {e}");
            }
        }
    }
}
