use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling::{Context as Scaler, Flags};
use ffmpeg_next::util::frame::video::Video;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

use super::pixels::packed_rgb;

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Each decoded picture is converted to packed RGB24 at its own size. If the
/// stream changes resolution midway, later frames come out at the new size
/// and it is up to the caller to decide what to do with them.
pub struct FfmpegReader {
    input: Option<Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    stream_index: usize,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self {
            input: None,
            decoder: None,
            stream_index: 0,
        }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let input = ffmpeg_next::format::input(path)?;
        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let stream_index = stream.index();
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            total_frames: stream.frames().max(0) as usize,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        log::debug!(
            "Opened {}: {}x{} @ {:.2} fps, {} ({} frames reported)",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.codec,
            metadata.total_frames
        );

        self.stream_index = stream_index;
        self.decoder = Some(decoder);
        self.input = Some(input);

        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let (Some(input), Some(decoder)) = (self.input.as_mut(), self.decoder.as_mut()) else {
            return Box::new(std::iter::once(Err("FfmpegReader: not opened".into())));
        };

        Box::new(FfmpegFrameIter {
            input,
            decoder,
            scaler: None,
            stream_index: self.stream_index,
            next_index: 0,
            eof_sent: false,
            done: false,
        })
    }

    fn close(&mut self) {
        self.decoder = None;
        self.input = None;
    }
}

/// Lazy iterator that decodes one frame at a time, so the whole video never
/// has to sit in memory.
struct FfmpegFrameIter<'a> {
    input: &'a mut Input,
    decoder: &'a mut ffmpeg_next::decoder::Video,
    scaler: Option<Scaler>,
    stream_index: usize,
    next_index: usize,
    eof_sent: bool,
    done: bool,
}

impl FfmpegFrameIter<'_> {
    fn to_frame(&mut self, decoded: &Video) -> Result<Frame, Box<dyn std::error::Error>> {
        let (format, width, height) = (decoded.format(), decoded.width(), decoded.height());

        // Rebuild the scaler whenever the decoded geometry differs from the
        // one it was created for.
        let mut scaler = match self.scaler.take() {
            Some(s)
                if s.input().format == format
                    && s.input().width == width
                    && s.input().height == height =>
            {
                s
            }
            _ => Scaler::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                Flags::BILINEAR,
            )?,
        };

        let mut rgb = Video::empty();
        let result = scaler.run(decoded, &mut rgb);
        self.scaler = Some(scaler);
        result?;

        let frame = Frame::new(packed_rgb(&rgb), width, height, 3, self.next_index);
        self.next_index += 1;
        Ok(frame)
    }
}

impl Iterator for FfmpegFrameIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            let mut decoded = Video::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return Some(self.to_frame(&decoded));
            }

            if self.eof_sent {
                self.done = true;
                return None;
            }

            match self.input.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != self.stream_index {
                        continue;
                    }
                    if let Err(e) = self.decoder.send_packet(&packet) {
                        log::debug!("Skipping undecodable packet: {e}");
                    }
                }
                None => {
                    let _ = self.decoder.send_eof();
                    self.eof_sent = true;
                }
            }
        }
    }
}
