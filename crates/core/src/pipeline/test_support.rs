//! Stub components shared by the pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::{NormalizedBox, PixelBox};
use crate::shared::frame::{ChannelOrder, Frame};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::camera::Camera;
use crate::video::domain::frame_display::FrameDisplay;
use crate::video::domain::image_reader::ImageReader;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

type Shared<T> = Arc<Mutex<T>>;

fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// RGB frame of alternating white/black pixels: maximum local contrast, so
/// any blur shows up.
pub fn checkerboard(width: u32, height: u32) -> Frame {
    checkerboard_indexed(width, height, 0)
}

pub fn checkerboard_indexed(width: u32, height: u32, index: usize) -> Frame {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            data.extend_from_slice(&[v, v, v]);
        }
    }
    Frame::new(data, width, height, 3, index)
}

pub fn detection(x: f64, y: f64, w: f64, h: f64) -> Detection {
    Detection::new(NormalizedBox::new(x, y, w, h), 0.9)
}

// --- Detection / blurring ---

pub struct StubDetector {
    per_frame: HashMap<usize, Vec<Detection>>,
    fallback: Vec<Detection>,
    failure: Option<String>,
    pub seen_orders: Shared<Vec<ChannelOrder>>,
}

impl StubDetector {
    pub fn always(detections: Vec<Detection>) -> Self {
        Self {
            per_frame: HashMap::new(),
            fallback: detections,
            failure: None,
            seen_orders: shared(Vec::new()),
        }
    }

    pub fn per_frame(results: HashMap<usize, Vec<Detection>>) -> Self {
        Self {
            per_frame: results,
            ..Self::always(Vec::new())
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::always(Vec::new())
        }
    }
}

impl FaceDetector for StubDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        self.seen_orders.lock().unwrap().push(frame.channel_order());
        if let Some(msg) = &self.failure {
            return Err(msg.clone().into());
        }
        Ok(self
            .per_frame
            .get(&frame.index())
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// Records the regions it is asked to blur and leaves pixels alone.
pub struct RecordingBlurrer {
    pub calls: Shared<Vec<Vec<PixelBox>>>,
}

impl RecordingBlurrer {
    pub fn new() -> Self {
        Self {
            calls: shared(Vec::new()),
        }
    }
}

impl FrameBlurrer for RecordingBlurrer {
    fn blur(
        &self,
        _frame: &mut Frame,
        regions: &[PixelBox],
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.calls.lock().unwrap().push(regions.to_vec());
        Ok(())
    }
}

// --- Still images ---

pub struct StubImageReader {
    frame: Option<Frame>,
}

impl StubImageReader {
    pub fn new(frame: Frame) -> Self {
        Self { frame: Some(frame) }
    }

    pub fn unreadable() -> Self {
        Self { frame: None }
    }
}

impl ImageReader for StubImageReader {
    fn read(&self, _path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        self.frame.clone().ok_or_else(|| "corrupt image".into())
    }
}

pub struct StubImageWriter {
    pub written: Shared<Vec<(PathBuf, Frame)>>,
}

impl StubImageWriter {
    pub fn new() -> Self {
        Self {
            written: shared(Vec::new()),
        }
    }
}

impl ImageWriter for StubImageWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        self.written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), frame.clone()));
        Ok(())
    }
}

// --- Video ---

pub struct StubVideoReader {
    items: Vec<Result<Frame, String>>,
    open_error: Option<String>,
    pub closed: Shared<bool>,
}

impl StubVideoReader {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self::with_items(frames.into_iter().map(Ok).collect())
    }

    pub fn with_items(items: Vec<Result<Frame, String>>) -> Self {
        Self {
            items,
            open_error: None,
            closed: shared(false),
        }
    }

    pub fn unopenable(message: &str) -> Self {
        Self {
            open_error: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }
}

impl VideoReader for StubVideoReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        if let Some(msg) = &self.open_error {
            return Err(msg.clone().into());
        }
        let (width, height) = self
            .items
            .iter()
            .find_map(|f| f.as_ref().ok().map(|f| (f.width(), f.height())))
            .unwrap_or((0, 0));
        Ok(VideoMetadata {
            width,
            height,
            fps: 30.0,
            total_frames: self.items.len(),
            codec: "stub".to_string(),
            source_path: Some(path.to_path_buf()),
        })
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        Box::new(
            self.items
                .drain(..)
                .map(|r| r.map_err(Box::<dyn std::error::Error>::from)),
        )
    }

    fn close(&mut self) {
        *self.closed.lock().unwrap() = true;
    }
}

pub struct StubVideoWriter {
    pub opened_with: Shared<Option<(PathBuf, VideoMetadata)>>,
    pub written: Shared<Vec<Frame>>,
    pub closed: Shared<bool>,
}

impl StubVideoWriter {
    pub fn new() -> Self {
        Self {
            opened_with: shared(None),
            written: shared(Vec::new()),
            closed: shared(false),
        }
    }
}

impl VideoWriter for StubVideoWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        *self.opened_with.lock().unwrap() = Some((path.to_path_buf(), metadata.clone()));
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        self.written.lock().unwrap().push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

// --- Webcam ---

pub struct StubCamera {
    frames: VecDeque<Frame>,
    pub closed: Shared<bool>,
}

impl StubCamera {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            closed: shared(false),
        }
    }
}

impl Camera for StubCamera {
    fn grab(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        Ok(self.frames.pop_front())
    }

    fn close(&mut self) {
        *self.closed.lock().unwrap() = true;
    }
}

/// Shows frames into a shared log; reports quit after `quit_after` frames.
pub struct StubDisplay {
    quit_after: Option<usize>,
    pub shown: Shared<Vec<Frame>>,
    pub closed: Shared<bool>,
}

impl StubDisplay {
    pub fn new(quit_after: Option<usize>) -> Self {
        Self {
            quit_after,
            shown: shared(Vec::new()),
            closed: shared(false),
        }
    }
}

impl FrameDisplay for StubDisplay {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        self.shown.lock().unwrap().push(frame.clone());
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        let shown = self.shown.lock().unwrap().len();
        Ok(self.quit_after.is_some_and(|n| shown >= n))
    }

    fn close(&mut self) {
        *self.closed.lock().unwrap() = true;
    }
}
