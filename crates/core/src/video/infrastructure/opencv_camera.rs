use opencv::core::{Mat, CV_8UC3};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use crate::shared::frame::{ChannelOrder, Frame};
use crate::video::domain::camera::Camera;

/// Capture device backed by OpenCV's `VideoCapture`.
///
/// Frames come out in OpenCV's native BGR order and are tagged as such.
pub struct OpenCvCamera {
    capture: Option<VideoCapture>,
    next_index: usize,
}

impl OpenCvCamera {
    /// Opens device `index`. Returns `Ok(None)` when no usable device sits at
    /// that index.
    pub fn open(index: i32) -> Result<Option<Self>, Box<dyn std::error::Error>> {
        let capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Ok(None);
        }
        Ok(Some(Self {
            capture: Some(capture),
            next_index: 0,
        }))
    }
}

impl Camera for OpenCvCamera {
    fn grab(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(capture) = self.capture.as_mut() else {
            return Err("OpenCvCamera: already closed".into());
        };

        let mut mat = Mat::default();
        if !capture.read(&mut mat)? || mat.empty() {
            return Ok(None);
        }
        if mat.typ() != CV_8UC3 {
            return Err(format!("unsupported capture pixel type {}", mat.typ()).into());
        }

        let width = mat.cols() as u32;
        let height = mat.rows() as u32;
        let data = if mat.is_continuous() {
            mat.data_bytes()?.to_vec()
        } else {
            mat.try_clone()?.data_bytes()?.to_vec()
        };

        let frame =
            Frame::new(data, width, height, 3, self.next_index).with_channel_order(ChannelOrder::Bgr);
        self.next_index += 1;
        Ok(Some(frame))
    }

    fn close(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                log::warn!("Failed to release capture device: {e}");
            }
        }
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        self.close();
    }
}
