use opencv::core::{Mat, Scalar, CV_8UC3};
use opencv::highgui;
use opencv::prelude::*;

use crate::shared::constants::{KEY_POLL_TIMEOUT_MS, QUIT_KEY, WINDOW_TITLE};
use crate::shared::frame::{ChannelOrder, Frame};
use crate::video::domain::frame_display::FrameDisplay;

/// On-screen preview window using OpenCV's highgui.
pub struct HighguiDisplay {
    title: String,
    open: bool,
}

impl HighguiDisplay {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_title(WINDOW_TITLE)
    }

    pub fn with_title(title: &str) -> Result<Self, Box<dyn std::error::Error>> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self {
            title: title.to_string(),
            open: true,
        })
    }
}

impl FrameDisplay for HighguiDisplay {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if frame.channels() != 3 {
            return Err(format!("cannot display {}-channel frame", frame.channels()).into());
        }
        let bgr = frame.to_order(ChannelOrder::Bgr);

        let mut mat = Mat::new_rows_cols_with_default(
            frame.height() as i32,
            frame.width() as i32,
            CV_8UC3,
            Scalar::all(0.0),
        )?;
        mat.data_bytes_mut()?.copy_from_slice(bgr.data());

        highgui::imshow(&self.title, &mat)?;
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        let key = highgui::wait_key(KEY_POLL_TIMEOUT_MS)?;
        Ok(key >= 0 && (key & 0xFF) == QUIT_KEY as i32)
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = highgui::destroy_all_windows() {
            log::warn!("Failed to close preview window: {e}");
        }
    }
}

impl Drop for HighguiDisplay {
    fn drop(&mut self) {
        self.close();
    }
}
