use std::path::Path;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes a single frame to an image file using the `image` crate.
///
/// Frames are converted to RGB first, so BGR sources are saved with correct
/// colours.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if frame.channels() != 3 {
            return Err(format!("expected 3 channels, got {}", frame.channels()).into());
        }

        // Ensure parent directory exists (infrastructure concern)
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let rgb = frame.to_rgb().into_owned();
        let (width, height) = (rgb.width(), rgb.height());
        let img = image::RgbImage::from_raw(width, height, rgb.data().to_vec())
            .ok_or("Failed to create image from frame data")?;

        img.save(path)?;
        Ok(())
    }
}
