use crate::shared::bounding_box::PixelBox;
use crate::shared::frame::Frame;

/// Domain interface for blurring rectangular regions of a frame.
///
/// Implementations modify the frame in place (`&mut Frame`); only the region
/// being blurred is copied. Regions must lie within the frame.
pub trait FrameBlurrer: Send {
    fn blur(&self, frame: &mut Frame, regions: &[PixelBox])
        -> Result<(), Box<dyn std::error::Error>>;
}
