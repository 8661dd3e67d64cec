use std::cell::RefCell;

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::shared::bounding_box::PixelBox;
use crate::shared::constants::BLUR_KERNEL_SIZE;
use crate::shared::frame::Frame;

use super::box_filter;

/// CPU blurrer applying a fixed-size mean filter to each rectangular region.
///
/// Each region is copied out, filtered on its own (so pixels outside the
/// region never influence the result), and written back. Overlapping regions
/// are processed in order, so their intersection is blurred twice.
pub struct CpuBoxBlurrer {
    kernel_size: usize,
    roi_buf: RefCell<Vec<u8>>,
    sums: RefCell<Vec<u32>>,
}

impl CpuBoxBlurrer {
    pub fn new(kernel_size: usize) -> Self {
        Self {
            kernel_size,
            roi_buf: RefCell::new(Vec::new()),
            sums: RefCell::new(Vec::new()),
        }
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }
}

impl Default for CpuBoxBlurrer {
    fn default() -> Self {
        Self::new(BLUR_KERNEL_SIZE)
    }
}

impl FrameBlurrer for CpuBoxBlurrer {
    fn blur(
        &self,
        frame: &mut Frame,
        regions: &[PixelBox],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let fw = frame.width() as usize;
        let fh = frame.height() as usize;
        let channels = frame.channels() as usize;
        let data = frame.data_mut();

        let mut roi = self.roi_buf.borrow_mut();
        let mut sums = self.sums.borrow_mut();

        for &r in regions {
            if r.width == 0 || r.height == 0 {
                continue;
            }
            if r.x + r.width > fw || r.y + r.height > fh {
                return Err(format!("region {r:?} exceeds {fw}x{fh} frame").into());
            }

            box_filter::extract_roi(data, fw, channels, r, &mut roi);
            box_filter::box_blur(
                &mut roi,
                r.width,
                r.height,
                channels,
                self.kernel_size,
                &mut sums,
            );
            box_filter::write_roi_back(data, fw, channels, r, &roi);
        }

        Ok(())
    }
}
