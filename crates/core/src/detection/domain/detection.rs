use crate::shared::bounding_box::{NormalizedBox, PixelBox};

/// One detected face in one frame. Carries no identity across frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    pub bbox: NormalizedBox,
    pub score: f32,
}

impl Detection {
    pub fn new(bbox: NormalizedBox, score: f32) -> Self {
        Self { bbox, score }
    }

    pub fn pixel_box(&self, frame_width: u32, frame_height: u32) -> Option<PixelBox> {
        self.bbox.to_pixel_box(frame_width, frame_height)
    }
}
