//! Face detection and box-blur redaction for still images, video files and
//! live camera streams.

pub mod blurring;
pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod video;
