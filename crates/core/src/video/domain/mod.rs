pub mod camera;
pub mod frame_display;
pub mod image_reader;
pub mod image_writer;
pub mod video_reader;
pub mod video_writer;
