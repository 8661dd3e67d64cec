pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
#[cfg(feature = "webcam")]
pub mod highgui_display;
pub mod image_file_reader;
pub mod image_file_writer;
#[cfg(feature = "webcam")]
pub mod opencv_camera;
mod pixels;
