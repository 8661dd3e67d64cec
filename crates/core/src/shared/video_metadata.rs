use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Frame count reported by the container; 0 when unknown.
    pub total_frames: usize,
    /// Decoder name when read, encoder name when writing.
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Metadata for the redacted output: sized from the first decoded frame,
    /// encoded at the fixed output rate.
    pub fn for_output(width: u32, height: u32, fps: f64, total_frames: usize) -> Self {
        Self {
            width,
            height,
            fps,
            total_frames,
            codec: "mpeg4".to_string(),
            source_path: None,
        }
    }
}
