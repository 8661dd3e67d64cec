use crate::shared::frame::Frame;

/// An interactive window that shows frames and reports the quit key.
pub trait FrameDisplay {
    fn show(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Polls the keyboard briefly; returns `true` once the quit key was hit.
    fn quit_requested(&mut self) -> Result<bool, Box<dyn std::error::Error>>;

    /// Destroys all windows. Safe to call more than once.
    fn close(&mut self);
}
