use crate::shared::frame::Frame;

/// A live capture device yielding frames on demand.
pub trait Camera {
    /// Grabs the next frame. `Ok(None)` means the device delivered nothing,
    /// which ends a capture session.
    fn grab(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases the device. Safe to call more than once.
    fn close(&mut self);
}
