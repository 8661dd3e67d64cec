use std::borrow::Cow;

use ndarray::ArrayView3;

/// Byte order of the three colour channels within each pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// A single video/image frame: contiguous 8-bit pixels in row-major order.
///
/// Decoders produce RGB; capture devices may hand over BGR. Sources tag the
/// order once and consumers that care (the detector, encoders, displays)
/// convert at their boundary with [`Frame::to_order`].
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
    order: ChannelOrder,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
            order: ChannelOrder::Rgb,
        }
    }

    pub fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    /// Returns the frame in the requested channel order, borrowing when no
    /// reordering is needed.
    pub fn to_order(&self, order: ChannelOrder) -> Cow<'_, Frame> {
        if self.order == order || self.channels < 3 {
            return Cow::Borrowed(self);
        }
        let mut swapped = self.clone();
        for px in swapped.data.chunks_exact_mut(self.channels as usize) {
            px.swap(0, 2);
        }
        swapped.order = order;
        Cow::Owned(swapped)
    }

    pub fn to_rgb(&self) -> Cow<'_, Frame> {
        self.to_order(ChannelOrder::Rgb)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
