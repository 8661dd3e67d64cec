//! Copies between tightly packed RGB24 buffers and ffmpeg frames, whose rows
//! may carry trailing padding (`stride > width * 3`).

use ffmpeg_next::util::frame::video::Video;

const RGB24_BYTES_PER_PIXEL: usize = 3;

/// Strips row padding from an RGB24 ffmpeg frame.
pub fn packed_rgb(src: &Video) -> Vec<u8> {
    let stride = src.stride(0);
    let data = src.data(0);
    let row_len = src.width() as usize * RGB24_BYTES_PER_PIXEL;
    let rows = src.height() as usize;

    let mut pixels = Vec::with_capacity(row_len * rows);
    for row in 0..rows {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_len]);
    }
    pixels
}

/// Copies a packed RGB24 buffer into an ffmpeg frame of the same size.
pub fn fill_rgb(dst: &mut Video, pixels: &[u8]) {
    let stride = dst.stride(0);
    let row_len = dst.width() as usize * RGB24_BYTES_PER_PIXEL;
    let rows = dst.height() as usize;
    let data = dst.data_mut(0);

    for row in 0..rows {
        let src_start = row * row_len;
        let dst_start = row * stride;
        data[dst_start..dst_start + row_len]
            .copy_from_slice(&pixels[src_start..src_start + row_len]);
    }
}
