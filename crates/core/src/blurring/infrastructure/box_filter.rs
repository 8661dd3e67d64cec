use crate::shared::bounding_box::PixelBox;

/// Map an out-of-range index back into `[0, len)` by mirroring around the
/// edge pixels without repeating them (`dcb|abcd|cba`).
///
/// Kernels wider than the image reflect repeatedly until they land inside.
pub fn reflect_101(mut i: isize, len: usize) -> usize {
    let n = len as isize;
    if n == 1 {
        return 0;
    }
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

/// Normalized box filter (mean filter) of a `kernel_size x kernel_size`
/// window, applied in place to each channel independently.
///
/// The anchor is the kernel centre, `kernel_size / 2`; for an even kernel the
/// window around `x` therefore spans `x - k/2 ..= x + k/2 - 1`. Borders use
/// reflect-101 extension, so only `data` itself is ever read. The filter is
/// separable: a horizontal pass of integer row sums into `temp`, then a
/// vertical pass that divides by the window area with round-half-up.
/// OpenCV's 8-bit box filter divides in fixed point instead, so results that
/// land exactly on `.5` may differ from it by one level.
pub fn box_blur(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel_size: usize,
    temp: &mut Vec<u32>,
) {
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let anchor = (kernel_size / 2) as isize;
    let area = (kernel_size * kernel_size) as u32;

    let needed = width * height * channels;
    temp.clear();
    temp.resize(needed, 0);

    // Horizontal pass: data → temp (row sums)
    for y in 0..height {
        let row = y * width;
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0u32;
                for k in 0..kernel_size as isize {
                    let sx = reflect_101(x as isize + k - anchor, width);
                    sum += data[(row + sx) * channels + c] as u32;
                }
                temp[(row + x) * channels + c] = sum;
            }
        }
    }

    // Vertical pass: temp → data (window sums / area)
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0u32;
                for k in 0..kernel_size as isize {
                    let sy = reflect_101(y as isize + k - anchor, height);
                    sum += temp[(sy * width + x) * channels + c];
                }
                data[(y * width + x) * channels + c] = ((sum + area / 2) / area).min(255) as u8;
            }
        }
    }
}

/// Copy a rectangular region out of frame data into a reusable buffer.
pub fn extract_roi(
    data: &[u8],
    frame_width: usize,
    channels: usize,
    rect: PixelBox,
    roi: &mut Vec<u8>,
) {
    let row_len = rect.width * channels;
    roi.clear();
    roi.resize(rect.height * row_len, 0);
    for row in 0..rect.height {
        let src_offset = ((rect.y + row) * frame_width + rect.x) * channels;
        let dst_offset = row * row_len;
        roi[dst_offset..dst_offset + row_len]
            .copy_from_slice(&data[src_offset..src_offset + row_len]);
    }
}

/// Write a region buffer back into frame data at its original position.
pub fn write_roi_back(
    data: &mut [u8],
    frame_width: usize,
    channels: usize,
    rect: PixelBox,
    roi: &[u8],
) {
    let row_len = rect.width * channels;
    for row in 0..rect.height {
        let dst_offset = ((rect.y + row) * frame_width + rect.x) * channels;
        let src_offset = row * row_len;
        data[dst_offset..dst_offset + row_len]
            .copy_from_slice(&roi[src_offset..src_offset + row_len]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn blur(data: &mut [u8], w: usize, h: usize, c: usize, k: usize) {
        let mut temp = Vec::new();
        box_blur(data, w, h, c, k, &mut temp);
    }

    #[rstest]
    #[case::inside(3, 5, 3)]
    #[case::left_once(-1, 5, 1)]
    #[case::left_twice(-2, 5, 2)]
    #[case::right_once(5, 5, 3)]
    #[case::right_twice(6, 5, 2)]
    #[case::wraps_past_both_edges(-7, 3, 1)]
    #[case::single_pixel(-9, 1, 0)]
    fn test_reflect_101(#[case] i: isize, #[case] len: usize, #[case] expected: usize) {
        assert_eq!(reflect_101(i, len), expected);
    }

    #[test]
    fn test_reflect_101_always_in_range() {
        for len in 1..8 {
            for i in -40..40 {
                assert!(reflect_101(i, len) < len);
            }
        }
    }

    #[test]
    fn test_uniform_input_unchanged() {
        let mut data = vec![77u8; 12 * 9 * 3];
        blur(&mut data, 12, 9, 3, 30);
        assert!(data.iter().all(|&v| v == 77));
    }

    #[test]
    fn test_kernel_one_is_noop() {
        let mut data: Vec<u8> = (0..48).collect();
        let original = data.clone();
        blur(&mut data, 4, 4, 3, 1);
        assert_eq!(data, original);
    }

    #[test]
    fn test_mean_of_3x3_window() {
        // Single channel 3x3 with a bright centre; k=3 window at the centre
        // covers the whole image.
        let mut data = vec![0, 0, 0, 0, 90, 0, 0, 0, 0];
        blur(&mut data, 3, 3, 1, 3);
        assert_eq!(data[4], 10);
    }

    #[test]
    fn test_exact_half_rounds_up() {
        // Every 2x2 window holds 1+1+0+0: a mean of exactly 0.5.
        let mut data = vec![1, 1, 0, 0];
        blur(&mut data, 2, 2, 1, 2);
        assert_eq!(data, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_even_kernel_window_is_offset_left() {
        // 1-row image, k=2: anchor 1, window covers [x-1, x].
        // Column -1 reflects to column 1, so x=0 still sees the bright pixel
        // while x=3 does not.
        let mut data = vec![0, 100, 0, 0];
        blur(&mut data, 4, 1, 1, 2);
        assert_eq!(data, vec![50, 50, 50, 0]);
    }

    #[test]
    fn test_channels_blurred_independently() {
        // Channel 0 is a step edge, channel 1 is constant.
        let (w, h) = (10, 4);
        let mut data = vec![0u8; w * h * 2];
        for y in 0..h {
            for x in 0..w {
                data[(y * w + x) * 2] = if x < 5 { 0 } else { 200 };
                data[(y * w + x) * 2 + 1] = 40;
            }
        }
        blur(&mut data, w, h, 2, 3);
        for px in data.chunks_exact(2) {
            assert_eq!(px[1], 40);
        }
        assert!(data[4 * 2] > 0 && data[4 * 2] < 200);
    }

    #[test]
    fn test_extract_and_write_back_round_trip() {
        let (fw, fh, c) = (6, 5, 3);
        let data: Vec<u8> = (0..(fw * fh * c) as u32).map(|v| v as u8).collect();
        let rect = PixelBox {
            x: 1,
            y: 2,
            width: 3,
            height: 2,
        };

        let mut roi = Vec::new();
        extract_roi(&data, fw, c, rect, &mut roi);
        assert_eq!(roi.len(), 3 * 2 * c);
        assert_eq!(&roi[0..3], &data[(2 * fw + 1) * c..(2 * fw + 1) * c + 3]);

        let mut target = vec![0u8; fw * fh * c];
        write_roi_back(&mut target, fw, c, rect, &roi);
        for y in 0..fh {
            for x in 0..fw {
                let i = (y * fw + x) * c;
                let inside = x >= 1 && x < 4 && y >= 2 && y < 4;
                let expected = if inside { data[i] } else { 0 };
                assert_eq!(target[i], expected, "pixel ({x},{y})");
            }
        }
    }
}
