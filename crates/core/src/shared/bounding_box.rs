/// A face box in normalized coordinates: fractions of frame width/height.
///
/// Detectors should produce values in `[0, 1]`, but nothing here relies on
/// it; out-of-range and non-finite values are handled by
/// [`NormalizedBox::to_pixel_box`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedBox {
    pub x_min: f64,
    pub y_min: f64,
    pub width: f64,
    pub height: f64,
}

/// A face box in pixel units, guaranteed to lie within the frame it was
/// computed for and to have a positive area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBox {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl NormalizedBox {
    pub fn new(x_min: f64, y_min: f64, width: f64, height: f64) -> Self {
        Self {
            x_min,
            y_min,
            width,
            height,
        }
    }

    /// Scales to pixels for a `frame_width x frame_height` frame and clamps.
    ///
    /// Scaling truncates with `floor`. The origin is clamped to zero first,
    /// then the extent is clamped against the clamped origin, so the result
    /// always satisfies `x + width <= frame_width` and
    /// `y + height <= frame_height`. Returns `None` when nothing of the box
    /// remains inside the frame.
    pub fn to_pixel_box(&self, frame_width: u32, frame_height: u32) -> Option<PixelBox> {
        let fw = i64::from(frame_width);
        let fh = i64::from(frame_height);

        let x1 = scale(self.x_min, fw)?.max(0);
        let y1 = scale(self.y_min, fh)?.max(0);
        let w = scale(self.width, fw)?.min(fw - x1);
        let h = scale(self.height, fh)?.min(fh - y1);

        if w <= 0 || h <= 0 {
            return None;
        }

        Some(PixelBox {
            x: x1 as usize,
            y: y1 as usize,
            width: w as usize,
            height: h as usize,
        })
    }
}

impl PixelBox {
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

fn scale(value: f64, extent: i64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    // Float-to-int `as` saturates, so huge values cannot overflow below.
    Some((value * extent as f64).floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_in_range_box_scales_with_floor() {
        let b = NormalizedBox::new(0.25, 0.5, 0.333, 0.1);
        let p = b.to_pixel_box(100, 50).unwrap();
        assert_eq!(
            p,
            PixelBox {
                x: 25,
                y: 25,
                width: 33,
                height: 5
            }
        );
    }

    #[test]
    fn test_extent_clamped_against_clamped_origin() {
        let b = NormalizedBox::new(0.9, 0.9, 0.3, 0.3);
        let p = b.to_pixel_box(100, 100).unwrap();
        assert_eq!(
            p,
            PixelBox {
                x: 90,
                y: 90,
                width: 10,
                height: 10
            }
        );
    }

    #[test]
    fn test_negative_origin_clamped_to_zero_without_shrinking_extent() {
        // Origin clamps first; the raw extent is then only limited by the frame.
        let b = NormalizedBox::new(-0.1, -0.2, 0.5, 0.5);
        let p = b.to_pixel_box(100, 100).unwrap();
        assert_eq!(
            p,
            PixelBox {
                x: 0,
                y: 0,
                width: 50,
                height: 50
            }
        );
    }

    #[rstest]
    #[case::right_of_frame(NormalizedBox::new(1.5, 0.1, 0.2, 0.2))]
    #[case::below_frame(NormalizedBox::new(0.1, 1.0, 0.2, 0.2))]
    #[case::zero_width(NormalizedBox::new(0.1, 0.1, 0.0, 0.2))]
    #[case::negative_height(NormalizedBox::new(0.1, 0.1, 0.2, -0.3))]
    #[case::sub_pixel_width(NormalizedBox::new(0.1, 0.1, 0.005, 0.2))]
    #[case::nan(NormalizedBox::new(f64::NAN, 0.1, 0.2, 0.2))]
    #[case::infinite(NormalizedBox::new(0.1, 0.1, f64::INFINITY, 0.2))]
    fn test_degenerate_boxes_are_skipped(#[case] b: NormalizedBox) {
        assert_eq!(b.to_pixel_box(100, 100), None);
    }

    #[test]
    fn test_clamping_invariant_over_grid() {
        let values = [-2.0, -1.0, -0.5, -0.01, 0.0, 0.01, 0.3, 0.5, 0.99, 1.0, 1.01, 1.5, 3.0];
        let sizes = [(1u32, 1u32), (1, 7), (13, 1), (100, 100), (640, 480), (33, 97)];
        for &(fw, fh) in &sizes {
            for &x in &values {
                for &y in &values {
                    for &w in &values {
                        for &h in &values {
                            let Some(p) = NormalizedBox::new(x, y, w, h).to_pixel_box(fw, fh)
                            else {
                                continue;
                            };
                            assert!(p.width > 0 && p.height > 0);
                            assert!(p.x <= fw as usize && p.y <= fh as usize);
                            assert!(p.x + p.width <= fw as usize, "{x} {w} on {fw}");
                            assert!(p.y + p.height <= fh as usize, "{y} {h} on {fh}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_huge_values_do_not_overflow() {
        let b = NormalizedBox::new(-1e300, -1e300, 1e300, 1e300);
        let p = b.to_pixel_box(64, 48).unwrap();
        assert_eq!(
            p,
            PixelBox {
                x: 0,
                y: 0,
                width: 64,
                height: 48
            }
        );
    }

    #[test]
    fn test_contains_is_half_open() {
        let p = PixelBox {
            x: 10,
            y: 20,
            width: 5,
            height: 5,
        };
        assert!(p.contains(10, 20));
        assert!(p.contains(14, 24));
        assert!(!p.contains(15, 24));
        assert!(!p.contains(14, 25));
        assert!(!p.contains(9, 20));
    }
}
