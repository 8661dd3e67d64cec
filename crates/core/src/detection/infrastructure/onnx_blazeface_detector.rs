//! BlazeFace face detector using ONNX Runtime via `ort`.
//!
//! Runs the short-range (128x128) model: the fastest and least accurate
//! BlazeFace variant, picked for real-time camera use. Produces normalized
//! boxes only; clamping to the frame is left to the caller.
use std::path::Path;

use crate::detection::domain::detection::Detection;
use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::bounding_box::NormalizedBox;
use crate::shared::frame::{ChannelOrder, Frame};

use super::execution_provider::preferred_execution_providers;
use super::math::non_max_suppression;

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f64 = 0.3;

/// Number of BlazeFace anchors (short-range model).
const NUM_ANCHORS: usize = 896;

/// Values per anchor in the regressor output: box (4) + 6 keypoints (12).
const REGRESSOR_STRIDE: usize = 16;

/// BlazeFace face detector backed by an ONNX Runtime session.
///
/// The session is created once and reused for every frame; it is released
/// when the detector is dropped.
pub struct OnnxBlazefaceDetector {
    session: ort::session::Session,
    confidence: f64,
    anchors: Vec<[f32; 2]>,
}

impl OnnxBlazefaceDetector {
    /// Load a BlazeFace ONNX model.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;
        log::info!(
            "Loaded BlazeFace model from {} (confidence >= {confidence})",
            model_path.display()
        );
        Ok(Self {
            session,
            confidence,
            anchors: generate_anchors(),
        })
    }
}

impl FaceDetector for OnnxBlazefaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        if frame.channel_order() != ChannelOrder::Rgb {
            return Err("BlazeFace expects an RGB frame".into());
        }

        // 1. Preprocess: resize to 128x128, normalize to [0,1], NCHW
        let input_tensor = preprocess(frame, INPUT_SIZE);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        // BlazeFace outputs two tensors:
        // - regressors: [1, 896, 16] (box deltas + keypoints)
        // - classificators: [1, 896, 1] (confidence logits)
        if outputs.len() < 2 {
            return Err(
                format!("BlazeFace model expected 2 outputs, got {}", outputs.len()).into(),
            );
        }

        let regressors = outputs[0].try_extract_array::<f32>()?;
        let scores = outputs[1].try_extract_array::<f32>()?;
        let reg_data = regressors.as_slice().ok_or("Cannot get regressor slice")?;
        let score_data = scores.as_slice().ok_or("Cannot get score slice")?;

        // 3. Decode anchor boxes + filter by confidence
        let raw = decode(reg_data, score_data, &self.anchors, self.confidence as f32);

        // 4. NMS
        let kept = non_max_suppression(raw, NMS_IOU_THRESH);

        Ok(kept
            .into_iter()
            .map(|([x1, y1, x2, y2], score)| {
                Detection::new(NormalizedBox::new(x1, y1, x2 - x1, y2 - y1), score)
            })
            .collect())
    }
}

/// Decodes regressor deltas against their anchors into normalized
/// `[x1, y1, x2, y2]` boxes, keeping those scoring at least `min_score`.
fn decode(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    min_score: f32,
) -> Vec<([f64; 4], f32)> {
    let mut raw = Vec::new();
    let num_anchors = anchors.len().min(NUM_ANCHORS);

    for (i, &logit) in score_data.iter().enumerate().take(num_anchors) {
        let score = sigmoid(logit);
        if score < min_score {
            continue;
        }

        let offset = i * REGRESSOR_STRIDE;
        if offset + 4 > reg_data.len() {
            break;
        }

        let anchor = anchors[i];
        let cx = anchor[0] + reg_data[offset] / INPUT_SIZE as f32;
        let cy = anchor[1] + reg_data[offset + 1] / INPUT_SIZE as f32;
        let w = reg_data[offset + 2] / INPUT_SIZE as f32;
        let h = reg_data[offset + 3] / INPUT_SIZE as f32;

        raw.push((
            [
                (cx - w / 2.0) as f64,
                (cy - h / 2.0) as f64,
                (cx + w / 2.0) as f64,
                (cy + h / 2.0) as f64,
            ],
            score,
        ));
    }

    raw
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize frame to `size × size` and normalize to [0,1] NCHW float32.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// Anchor generation (BlazeFace short-range)
// ---------------------------------------------------------------------------

/// Generate BlazeFace anchors for the short-range model.
///
/// The short-range model uses two feature map sizes: 16×16 and 8×8,
/// with 2 and 6 anchors per cell respectively.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)]; // (stride, anchors_per_cell)
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, num) in &strides {
        let grid_size = INPUT_SIZE as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }

    anchors
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_shape() {
        let frame = Frame::new(vec![128u8; 200 * 100 * 3], 200, 100, 3, 0);
        let tensor = preprocess(&frame, 128);
        assert_eq!(tensor.shape(), &[1, 3, 128, 128]);
    }

    #[test]
    fn test_preprocess_normalized() {
        let frame = Frame::new(vec![255u8; 50 * 50 * 3], 50, 50, 3, 0);
        let tensor = preprocess(&frame, 128);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_preprocess_keeps_channel_planes() {
        // Pure red input: only the first plane is lit.
        let mut data = vec![0u8; 10 * 10 * 3];
        for px in data.chunks_exact_mut(3) {
            px[0] = 255;
        }
        let frame = Frame::new(data, 10, 10, 3, 0);
        let tensor = preprocess(&frame, 128);
        assert!((tensor[[0, 0, 64, 64]] - 1.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 1, 64, 64]], 0.0);
        assert_eq!(tensor[[0, 2, 64, 64]], 0.0);
    }

    #[test]
    fn test_generate_anchors_count() {
        // 16×16 grid × 2 anchors + 8×8 grid × 6 anchors = 512 + 384 = 896
        assert_eq!(generate_anchors().len(), NUM_ANCHORS);
    }

    #[test]
    fn test_anchors_in_unit_range() {
        for a in &generate_anchors() {
            assert!(a[0] > 0.0 && a[0] < 1.0);
            assert!(a[1] > 0.0 && a[1] < 1.0);
        }
    }

    #[test]
    fn test_sigmoid() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!((sigmoid(10.0) - 1.0).abs() < 0.001);
        assert!(sigmoid(-10.0) < 0.001);
    }

    #[test]
    fn test_decode_filters_by_score() {
        let anchors = vec![[0.5, 0.5], [0.25, 0.25]];
        let mut reg = vec![0.0f32; 2 * REGRESSOR_STRIDE];
        // Anchor 0: 32x32 px box centred on the anchor.
        reg[2] = 32.0;
        reg[3] = 32.0;
        let scores = vec![5.0, -5.0]; // sigmoid ≈ 0.993, 0.007

        let raw = decode(&reg, &scores, &anchors, 0.5);
        assert_eq!(raw.len(), 1);
        let ([x1, y1, x2, y2], score) = raw[0];
        assert!((x1 - 0.375).abs() < 1e-6);
        assert!((y1 - 0.375).abs() < 1e-6);
        assert!((x2 - 0.625).abs() < 1e-6);
        assert!((y2 - 0.625).abs() < 1e-6);
        assert!(score > 0.99);
    }

    #[test]
    fn test_decode_applies_center_offsets() {
        let anchors = vec![[0.5, 0.5]];
        let mut reg = vec![0.0f32; REGRESSOR_STRIDE];
        reg[0] = 12.8; // +0.1 in normalized x
        reg[1] = -12.8; // -0.1 in normalized y
        reg[2] = 12.8;
        reg[3] = 12.8;

        let raw = decode(&reg, &[3.0], &anchors, 0.5);
        let ([x1, y1, _, _], _) = raw[0];
        assert!((x1 - 0.55).abs() < 1e-6);
        assert!((y1 - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_decode_truncated_regressors_stop_early() {
        let anchors = vec![[0.5, 0.5], [0.5, 0.5]];
        let reg = vec![0.0f32; REGRESSOR_STRIDE]; // room for one anchor only
        let raw = decode(&reg, &[3.0, 3.0], &anchors, 0.5);
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn test_decode_boxes_may_extend_past_frame() {
        // Boxes stay unclamped; the redactor clamps to pixel bounds.
        let anchors = vec![[0.03125, 0.03125]];
        let mut reg = vec![0.0f32; REGRESSOR_STRIDE];
        reg[2] = 64.0;
        reg[3] = 64.0;
        let raw = decode(&reg, &[3.0], &anchors, 0.5);
        assert!(raw[0].0[0] < 0.0);
        assert!(raw[0].0[1] < 0.0);
    }
}
