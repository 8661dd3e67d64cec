pub mod frame_redactor;
pub mod output_dir;
pub mod pipeline_logger;
pub mod redact_image_use_case;
pub mod redact_video_use_case;
pub mod redact_webcam_use_case;
pub mod redaction_error;
pub mod run_report;

#[cfg(test)]
mod test_support;
