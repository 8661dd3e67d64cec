use std::fmt;

/// Totals for one redaction run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub frames: usize,
    pub faces: usize,
}

impl RunReport {
    /// Counts one emitted frame with `faces` blurred regions.
    pub fn record_frame(&mut self, faces: usize) {
        self.frames += 1;
        self.faces += faces;
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frame(s) processed, {} face(s) blurred",
            self.frames, self.faces
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_frame_accumulates() {
        let mut report = RunReport::default();
        report.record_frame(2);
        report.record_frame(0);
        report.record_frame(1);
        assert_eq!(report, RunReport { frames: 3, faces: 3 });
    }

    #[test]
    fn test_display() {
        let report = RunReport { frames: 30, faces: 4 };
        assert_eq!(report.to_string(), "30 frame(s) processed, 4 face(s) blurred");
    }
}
