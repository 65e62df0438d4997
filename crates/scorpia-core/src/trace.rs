//! Frame trace - error history and rewiring events for external reporting

use crate::error::Result;
use crate::kernel::FrameReport;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Homeostatic threshold the frames were judged against.
    pub threshold: f64,
    /// Error metric per frame, in frame order.
    pub error_metrics: Vec<f64>,
    /// Indices of frames that rewired.
    pub rewiring_frames: Vec<u64>,
}

impl Trace {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    pub fn record(&mut self, report: &FrameReport) {
        self.error_metrics.push(report.error_metric);
        if report.mode.is_rewiring() {
            self.rewiring_frames.push(report.frame);
        }
    }

    pub fn len(&self) -> usize {
        self.error_metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.error_metrics.is_empty()
    }

    /// Mean error metric over all recorded frames.
    pub fn mean_error_metric(&self) -> Option<f64> {
        if self.error_metrics.is_empty() {
            None
        } else {
            Some(self.error_metrics.iter().sum::<f64>() / self.error_metrics.len() as f64)
        }
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FrameMode;
    use std::time::Duration;

    fn report(frame: u64, error_metric: f64, mode: FrameMode) -> FrameReport {
        FrameReport {
            frame,
            load: 0.3,
            forecast: 0.5,
            error: error_metric / 100.0,
            error_metric,
            mode,
            renormalization: None,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_record_tracks_rewiring_frames() {
        let mut trace = Trace::new(15.0);
        trace.record(&report(0, 20.0, FrameMode::Rewiring));
        trace.record(&report(1, 10.0, FrameMode::Nominal));
        trace.record(&report(2, 30.0, FrameMode::Rewiring));
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.error_metrics, vec![20.0, 10.0, 30.0]);
        assert_eq!(trace.rewiring_frames, vec![0, 2]);
        assert_eq!(trace.mean_error_metric(), Some(20.0));
    }

    #[test]
    fn test_empty_trace() {
        let trace = Trace::new(15.0);
        assert!(trace.is_empty());
        assert_eq!(trace.mean_error_metric(), None);
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let mut trace = Trace::new(15.0);
        trace.record(&report(0, 19.5, FrameMode::Rewiring));
        trace.write_json(&path).unwrap();

        let back: Trace = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, trace);
    }
}
