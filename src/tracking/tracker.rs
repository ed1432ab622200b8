use super::{cell::SampleWriter, landmark::PoseDetection};

/// Counters describing what the tracker did with detection batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackerStats {
    /// Batches received.
    pub batches: u64,
    /// Batches that replaced the stored sample.
    pub accepted: u64,
    /// Batches that were empty or lacked a required keypoint.
    pub ignored: u64,
}

/// Receives detection batches and keeps the landmark cell current.
///
/// No filtering or smoothing: the first pose of a non-empty batch
/// becomes the new sample. Empty batches leave the previous sample in
/// place.
pub struct LandmarkTracker {
    writer: SampleWriter,
    stats: TrackerStats,
}

impl LandmarkTracker {
    /// Wrap the producer half of a landmark cell.
    #[must_use]
    pub fn new(writer: SampleWriter) -> Self {
        Self {
            writer,
            stats: TrackerStats::default(),
        }
    }

    /// Handle one detection batch. Returns `true` if the stored sample
    /// was replaced.
    pub fn on_detections(&mut self, detections: &[PoseDetection]) -> bool {
        self.stats.batches += 1;
        let Some(sample) = detections.first().and_then(PoseDetection::landmarks)
        else {
            self.stats.ignored += 1;
            return false;
        };
        let version = self.writer.publish(sample);
        log::trace!("landmark sample v{version}: {sample:?}");
        self.stats.accepted += 1;
        true
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> TrackerStats {
        self.stats
    }
}
