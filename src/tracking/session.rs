//! A running head-tracking setup: detector source, tracker thread and,
//! for spawned programs, the detector process.

use super::{
    cell::{sample_cell, SampleReader},
    detector::{open_source, DetectorProcess},
    tracker::LandmarkTracker,
    worker::TrackerWorker,
};
use crate::{
    options::{TrackingMode, TrackingOptions},
    util::cancel::CancelToken,
};

/// Owns the tracker worker and the detector process. Dropping it stops
/// both.
pub struct TrackingSession {
    worker: TrackerWorker,
    process: Option<DetectorProcess>,
    stopped: bool,
}

impl TrackingSession {
    /// Open the configured detector and start the `landmark-tracker`
    /// thread. Returns the consumer half of the sample cell alongside the
    /// session.
    ///
    /// Returns `None` (and logs why) when head tracking is off or cannot
    /// start.
    #[must_use]
    pub fn start(options: &TrackingOptions) -> Option<(SampleReader, Self)> {
        if options.mode != TrackingMode::HeadTracked {
            return None;
        }
        let opened = match open_source(&options.source) {
            Ok(Some(opened)) => opened,
            Ok(None) => {
                log::warn!("Head tracking enabled but no detector source set");
                return None;
            }
            Err(e) => {
                log::warn!("Failed to open detector source: {e}");
                return None;
            }
        };

        let (writer, reader) = sample_cell();
        match TrackerWorker::spawn(
            opened.detector,
            LandmarkTracker::new(writer),
            CancelToken::new(),
        ) {
            Ok(worker) => Some((
                reader,
                Self {
                    worker,
                    process: opened.process,
                    stopped: false,
                },
            )),
            Err(e) => {
                log::warn!("Failed to start landmark tracker: {e}");
                None
            }
        }
    }

    /// Whether detections can still arrive. Logs once when the detector
    /// or the tracker thread has gone away; the camera then holds its
    /// last pose.
    pub fn is_alive(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        let process_alive =
            self.process.as_mut().is_none_or(DetectorProcess::is_running);
        if process_alive && !self.worker.is_finished() {
            return true;
        }
        log::warn!("Head tracking stopped, camera holds its last pose");
        self.stopped = true;
        false
    }

    /// Ask the tracker thread to stop. The detector process is killed
    /// when the session is dropped.
    pub fn stop(&self) {
        self.worker.cancel();
    }
}
