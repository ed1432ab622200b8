//! Background thread feeding detector output into the tracker.

use std::thread::JoinHandle;

use super::{
    detector::PoseDetector,
    tracker::{LandmarkTracker, TrackerStats},
};
use crate::{error::ParallaxError, util::cancel::CancelToken};

/// Owns the `landmark-tracker` thread.
///
/// The thread stops when the detector stream ends, when the stream
/// breaks, or when the cancel token fires (checked between batches).
/// Dropping the worker cancels it without waiting: a blocking read on
/// stdin could otherwise hang shutdown.
pub struct TrackerWorker {
    cancel: CancelToken,
    thread: Option<JoinHandle<TrackerStats>>,
}

impl TrackerWorker {
    /// Spawn the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::ThreadSpawn`] if the thread fails to spawn.
    pub fn spawn(
        detector: Box<dyn PoseDetector>,
        tracker: LandmarkTracker,
        cancel: CancelToken,
    ) -> Result<Self, ParallaxError> {
        let thread_cancel = cancel.clone();
        let thread = std::thread::Builder::new()
            .name("landmark-tracker".into())
            .spawn(move || Self::thread_loop(detector, tracker, &thread_cancel))
            .map_err(ParallaxError::ThreadSpawn)?;

        Ok(Self {
            cancel,
            thread: Some(thread),
        })
    }

    /// Whether the thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Ask the thread to stop after its current batch.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the thread to exit and return its counters. Blocks until
    /// the detector yields its next batch or ends.
    #[must_use]
    pub fn join(mut self) -> Option<TrackerStats> {
        self.thread.take().and_then(|handle| handle.join().ok())
    }

    #[allow(clippy::needless_pass_by_value)]
    fn thread_loop(
        mut detector: Box<dyn PoseDetector>,
        mut tracker: LandmarkTracker,
        cancel: &CancelToken,
    ) -> TrackerStats {
        let mut malformed = 0u64;
        while !cancel.is_cancelled() {
            match detector.next_batch() {
                Ok(Some(batch)) => {
                    let _ = tracker.on_detections(&batch);
                }
                Ok(None) => {
                    log::info!("Detector stream ended");
                    break;
                }
                Err(ParallaxError::Tracking(msg)) => {
                    malformed += 1;
                    // Report the first few, then stay quiet
                    if malformed <= 3 {
                        log::warn!("Skipping detector output: {msg}");
                    } else {
                        log::debug!("Skipping detector output: {msg}");
                    }
                }
                Err(e) => {
                    log::warn!("Detector stream failed, head tracking stops: {e}");
                    break;
                }
            }
        }
        let stats = tracker.stats();
        log::info!(
            "Landmark tracker stopped ({} batches, {} accepted, {malformed} malformed)",
            stats.batches,
            stats.accepted
        );
        stats
    }
}

impl Drop for TrackerWorker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, io::Cursor};

    use super::*;
    use crate::tracking::{
        cell::sample_cell, detector::JsonLinesDetector, PoseDetection,
    };

    type Batch = Result<Option<Vec<PoseDetection>>, ParallaxError>;

    /// Replays a fixed list of results, then ends.
    struct Scripted(VecDeque<Batch>);

    impl PoseDetector for Scripted {
        fn next_batch(&mut self) -> Batch {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    #[test]
    fn drains_stream_into_cell() {
        let log = concat!(
            r#"[{"pose": {"leftEye": {"x": 0, "y": 0}, "rightEye": {"x": 0, "y": 0}, "nose": {"x": 0, "y": 1}}}]"#,
            "\n",
            "garbage\n",
            "[]\n",
            r#"[{"pose": {"leftEye": {"x": 100, "y": 50}, "rightEye": {"x": 200, "y": 50}, "nose": {"x": 150, "y": 150}}}]"#,
            "\n",
        );
        let (writer, mut reader) = sample_cell();
        let worker = TrackerWorker::spawn(
            Box::new(JsonLinesDetector::new(Cursor::new(log))),
            LandmarkTracker::new(writer),
            CancelToken::new(),
        )
        .unwrap();

        let stats = worker.join().unwrap();
        assert_eq!(
            stats,
            TrackerStats {
                batches: 3,
                accepted: 2,
                ignored: 1,
            }
        );
        let snapshot = reader.latest();
        assert_eq!(snapshot.version, 2);
        assert_eq!(snapshot.sample.eye_midpoint(), glam::Vec2::new(150.0, 50.0));
    }

    #[test]
    fn invalid_utf8_line_does_not_stop_tracking() {
        let mut log = br#"[{"pose": {"leftEye": {"x": 0, "y": 0}, "rightEye": {"x": 0, "y": 0}, "nose": {"x": 0, "y": 1}}}]"#.to_vec();
        log.extend_from_slice(b"\n\xff\xfe garbage\n");
        log.extend_from_slice(br#"[{"pose": {"leftEye": {"x": 100, "y": 50}, "rightEye": {"x": 200, "y": 50}, "nose": {"x": 150, "y": 150}}}]"#);
        log.push(b'\n');
        let (writer, mut reader) = sample_cell();
        let worker = TrackerWorker::spawn(
            Box::new(JsonLinesDetector::new(Cursor::new(log))),
            LandmarkTracker::new(writer),
            CancelToken::new(),
        )
        .unwrap();

        let stats = worker.join().unwrap();
        assert_eq!(stats.batches, 2);
        assert_eq!(stats.accepted, 2);
        let snapshot = reader.latest();
        assert_eq!(snapshot.version, 2);
        assert_eq!(snapshot.sample.eye_midpoint(), glam::Vec2::new(150.0, 50.0));
    }

    #[test]
    fn broken_stream_stops_the_worker() {
        let script = Scripted(VecDeque::from([
            Ok(Some(Vec::new())),
            Err(ParallaxError::Io(std::io::Error::other("camera unplugged"))),
            Ok(Some(Vec::new())),
        ]));
        let (writer, _reader) = sample_cell();
        let worker = TrackerWorker::spawn(
            Box::new(script),
            LandmarkTracker::new(writer),
            CancelToken::new(),
        )
        .unwrap();
        let stats = worker.join().unwrap();
        assert_eq!(stats.batches, 1);
    }

    #[test]
    fn cancelled_worker_reads_nothing() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let script = Scripted(VecDeque::from([Ok(Some(Vec::new()))]));
        let (writer, _reader) = sample_cell();
        let worker = TrackerWorker::spawn(
            Box::new(script),
            LandmarkTracker::new(writer),
            cancel,
        )
        .unwrap();
        assert_eq!(worker.join().unwrap().batches, 0);
    }
}
