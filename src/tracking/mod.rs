//! Head tracking: detector input, the landmark tracker, and the
//! last-write-wins cell that hands samples to the render loop.

/// Lock-free single-producer/single-consumer sample cell.
pub mod cell;
/// Detector sources yielding detection batches.
pub mod detector;
/// Landmark sample and detector wire types.
pub mod landmark;
/// Detector, tracker thread and process kept alive together.
pub mod session;
/// Detection batch → sample cell.
pub mod tracker;
/// Background thread driving the tracker.
pub mod worker;

pub use cell::{sample_cell, SampleReader, SampleSnapshot, SampleWriter};
pub use detector::{open_source, OpenedDetector, PoseDetector};
pub use landmark::{Keypoint, LandmarkSample, PoseDetection, PoseKeypoints};
pub use session::TrackingSession;
pub use tracker::{LandmarkTracker, TrackerStats};
pub use worker::TrackerWorker;
