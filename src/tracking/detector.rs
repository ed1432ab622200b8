//! Pose detector sources.
//!
//! Camera capture and pose estimation happen in an external program. It
//! prints one JSON array of [`PoseDetection`]s per line; this module turns
//! such a stream (a child process, stdin, or a recorded file) into
//! detection batches.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    process::{Child, ChildStdout, Command, Stdio},
    time::Duration,
};

use super::landmark::PoseDetection;
use crate::{error::ParallaxError, options::DetectorSource};

/// Anything that yields detection batches.
pub trait PoseDetector: Send {
    /// Block until the next batch is available.
    ///
    /// Returns `Ok(None)` once the stream has ended.
    ///
    /// # Errors
    ///
    /// [`ParallaxError::Tracking`] for a malformed batch (the stream is
    /// still usable); any other variant means the stream is broken.
    fn next_batch(&mut self) -> Result<Option<Vec<PoseDetection>>, ParallaxError>;
}

/// Reads newline-delimited JSON detection batches.
///
/// Lines are read as raw bytes, so a line that is not valid UTF-8 is a
/// malformed batch like any other rather than a broken stream.
pub struct JsonLinesDetector<R> {
    reader: R,
    line: Vec<u8>,
    line_number: u64,
    interval: Duration,
}

impl<R: BufRead> JsonLinesDetector<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_number: 0,
            interval: Duration::ZERO,
        }
    }

    /// Sleep `interval` before handing out each batch. Paces recorded
    /// logs, which would otherwise be consumed faster than frames are
    /// drawn.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl<R: BufRead + Send> PoseDetector for JsonLinesDetector<R> {
    fn next_batch(&mut self) -> Result<Option<Vec<PoseDetection>>, ParallaxError> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let trimmed = self.line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }
            if !self.interval.is_zero() {
                std::thread::sleep(self.interval);
            }
            return serde_json::from_slice(trimmed).map(Some).map_err(|e| {
                ParallaxError::Tracking(format!(
                    "line {}: {e}",
                    self.line_number
                ))
            });
        }
    }
}

/// A spawned detector program. The process is killed on drop.
pub struct DetectorProcess {
    child: Child,
}

impl DetectorProcess {
    /// Spawn `program args...` with stdout piped.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::ProcessSpawn`] if the program cannot be
    /// started.
    pub fn spawn(
        program: &str,
        args: &[String],
    ) -> Result<(Self, JsonLinesDetector<BufReader<ChildStdout>>), ParallaxError>
    {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ParallaxError::ProcessSpawn(program.to_owned(), e))?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            return Err(ParallaxError::Tracking(format!(
                "detector '{program}' has no stdout"
            )));
        };

        log::info!(
            "Detector process started (pid: {}, program: {program})",
            child.id()
        );
        Ok((Self { child }, JsonLinesDetector::new(BufReader::new(stdout))))
    }

    /// Whether the process is still running (non-blocking).
    pub fn is_running(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                log::warn!("Detector process exited with: {status}");
                false
            }
            Err(e) => {
                log::error!("Failed to check detector status: {e}");
                false
            }
        }
    }
}

impl Drop for DetectorProcess {
    fn drop(&mut self) {
        if matches!(self.child.try_wait(), Ok(None)) {
            log::info!("Stopping detector process (pid: {})", self.child.id());
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

/// An opened detector source: the batch stream plus, for spawned
/// programs, the process handle that must outlive it.
pub struct OpenedDetector {
    /// Batch stream, ready to hand to a tracker worker.
    pub detector: Box<dyn PoseDetector>,
    /// Owning handle for a spawned detector program.
    pub process: Option<DetectorProcess>,
}

/// Open the configured detector source. `DetectorSource::None` yields
/// `Ok(None)`.
///
/// # Errors
///
/// Returns [`ParallaxError`] if the file cannot be opened or the program
/// cannot be spawned.
pub fn open_source(
    source: &DetectorSource,
) -> Result<Option<OpenedDetector>, ParallaxError> {
    let opened = match source {
        DetectorSource::None => return Ok(None),
        DetectorSource::Stdin => OpenedDetector {
            detector: Box::new(JsonLinesDetector::new(BufReader::new(
                std::io::stdin(),
            ))),
            process: None,
        },
        DetectorSource::File { path, interval_ms } => {
            let file = File::open(path)?;
            log::info!(
                "Replaying detections from {} every {interval_ms} ms",
                path.display()
            );
            OpenedDetector {
                detector: Box::new(
                    JsonLinesDetector::new(BufReader::new(file))
                        .with_interval(Duration::from_millis(*interval_ms)),
                ),
                process: None,
            }
        }
        DetectorSource::Command { program, args } => {
            let (process, detector) = DetectorProcess::spawn(program, args)?;
            OpenedDetector {
                detector: Box::new(detector),
                process: Some(process),
            }
        }
    };
    Ok(Some(opened))
}
