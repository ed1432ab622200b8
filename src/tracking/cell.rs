//! Last-write-wins landmark cell.
//!
//! A single producer (the tracker) publishes whole samples and a single
//! consumer (the render loop) reads the newest one. Backed by a lock-free
//! triple buffer, so neither side ever blocks and the reader can only
//! observe a sample exactly as it was written.

use super::landmark::LandmarkSample;

/// An immutable sample tagged with the write that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleSnapshot {
    /// 0 before the first write, then incremented per write.
    pub version: u64,
    /// The landmarks.
    pub sample: LandmarkSample,
}

/// Producer half of the landmark cell.
pub struct SampleWriter {
    input: triple_buffer::Input<SampleSnapshot>,
    version: u64,
}

/// Consumer half of the landmark cell.
pub struct SampleReader {
    output: triple_buffer::Output<SampleSnapshot>,
}

/// Create a connected writer/reader pair holding the default sample.
#[must_use]
pub fn sample_cell() -> (SampleWriter, SampleReader) {
    let (input, output) = triple_buffer::triple_buffer(&SampleSnapshot::default());
    (SampleWriter { input, version: 0 }, SampleReader { output })
}

impl SampleWriter {
    /// Publish a new sample, replacing whatever was there. Returns the
    /// version assigned to it.
    pub fn publish(&mut self, sample: LandmarkSample) -> u64 {
        self.version += 1;
        self.input.write(SampleSnapshot {
            version: self.version,
            sample,
        });
        self.version
    }

    /// Version of the most recent publish (0 if none).
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl SampleReader {
    /// The newest published snapshot. Never blocks.
    pub fn latest(&mut self) -> SampleSnapshot {
        *self.output.read()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn sample_at(x: f32) -> LandmarkSample {
        LandmarkSample {
            left_eye: Vec2::new(x, 0.0),
            right_eye: Vec2::new(x + 10.0, 0.0),
            nose: Vec2::new(x + 5.0, 20.0),
        }
    }

    #[test]
    fn starts_at_default() {
        let (_writer, mut reader) = sample_cell();
        assert_eq!(reader.latest(), SampleSnapshot::default());
    }

    #[test]
    fn last_write_wins() {
        let (mut writer, mut reader) = sample_cell();
        assert_eq!(writer.publish(sample_at(1.0)), 1);
        assert_eq!(writer.publish(sample_at(2.0)), 2);
        assert_eq!(writer.publish(sample_at(3.0)), 3);

        let snapshot = reader.latest();
        assert_eq!(snapshot.version, 3);
        assert_eq!(snapshot.sample, sample_at(3.0));
        // Reading again without a new write returns the same snapshot
        assert_eq!(reader.latest(), snapshot);
        assert_eq!(writer.version(), 3);
    }

    #[test]
    fn reader_never_sees_a_torn_sample() {
        let (mut writer, mut reader) = sample_cell();
        let producer = std::thread::spawn(move || {
            for i in 1..=10_000u32 {
                let _ = writer.publish(sample_at(i as f32));
            }
        });

        let mut last_version = 0;
        for _ in 0..10_000 {
            let snapshot = reader.latest();
            assert!(snapshot.version >= last_version);
            last_version = snapshot.version;
            if snapshot.version > 0 {
                // Every field belongs to the same write
                let x = snapshot.version as f32;
                assert_eq!(snapshot.sample, sample_at(x));
            }
        }
        producer.join().unwrap();
        assert_eq!(reader.latest().version, 10_000);
    }
}
