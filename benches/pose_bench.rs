//! Pose mapping, sample cell, and detector parsing benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use parallax::{
    camera::LandmarkMapping,
    tracking::{sample_cell, LandmarkSample, PoseDetection},
};

const BATCH: &str = r#"[{"pose": {"leftEye": {"x": 100, "y": 50}, "rightEye": {"x": 200, "y": 50}, "nose": {"x": 150, "y": 150}}}]"#;

fn sample() -> LandmarkSample {
    LandmarkSample {
        left_eye: Vec2::new(100.0, 50.0),
        right_eye: Vec2::new(200.0, 50.0),
        nose: Vec2::new(150.0, 150.0),
    }
}

fn mapping_benchmark(c: &mut Criterion) {
    let mapping = LandmarkMapping::default();
    let sample = sample();
    c.bench_function("landmark_to_pose", |b| {
        b.iter(|| black_box(mapping.pose(black_box(&sample))))
    });
}

fn cell_benchmark(c: &mut Criterion) {
    let (mut writer, mut reader) = sample_cell();
    let sample = sample();
    c.bench_function("cell_publish_then_read", |b| {
        b.iter(|| {
            let _ = writer.publish(black_box(sample));
            black_box(reader.latest())
        })
    });
}

fn parse_benchmark(c: &mut Criterion) {
    c.bench_function("parse_detection_line", |b| {
        b.iter(|| {
            let batch: Option<Vec<PoseDetection>> =
                serde_json::from_str(black_box(BATCH)).ok();
            black_box(
                batch.as_deref().and_then(<[_]>::first).and_then(PoseDetection::landmarks),
            )
        })
    });
}

criterion_group!(benches, mapping_benchmark, cell_benchmark, parse_benchmark);
criterion_main!(benches);
