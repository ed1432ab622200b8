//! Per-frame update and render.
//!
//! Each step: (head-tracked) recompute the camera pose from the newest
//! landmark sample, graft the model once its load completes, then hand the
//! scene to a [`FrameSink`]. The windowed viewer drives one step per
//! `RedrawRequested`; [`RenderLoop::run`] drives steps until a
//! [`CancelToken`] fires.

use crate::{
    camera::{Camera, LandmarkMapping},
    error::ParallaxError,
    options::{Options, TrackingMode},
    scene::{bootstrap, PendingModel, Placement, Scene},
    tracking::SampleReader,
    util::{cancel::CancelToken, frame_timing::FrameTiming},
};

/// Anything that can display a frame of the scene.
pub trait FrameSink {
    /// Render failure.
    type Error;

    /// Render one frame of `scene` as seen from `camera`.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn render_frame(
        &mut self,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<(), Self::Error>;
}

/// How the camera moves between frames.
pub enum CameraDriver {
    /// The camera stays where the bootstrap put it.
    Fixed,
    /// The camera follows the newest landmark sample.
    HeadTracked {
        /// Consumer half of the landmark cell.
        reader: SampleReader,
        /// Landmark → pose constants.
        mapping: LandmarkMapping,
    },
}

/// Owns the scene, the camera, and the in-flight model load.
pub struct RenderLoop {
    scene: Scene,
    camera: Camera,
    driver: CameraDriver,
    pending: Option<PendingModel>,
    placement: Placement,
    timing: FrameTiming,
    /// Cell version the camera was last posed from.
    sample_version: Option<u64>,
}

impl RenderLoop {
    /// Wrap an already-built scene and camera.
    #[must_use]
    pub fn new(scene: Scene, camera: Camera, driver: CameraDriver) -> Self {
        Self {
            scene,
            camera,
            driver,
            pending: None,
            placement: Placement::default(),
            timing: FrameTiming::new(0),
            sample_version: None,
        }
    }

    /// Bootstrap the scene from options and start loading the configured
    /// model. `reader` is used only in head-tracked mode.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::ThreadSpawn`] if the loader thread cannot
    /// be started.
    pub fn from_options(
        options: &Options,
        aspect: f32,
        reader: Option<SampleReader>,
    ) -> Result<Self, ParallaxError> {
        let (scene, camera) = bootstrap(options, aspect);
        let driver = match (options.tracking.mode, reader) {
            (TrackingMode::HeadTracked, Some(reader)) => {
                CameraDriver::HeadTracked {
                    reader,
                    mapping: options.tracking.mapping,
                }
            }
            (TrackingMode::HeadTracked, None) => {
                log::warn!("No landmark source, camera stays fixed");
                CameraDriver::Fixed
            }
            (TrackingMode::Static, _) => CameraDriver::Fixed,
        };

        let mut render_loop = Self::new(scene, camera, driver)
            .with_target_fps(options.display.target_fps);
        render_loop.placement = Placement::from_options(&options.model);
        if let Some(path) = &options.model.path {
            render_loop.pending = Some(PendingModel::spawn(path.clone())?);
        }
        Ok(render_loop)
    }

    /// Graft the result of `pending` at `placement` once it completes.
    #[must_use]
    pub fn with_model(
        mut self,
        pending: PendingModel,
        placement: Placement,
    ) -> Self {
        self.pending = Some(pending);
        self.placement = placement;
        self
    }

    /// Limit [`run`](Self::run) to `fps` frames per second (0 = unlimited).
    #[must_use]
    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.timing = FrameTiming::new(fps);
        self
    }

    /// Pose the camera and apply a finished model load. Never blocks.
    pub fn update(&mut self) {
        if let CameraDriver::HeadTracked { reader, mapping } = &mut self.driver
        {
            let snapshot = reader.latest();
            if self.sample_version != Some(snapshot.version) {
                mapping.pose(&snapshot.sample).apply(&mut self.camera);
                self.sample_version = Some(snapshot.version);
            }
        }

        let Some(pending) = &mut self.pending else {
            return;
        };
        match pending.poll() {
            Some(Ok(fragment)) => {
                self.scene.graft(fragment, self.placement);
                self.pending = None;
            }
            Some(Err(e)) => {
                log::warn!("Model failed to load, continuing without it: {e}");
                self.pending = None;
            }
            None => {}
        }
    }

    /// One frame: [`update`](Self::update), then render. Returns `false`
    /// without doing either while the frame limit says the next frame is
    /// not due yet.
    ///
    /// # Errors
    ///
    /// Propagates the sink's render error.
    pub fn step<S: FrameSink>(
        &mut self,
        sink: &mut S,
    ) -> Result<bool, S::Error> {
        if !self.timing.should_render() {
            return Ok(false);
        }
        self.update();
        sink.render_frame(&self.scene, &self.camera)?;
        self.timing.end_frame();
        Ok(true)
    }

    /// Step until `cancel` fires, honoring the frame limit. Returns the
    /// number of frames rendered by this call.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first render error.
    pub fn run<S: FrameSink>(
        &mut self,
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Result<u64, S::Error> {
        let start = self.timing.frames();
        while !cancel.is_cancelled() {
            if !self.step(sink)? {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        }
        Ok(self.timing.frames() - start)
    }

    /// Follow a surface resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize(width, height);
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The camera as of the last update.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Whether a model load is still in flight.
    #[must_use]
    pub fn model_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.timing.frames()
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;
    use crate::{
        scene::loader::tests::triangle,
        tracking::{sample_cell, LandmarkSample},
    };

    /// Records what it was asked to draw; cancels after `limit` frames.
    struct Recorder {
        eyes: Vec<Vec3>,
        roots: Vec<usize>,
        limit: usize,
        cancel: CancelToken,
    }

    impl Recorder {
        fn new(limit: usize, cancel: &CancelToken) -> Self {
            Self {
                eyes: Vec::new(),
                roots: Vec::new(),
                limit,
                cancel: cancel.clone(),
            }
        }
    }

    impl FrameSink for Recorder {
        type Error = String;

        fn render_frame(
            &mut self,
            scene: &Scene,
            camera: &Camera,
        ) -> Result<(), String> {
            self.eyes.push(camera.eye);
            self.roots.push(scene.roots().len());
            if self.eyes.len() >= self.limit {
                self.cancel.cancel();
            }
            Ok(())
        }
    }

    struct Failing;

    impl FrameSink for Failing {
        type Error = &'static str;

        fn render_frame(&mut self, _: &Scene, _: &Camera) -> Result<(), Self::Error> {
            Err("device lost")
        }
    }

    fn fixed_loop() -> RenderLoop {
        let (scene, camera) = bootstrap(&Options::default(), 1.0);
        RenderLoop::new(scene, camera, CameraDriver::Fixed)
    }

    #[test]
    fn run_stops_when_cancelled() {
        let cancel = CancelToken::new();
        let mut sink = Recorder::new(5, &cancel);
        let mut render_loop = fixed_loop();

        assert_eq!(render_loop.run(&mut sink, &cancel), Ok(5));
        assert_eq!(render_loop.frames(), 5);
        // Static camera never moves
        assert!(sink.eyes.iter().all(|e| *e == Vec3::new(0.0, 0.5, 3.0)));
    }

    #[test]
    fn pre_cancelled_run_renders_nothing() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut sink = Recorder::new(1, &cancel);
        assert_eq!(fixed_loop().run(&mut sink, &cancel), Ok(0));
        assert!(sink.eyes.is_empty());
    }

    #[test]
    fn sink_errors_propagate() {
        let mut render_loop = fixed_loop();
        assert_eq!(render_loop.step(&mut Failing), Err("device lost"));
        assert_eq!(
            render_loop.run(&mut Failing, &CancelToken::new()),
            Err("device lost")
        );
        assert_eq!(render_loop.frames(), 0);
    }

    #[test]
    fn step_honors_frame_limit() {
        let mut render_loop = fixed_loop().with_target_fps(1);
        let cancel = CancelToken::new();
        let mut sink = Recorder::new(usize::MAX, &cancel);

        // First frame is immediate, the rest wait out the one-second budget
        let rendered: Vec<bool> = (0..5)
            .map(|_| render_loop.step(&mut sink).unwrap())
            .collect();
        assert_eq!(rendered, vec![true, false, false, false, false]);
        assert_eq!(sink.eyes.len(), 1);
        assert_eq!(render_loop.frames(), 1);
    }

    #[test]
    fn head_tracked_camera_follows_latest_sample() {
        let (mut writer, reader) = sample_cell();
        let (scene, camera) = bootstrap(&Options::default(), 1.0);
        let mut render_loop = RenderLoop::new(
            scene,
            camera,
            CameraDriver::HeadTracked {
                reader,
                mapping: LandmarkMapping::default(),
            },
        );
        let cancel = CancelToken::new();
        let mut sink = Recorder::new(1, &cancel);

        // Before any detection the default sample poses the camera
        assert!(render_loop.step(&mut sink).unwrap());
        assert!((sink.eyes[0] - Vec3::new(1.5, 3.5, 2.5)).length() < 1e-6);

        let _ = writer.publish(LandmarkSample {
            left_eye: Vec2::new(100.0, 50.0),
            right_eye: Vec2::new(200.0, 50.0),
            nose: Vec2::new(150.0, 150.0),
        });
        assert!(render_loop.step(&mut sink).unwrap());
        assert!((sink.eyes[1] - Vec3::new(0.6, 3.0, 2.5)).length() < 1e-6);
        assert_eq!(render_loop.camera().target, Vec3::ZERO);

        // No new detection: the pose holds
        assert!(render_loop.step(&mut sink).unwrap());
        assert_eq!(sink.eyes[2], sink.eyes[1]);
    }

    #[test]
    fn loaded_model_is_inserted_exactly_once() {
        let placement = Placement {
            position: Vec3::new(0.0, -0.5, 0.0),
            scale: 0.08,
        };
        let mut render_loop = fixed_loop()
            .with_model(PendingModel::ready(Ok(triangle())), placement);
        let cancel = CancelToken::new();
        let mut sink = Recorder::new(4, &cancel);

        assert_eq!(render_loop.run(&mut sink, &cancel), Ok(4));
        assert_eq!(sink.roots, vec![3, 3, 3, 3]);
        assert!(!render_loop.model_pending());

        let model = &render_loop.scene().roots()[2];
        assert_eq!(model.transform.translation, placement.position);
        assert_eq!(model.transform.scale, Vec3::splat(0.08));
        let mut casters = 0;
        let mut nodes = 0;
        model.traverse(&mut |n| {
            nodes += 1;
            casters += usize::from(n.cast_shadow);
        });
        assert_eq!(casters, nodes);
    }

    #[test]
    fn failed_load_leaves_scene_untouched() {
        let mut render_loop = fixed_loop().with_model(
            PendingModel::ready(Err(ParallaxError::ModelLoad("corrupt".into()))),
            Placement::default(),
        );
        let cancel = CancelToken::new();
        let mut sink = Recorder::new(2, &cancel);

        assert_eq!(render_loop.run(&mut sink, &cancel), Ok(2));
        assert_eq!(sink.roots, vec![2, 2]);
        assert!(!render_loop.model_pending());
    }

    #[test]
    fn head_tracking_without_source_falls_back_to_fixed() {
        let mut options = Options::default();
        options.tracking.mode = TrackingMode::HeadTracked;
        let mut render_loop =
            RenderLoop::from_options(&options, 1.0, None).unwrap();
        render_loop.update();
        assert_eq!(render_loop.camera().eye, Vec3::new(0.0, 0.5, 3.0));
        assert!(!render_loop.model_pending());
    }
}
