//! Standalone window backed by winit.
//!
//! ```no_run
//! # use parallax::{options::Options, Viewer};
//! Viewer::builder()
//!     .with_options(Options::default())
//!     .with_model("assets/models/scene.glb")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::{path::PathBuf, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    error::ParallaxError,
    gpu::render_context::RenderContext,
    options::Options,
    render_loop::RenderLoop,
    renderer::SceneRenderer,
    tracking::TrackingSession,
};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Options,
    model: Option<PathBuf>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: Options::default(),
            model: None,
            title: "Parallax".into(),
        }
    }

    /// Replace the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Load this model instead of `options.model.path`.
    #[must_use]
    pub fn with_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.model = Some(path.into());
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(mut self) -> Viewer {
        if let Some(path) = self.model {
            self.options.model.path = Some(path);
        }
        Viewer {
            options: self.options,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A window showing the stage, the model, and (optionally) a head-tracked
/// camera.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`ParallaxError::Viewer`] if the event loop cannot be
    /// created or exits with an error.
    pub fn run(self) -> Result<(), ParallaxError> {
        let event_loop = EventLoop::new()
            .map_err(|e| ParallaxError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            renderer: None,
            render_loop: None,
            tracking: None,
            options: self.options,
            title: self.title,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| ParallaxError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Arc<Window>>,
    renderer: Option<SceneRenderer>,
    render_loop: Option<RenderLoop>,
    tracking: Option<TrackingSession>,
    options: Options,
    title: String,
}

fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    fn init(&mut self, window: &Arc<Window>) -> Result<(), ParallaxError> {
        let size = viewport_size(window.inner_size());
        let context =
            pollster::block_on(RenderContext::new(window.clone(), size))?;

        let reader = TrackingSession::start(&self.options.tracking).map(
            |(reader, session)| {
                self.tracking = Some(session);
                reader
            },
        );
        let render_loop =
            RenderLoop::from_options(&self.options, context.aspect(), reader)?;
        let renderer = SceneRenderer::new(
            context,
            &self.options.display,
            render_loop.scene().lights(),
        )?;

        self.renderer = Some(renderer);
        self.render_loop = Some(render_loop);
        Ok(())
    }

    fn redraw(&mut self) {
        if let Some(session) = &mut self.tracking {
            let _ = session.is_alive();
        }
        let (Some(window), Some(renderer), Some(render_loop)) =
            (&self.window, &mut self.renderer, &mut self.render_loop)
        else {
            return;
        };

        match render_loop.step(renderer) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::Outdated) => {
                let (w, h) = viewport_size(window.inner_size());
                renderer.resize(w, h);
                render_loop.resize(w, h);
            }
            Err(e) => log::error!("render error: {e:?}"),
        }
        window.request_redraw();
    }

    fn shutdown(&mut self) {
        if let Some(session) = self.tracking.take() {
            session.stop();
        }
        if let Some(render_loop) = &self.render_loop {
            log::info!(
                "Closing after {} frames ({:.1} fps)",
                render_loop.frames(),
                render_loop.fps()
            );
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes().with_title(&self.title);
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.init(&window) {
            log::error!("Failed to initialize renderer: {e}");
            event_loop.exit();
            return;
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(event_size) => {
                let (w, h) = viewport_size(event_size);
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(w, h);
                }
                if let Some(render_loop) = &mut self.render_loop {
                    render_loop.resize(w, h);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => (),
        }
    }
}
