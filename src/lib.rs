// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Head-tracked 3D scene viewer built on wgpu.
//!
//! Parallax renders a small stage (a back wall and a floor, ambient light
//! and one shadow-casting directional light) plus a glTF model loaded in
//! the background. In head-tracked mode the camera position follows the
//! viewer's face: an external pose detector streams eye and nose
//! landmarks, and every frame the newest sample is mapped to a camera
//! position looking at the origin.
//!
//! # Key entry points
//!
//! - [`Viewer`] - the winit window (feature `viewer`)
//! - [`render_loop::RenderLoop`] - per-frame update and render
//! - [`scene::Scene`] - node trees, meshes, and lights
//! - [`tracking`] - detector input, landmark tracker, sample cell
//! - [`options::Options`] - TOML-backed configuration and presets
//!
//! # Architecture
//!
//! Two background threads feed the render thread. The
//! `landmark-tracker` thread reads detector output and publishes samples
//! through a lock-free triple buffer; the render thread only ever sees
//! the newest one. The `model-loader` thread imports the glTF file and
//! hands the finished node tree over a channel, and the render loop
//! grafts it into the scene exactly once.

pub mod camera;
pub mod error;
pub mod gpu;
pub mod options;
pub mod render_loop;
pub mod renderer;
pub mod scene;
pub mod tracking;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use error::ParallaxError;
pub use options::Options;
pub use render_loop::{FrameSink, RenderLoop};
pub use scene::Scene;
#[cfg(feature = "viewer")]
pub use viewer::{Viewer, ViewerBuilder};
