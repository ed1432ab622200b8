//! Shared utilities: frame timing and cooperative cancellation.

/// Shared stop flag for loops and worker threads.
pub mod cancel;
/// FPS measurement and optional frame limiting.
pub mod frame_timing;
