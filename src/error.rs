//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the parallax crate.
#[derive(Debug)]
pub enum ParallaxError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// Failed to load or decode a glTF model.
    ModelLoad(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn a background thread.
    ThreadSpawn(std::io::Error),
    /// Failed to start the named detector program.
    ProcessSpawn(String, std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Malformed output from the pose detector.
    Tracking(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for ParallaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::ModelLoad(msg) => write!(f, "model load error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::ProcessSpawn(program, e) => {
                write!(f, "failed to start detector '{program}': {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Tracking(msg) => write!(f, "tracking error: {msg}"),
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for ParallaxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) | Self::ProcessSpawn(_, e) => {
                Some(e)
            }
            _ => None,
        }
    }
}

impl From<RenderContextError> for ParallaxError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for ParallaxError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<gltf::Error> for ParallaxError {
    fn from(e: gltf::Error) -> Self {
        Self::ModelLoad(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_source() {
        let err = ParallaxError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing.glb",
        ));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "I/O error: missing.glb");
    }

    #[test]
    fn process_spawn_names_the_program() {
        let err = ParallaxError::ProcessSpawn(
            "python3".into(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "failed to start detector 'python3': not found");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn message_variants_have_no_source() {
        let err = ParallaxError::Tracking("bad line".into());
        assert!(std::error::Error::source(&err).is_none());
        assert_eq!(err.to_string(), "tracking error: bad line");
    }
}
