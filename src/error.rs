use thiserror::Error;

/// Errors that abort setup. Problems inside a single tick are logged by the
/// frame loop instead, so one bad frame never takes the process down.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to create output window: {0}")]
    Window(String),

    #[error("failed to load texture from {path}: {source}")]
    Texture {
        path: String,
        source: image::ImageError,
    },

    #[error("unknown scene \"{0}\"")]
    UnknownScene(String),
}
