//! Error types for the rendering core and the command shim

/// Failures surfaced by the rendering core.
///
/// Degenerate geometry, out-of-bounds writes and NaN depth are not errors:
/// they are skipped silently by the rasterizer.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("unknown texture: {0}")]
    UnknownTexture(String),

    #[error("unknown mesh: {0}")]
    UnknownMesh(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("presentation failed: {0}")]
    Present(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Failures turning loosely-typed command input into a typed command
#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("command must be a non-empty array whose first element is the op name")]
    MissingOp,

    #[error("unknown op: {0}")]
    UnknownOp(String),

    #[error("{op}: missing argument {index}")]
    MissingArg { op: String, index: usize },

    #[error("{op}: argument {index} must be {expected}")]
    BadArg {
        op: String,
        index: usize,
        expected: &'static str,
    },
}
