//! Error types for scene assembly, camera configuration and rendering.

use thiserror::Error;

/// Errors that can occur while building a scene or rendering it.
#[derive(Error, Debug)]
pub enum TracerError {
    /// A vector would be zero, or shape parameters are degenerate.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Polygon vertices are too few, coincident, non-coplanar or non-convex.
    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),

    /// Camera parameters were supplied but are inconsistent.
    #[error("invalid camera configuration: {0}")]
    InvalidCameraConfig(String),

    /// A required camera field was never supplied to the builder.
    #[error("missing rendering data: camera field `{0}` was not set")]
    IncompleteCameraConfig(&'static str),

    /// A render worker failed; already written pixels are kept.
    #[error("render failed: {0}")]
    RenderFailed(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed scene description: {0}")]
    SceneParse(#[from] serde_json::Error),
}

/// Result type for tracer operations.
pub type Result<T> = std::result::Result<T, TracerError>;
