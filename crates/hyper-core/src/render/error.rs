//! # Hyper Core Render Errors
use thiserror::Error;

/// Failure while building or drawing the render tree
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("widget '{widget}' failed to draw: {message}")]
    Draw { widget: String, message: String },

    #[error("area {width}x{height} is below the minimum {min_width}x{min_height}")]
    TooSmall { width: u16, height: u16, min_width: u16, min_height: u16 },

    #[error("unknown render node {0}")]
    UnknownNode(usize),

    #[error("the root node cannot be removed")]
    RootRemoval,

    #[error("present failed: {0}")]
    Present(#[from] SurfaceError),
}

impl RenderError {
    pub fn draw(widget: impl Into<String>, message: impl Into<String>) -> Self {
        RenderError::Draw { widget: widget.into(), message: message.into() }
    }
}

/// Failure of the output surface
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cell ({x}, {y}) is outside the {width}x{height} surface")]
    OutOfBounds { x: u16, y: u16, width: u16, height: u16 },

    #[error("{0}")]
    Backend(String),
}
