//! # Hyper Core Render Pipeline
//!
//! Incremental terminal rendering for plugin widgets.
//!
//! - **[`tree`]**: the widget hierarchy with dirty tracking ([`RenderTree`]).
//! - **[`engine`]**: the per-frame state machine ([`RenderEngine`]):
//!   collect dirty nodes, render them into the back buffer, diff against the
//!   front buffer, present only changed cells, swap.
//! - **[`input`]**: focus and event bubbling ([`InputDispatcher`]).
//! - **[`backend`]**: the [`CellGrid`] output abstraction with a crossterm
//!   implementation and an in-memory one.
//! - **[`buffer`]**, **[`style`]**, **[`theme`]**, **[`geometry`]**,
//!   **[`layout`]**, **[`context`]**: cells, colors, themes and drawing helpers.
pub mod backend;
pub mod buffer;
pub mod context;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod style;
pub mod theme;
pub mod tree;

pub use backend::{CellGrid, CrosstermBackend, MemoryBackend};
pub use buffer::{Cell, FrameBuffer};
pub use context::DrawContext;
pub use engine::{FramePhase, FrameReport, FrameStats, RenderEngine};
pub use error::{RenderError, SurfaceError};
pub use geometry::Rect;
pub use layout::Direction;
pub use input::{InputDispatcher, InputEvent, KeyCode, KeyEvent, KeyModifiers};
pub use style::{Attr, Color, Style};
pub use theme::{ColorRole, Theme};
pub use tree::{NodeId, RenderTree};

#[cfg(test)]
mod tests;
