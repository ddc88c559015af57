//! Output surfaces the render engine presents to.
pub mod memory;
pub mod terminal;

use crate::render::error::SurfaceError;
use crate::render::style::Style;

pub use memory::MemoryBackend;
pub use terminal::{CrosstermBackend, TerminalSession};

/// Minimal cell-addressable output surface
pub trait CellGrid {
    /// Columns and rows
    fn size(&self) -> (u16, u16);

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) -> Result<(), SurfaceError>;

    fn flush(&mut self) -> Result<(), SurfaceError>;

    /// Follow a change of the underlying surface size
    fn resize(&mut self, width: u16, height: u16);
}
