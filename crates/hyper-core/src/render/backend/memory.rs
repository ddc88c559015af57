use crate::render::backend::CellGrid;
use crate::render::buffer::{Cell, FrameBuffer};
use crate::render::error::SurfaceError;
use crate::render::style::Style;

/// In-memory surface that records what was written.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    screen: FrameBuffer,
    writes: usize,
    flushes: usize,
    /// Fail the write after this many successful ones
    fail_after: Option<usize>,
}

impl MemoryBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self { screen: FrameBuffer::new(width, height), writes: 0, flushes: 0, fail_after: None }
    }

    pub fn screen(&self) -> &FrameBuffer {
        &self.screen
    }

    pub fn cell(&self, x: u16, y: u16) -> Option<Cell> {
        self.screen.get(x, y).copied()
    }

    pub fn row_text(&self, y: u16) -> String {
        self.screen.row_text(y)
    }

    /// Successful `set_cell` calls since the last reset.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }

    pub fn reset_counters(&mut self) {
        self.writes = 0;
        self.flushes = 0;
    }

    /// Make the write after the next `writes` successful ones fail.
    pub fn fail_after(&mut self, writes: usize) {
        self.fail_after = Some(self.writes + writes);
    }

    pub fn clear_failure(&mut self) {
        self.fail_after = None;
    }
}

impl CellGrid for MemoryBackend {
    fn size(&self) -> (u16, u16) {
        self.screen.size()
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) -> Result<(), SurfaceError> {
        if self.fail_after.is_some_and(|limit| self.writes >= limit) {
            return Err(SurfaceError::Backend("injected write failure".to_string()));
        }
        if !self.screen.set(x, y, Cell::new(ch, style)) {
            let (width, height) = self.screen.size();
            return Err(SurfaceError::OutOfBounds { x, y, width, height });
        }
        self.writes += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SurfaceError> {
        self.flushes += 1;
        Ok(())
    }

    /// The contents are lost like on a real terminal.
    fn resize(&mut self, width: u16, height: u16) {
        self.screen.resize(width, height);
    }
}
