use unicode_width::UnicodeWidthChar;

use crate::render::geometry::Rect;
use crate::render::style::{Color, Style};

/// Stored in the column covered by the right half of a wide glyph
const CONTINUATION: char = '\u{1}';

/// One screen cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    /// Never produced by drawing; a front buffer filled with it differs from
    /// every real frame, which forces a full repaint.
    pub(crate) const SENTINEL: Cell = Cell { ch: '\0', style: Style::new(Color::Reset, Color::Reset) };

    pub fn new(ch: char, style: Style) -> Self {
        Self { ch: sanitize(ch), style }
    }

    /// Right half of a wide glyph. Never presented.
    pub(crate) fn continuation(style: Style) -> Self {
        Self { ch: CONTINUATION, style }
    }

    pub fn is_continuation(&self) -> bool {
        self.ch == CONTINUATION
    }

    /// Terminal columns taken by this cell: 2 for wide glyphs, 0 for a
    /// continuation.
    pub fn width(&self) -> u16 {
        if self.is_continuation() {
            0
        } else {
            char_width(self.ch)
        }
    }
}

/// Display columns of `ch`; zero-width and control characters count 0.
pub fn char_width(ch: char) -> u16 {
    ch.width().map_or(0, |w| w.min(2) as u16)
}

impl Default for Cell {
    fn default() -> Self {
        Self { ch: ' ', style: Style::default() }
    }
}

/// Control and zero-width characters would desync the terminal cursor;
/// draw them as blanks.
fn sanitize(ch: char) -> char {
    if char_width(ch) == 0 { ' ' } else { ch }
}

/// A cell that differs between two frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

/// Row-major grid of cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(usize::from(y) * usize::from(self.width) + usize::from(x))
        } else {
            None
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Write a cell; `false` when out of bounds or when a wide glyph has no
    /// room for its right half. A wide glyph also claims the next column, and
    /// any glyph left half-overwritten is blanked.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        let Some(i) = self.index(x, y) else { return false };
        if cell.is_continuation() {
            self.cells[i] = cell;
            return true;
        }
        let wide = cell.width() == 2;
        if wide && x.saturating_add(1) >= self.width {
            return false;
        }
        self.split_at(x, y);
        self.cells[i] = cell;
        if wide {
            self.split_at(x + 1, y);
            self.cells[i + 1] = Cell::continuation(cell.style);
        }
        true
    }

    /// Blank whatever wide glyph overlaps column `x`, so the column can be
    /// rewritten without leaving half a glyph behind.
    fn split_at(&mut self, x: u16, y: u16) {
        let Some(i) = self.index(x, y) else { return };
        let current = self.cells[i];
        if current.is_continuation() && x > 0 {
            let left = i - 1;
            self.cells[left] = Cell::new(' ', self.cells[left].style);
            self.cells[i] = Cell::new(' ', current.style);
        } else if current.width() == 2 {
            if let Some(next) = self.index(x + 1, y) {
                if self.cells[next].is_continuation() {
                    self.cells[next] = Cell::new(' ', current.style);
                }
            }
        }
    }

    pub fn fill(&mut self, area: Rect, cell: Cell) {
        let area = area.intersection(self.area());
        let step = cell.width().max(1);
        for y in area.rows() {
            let mut x = area.x;
            while x.saturating_add(step) <= area.right() {
                self.set(x, y, cell);
                x = x.saturating_add(step);
            }
        }
    }

    /// Overwrite every cell.
    pub fn reset(&mut self, cell: Cell) {
        self.cells.iter_mut().for_each(|c| *c = cell);
    }

    /// Resize, discarding contents.
    pub fn resize(&mut self, width: u16, height: u16) {
        *self = FrameBuffer::new(width, height);
    }

    /// Cells where `self` differs from `previous`, in row-major order.
    /// Buffers of different sizes differ everywhere.
    pub fn diff(&self, previous: &FrameBuffer) -> Vec<CellChange> {
        let same_size = self.size() == previous.size();
        let width = usize::from(self.width.max(1));
        self.cells
            .iter()
            .enumerate()
            .filter(|(i, cell)| !same_size || previous.cells[*i] != **cell)
            .map(|(i, cell)| CellChange {
                x: (i % width) as u16,
                y: (i / width) as u16,
                cell: *cell,
            })
            .collect()
    }

    /// Write back a change list produced by [`diff`](Self::diff), cell for
    /// cell.
    pub fn apply(&mut self, changes: &[CellChange]) {
        for change in changes {
            if let Some(i) = self.index(change.x, change.y) {
                self.cells[i] = change.cell;
            }
        }
    }

    /// Characters of row `y` as the terminal shows them, for tests and
    /// debugging.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .filter(|c| !c.is_continuation())
            .map(|c| c.ch)
            .collect()
    }
}
