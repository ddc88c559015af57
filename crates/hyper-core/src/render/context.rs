use crate::render::buffer::{char_width, Cell, FrameBuffer};
use crate::render::geometry::Rect;
use crate::render::style::Style;
use crate::render::theme::{ColorRole, Theme};

const HORIZONTAL: char = '─';
const VERTICAL: char = '│';
const TOP_LEFT: char = '┌';
const TOP_RIGHT: char = '┐';
const BOTTOM_LEFT: char = '└';
const BOTTOM_RIGHT: char = '┘';

/// Drawing surface handed to a widget. Writes outside the clip are dropped.
pub struct DrawContext<'a> {
    buffer: &'a mut FrameBuffer,
    theme: &'a Theme,
    clip: Rect,
    focused: bool,
}

impl<'a> DrawContext<'a> {
    pub fn new(buffer: &'a mut FrameBuffer, theme: &'a Theme, clip: Rect, focused: bool) -> Self {
        let clip = clip.intersection(buffer.area());
        Self { buffer, theme, clip, focused }
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    pub fn theme(&self) -> &Theme {
        self.theme
    }

    pub fn style(&self, role: ColorRole) -> Style {
        self.theme.style(role)
    }

    /// Whether the widget being drawn holds input focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Write one glyph. A wide glyph needs both of its columns inside the clip.
    pub fn set(&mut self, x: u16, y: u16, ch: char, style: Style) -> bool {
        let cell = Cell::new(ch, style);
        let last = x.saturating_add(cell.width().max(1) - 1);
        self.clip.contains(x, y) && self.clip.contains(last, y) && self.buffer.set(x, y, cell)
    }

    /// Print `text` from (x, y) on one row, stopping at the first glyph that
    /// does not fit. Zero-width characters are skipped. Returns the number of
    /// columns written.
    pub fn print(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        let mut written = 0;
        let mut col = x;
        for ch in text.chars() {
            let width = char_width(ch);
            if width == 0 {
                continue;
            }
            if u32::from(col) + u32::from(width) > u32::from(self.clip.right()) {
                break;
            }
            if self.set(col, y, ch, style) {
                written += width;
            }
            col = col.saturating_add(width);
        }
        written
    }

    pub fn fill(&mut self, area: Rect, ch: char, style: Style) {
        let area = area.intersection(self.clip);
        self.buffer.fill(area, Cell::new(ch, style));
    }

    /// Single-line box along the edge of `area`.
    pub fn draw_box(&mut self, area: Rect, style: Style) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let (left, top) = (area.x, area.y);
        let (right, bottom) = (area.right() - 1, area.bottom() - 1);
        for x in left + 1..right {
            self.set(x, top, HORIZONTAL, style);
            self.set(x, bottom, HORIZONTAL, style);
        }
        for y in top + 1..bottom {
            self.set(left, y, VERTICAL, style);
            self.set(right, y, VERTICAL, style);
        }
        self.set(left, top, TOP_LEFT, style);
        self.set(right, top, TOP_RIGHT, style);
        self.set(left, bottom, BOTTOM_LEFT, style);
        self.set(right, bottom, BOTTOM_RIGHT, style);
    }
}
