use bitflags::bitflags;

/// Terminal color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Reset,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    DarkGray,
    Rgb(u8, u8, u8),
    Indexed(u8),
}

bitflags! {
    /// Text attributes
    #[derive(Default)]
    pub struct Attr: u8 {
        const BOLD      = 0b0000_0001;
        const UNDERLINE = 0b0000_0010;
        const REVERSE   = 0b0000_0100;
        const BLINK     = 0b0000_1000;
        const DIM       = 0b0001_0000;
        const STANDOUT  = 0b0010_0000;
    }
}

/// Foreground, background and attributes of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Style {
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self { fg, bg, attrs: Attr::empty() }
    }

    pub fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    pub fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    pub fn add(mut self, attrs: Attr) -> Self {
        self.attrs.insert(attrs);
        self
    }

    pub fn remove(mut self, attrs: Attr) -> Self {
        self.attrs.remove(attrs);
        self
    }
}
