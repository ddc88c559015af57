use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{
    Attribute as CtAttribute, Color as CtColor, Print, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use unicode_width::UnicodeWidthChar;

use crate::render::backend::CellGrid;
use crate::render::error::SurfaceError;
use crate::render::style::{Attr, Color, Style};

/// Raw mode plus alternate screen for as long as the value lives.
pub struct TerminalSession {
    active: bool,
}

impl TerminalSession {
    pub fn enter() -> Result<Self, SurfaceError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        log::debug!("Entered alternate screen");
        Ok(Self { active: true })
    }

    /// Current terminal size
    pub fn size() -> Result<(u16, u16), SurfaceError> {
        Ok(terminal::size()?)
    }

    /// Restore the terminal. Also runs on drop.
    pub fn leave(&mut self) -> Result<(), SurfaceError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        let mut stdout = io::stdout();
        execute!(stdout, Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}

/// Writes cells with crossterm commands, queued until `flush`.
pub struct CrosstermBackend<W: Write> {
    out: W,
    size: (u16, u16),
    /// Where the terminal cursor is after the last print
    cursor: Option<(u16, u16)>,
    current: Option<Style>,
}

impl CrosstermBackend<Stdout> {
    pub fn stdout() -> Result<Self, SurfaceError> {
        Ok(Self::new(io::stdout(), TerminalSession::size()?))
    }
}

impl<W: Write> CrosstermBackend<W> {
    pub fn new(out: W, size: (u16, u16)) -> Self {
        Self { out, size, cursor: None, current: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn apply_style(&mut self, style: Style) -> io::Result<()> {
        queue!(
            self.out,
            SetAttribute(CtAttribute::Reset),
            SetForegroundColor(to_crossterm_color(style.fg)),
            SetBackgroundColor(to_crossterm_color(style.bg))
        )?;
        for (flag, attribute) in ATTRIBUTES {
            if style.attrs.contains(*flag) {
                queue!(self.out, SetAttribute(*attribute))?;
            }
        }
        self.current = Some(style);
        Ok(())
    }
}

const ATTRIBUTES: &[(Attr, CtAttribute)] = &[
    (Attr::BOLD, CtAttribute::Bold),
    (Attr::UNDERLINE, CtAttribute::Underlined),
    (Attr::REVERSE, CtAttribute::Reverse),
    (Attr::BLINK, CtAttribute::SlowBlink),
    (Attr::DIM, CtAttribute::Dim),
    (Attr::STANDOUT, CtAttribute::Reverse),
];

impl<W: Write> CellGrid for CrosstermBackend<W> {
    fn size(&self) -> (u16, u16) {
        self.size
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) -> Result<(), SurfaceError> {
        let (width, height) = self.size;
        if x >= width || y >= height {
            return Err(SurfaceError::OutOfBounds { x, y, width, height });
        }
        if self.cursor != Some((x, y)) {
            queue!(self.out, MoveTo(x, y))?;
        }
        if self.current != Some(style) {
            self.apply_style(style)?;
        }
        queue!(self.out, Print(ch))?;
        let advance = ch.width().unwrap_or(0) as u16;
        self.cursor = Some((x.saturating_add(advance), y));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SurfaceError> {
        self.out.flush()?;
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.cursor = None;
    }
}

pub fn to_crossterm_color(color: Color) -> CtColor {
    match color {
        Color::Reset => CtColor::Reset,
        Color::Black => CtColor::Black,
        Color::Red => CtColor::DarkRed,
        Color::Green => CtColor::DarkGreen,
        Color::Yellow => CtColor::DarkYellow,
        Color::Blue => CtColor::DarkBlue,
        Color::Magenta => CtColor::DarkMagenta,
        Color::Cyan => CtColor::DarkCyan,
        Color::White => CtColor::White,
        Color::Gray => CtColor::Grey,
        Color::DarkGray => CtColor::DarkGrey,
        Color::Rgb(r, g, b) => CtColor::Rgb { r, g, b },
        Color::Indexed(i) => CtColor::AnsiValue(i),
    }
}
