use std::collections::HashMap;

use crate::render::style::{Attr, Color, Style};

/// Semantic color roles widgets draw with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Default,
    Primary,
    Secondary,
    Accent,
    Warning,
    Error,
    Success,
    Info,
    Border,
    HeaderBg,
    Selected,
    Disabled,
    Background,
    Text,
}

/// Role -> style mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    name: String,
    styles: HashMap<ColorRole, Style>,
}

const AVAILABLE: &[&str] = &["default", "dark"];

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), styles: HashMap::new() }
    }

    pub fn with(mut self, role: ColorRole, style: Style) -> Self {
        self.styles.insert(role, style);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Style for `role`, falling back to the `Default` role.
    pub fn style(&self, role: ColorRole) -> Style {
        self.styles
            .get(&role)
            .or_else(|| self.styles.get(&ColorRole::Default))
            .copied()
            .unwrap_or_default()
    }

    /// Built-in theme by name.
    pub fn named(name: &str) -> Option<Theme> {
        match name {
            "default" => Some(Theme::default_theme()),
            "dark" => Some(Theme::dark()),
            _ => None,
        }
    }

    pub fn available() -> &'static [&'static str] {
        AVAILABLE
    }

    pub fn default_theme() -> Theme {
        Theme::new("default")
            .with(ColorRole::Default, Style::new(Color::White, Color::Reset))
            .with(ColorRole::Primary, Style::new(Color::Cyan, Color::Reset))
            .with(ColorRole::Secondary, Style::new(Color::Magenta, Color::Reset))
            .with(ColorRole::Accent, Style::new(Color::Yellow, Color::Reset))
            .with(ColorRole::Warning, Style::new(Color::Yellow, Color::Reset).add(Attr::BOLD))
            .with(ColorRole::Error, Style::new(Color::White, Color::Red).add(Attr::BOLD))
            .with(ColorRole::Success, Style::new(Color::Green, Color::Reset))
            .with(ColorRole::Info, Style::new(Color::Blue, Color::Reset))
            .with(ColorRole::Border, Style::new(Color::Cyan, Color::Reset))
            .with(ColorRole::HeaderBg, Style::new(Color::White, Color::Blue).add(Attr::BOLD))
            .with(ColorRole::Selected, Style::new(Color::Black, Color::Cyan))
            .with(ColorRole::Disabled, Style::new(Color::DarkGray, Color::Reset).add(Attr::DIM))
            .with(ColorRole::Background, Style::new(Color::Reset, Color::Reset))
            .with(ColorRole::Text, Style::new(Color::White, Color::Reset))
    }

    pub fn dark() -> Theme {
        let bg = Color::Rgb(24, 24, 32);
        Theme::new("dark")
            .with(ColorRole::Default, Style::new(Color::Gray, bg))
            .with(ColorRole::Primary, Style::new(Color::Rgb(122, 162, 247), bg))
            .with(ColorRole::Secondary, Style::new(Color::Rgb(187, 154, 247), bg))
            .with(ColorRole::Accent, Style::new(Color::Rgb(224, 175, 104), bg))
            .with(ColorRole::Warning, Style::new(Color::Rgb(224, 175, 104), bg).add(Attr::BOLD))
            .with(ColorRole::Error, Style::new(Color::Rgb(247, 118, 142), bg).add(Attr::BOLD))
            .with(ColorRole::Success, Style::new(Color::Rgb(158, 206, 106), bg))
            .with(ColorRole::Info, Style::new(Color::Rgb(125, 207, 255), bg))
            .with(ColorRole::Border, Style::new(Color::DarkGray, bg))
            .with(ColorRole::HeaderBg, Style::new(Color::White, Color::Rgb(41, 46, 66)).add(Attr::BOLD))
            .with(ColorRole::Selected, Style::new(Color::Black, Color::Rgb(122, 162, 247)))
            .with(ColorRole::Disabled, Style::new(Color::DarkGray, bg).add(Attr::DIM))
            .with(ColorRole::Background, Style::new(Color::Gray, bg))
            .with(ColorRole::Text, Style::new(Color::White, bg))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::default_theme()
    }
}
