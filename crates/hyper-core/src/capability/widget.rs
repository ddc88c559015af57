use crate::render::{ColorRole, DrawContext, InputEvent, Rect, RenderError};
use crate::utils::truncate;

/// A drawable, optionally interactive, dashboard element.
pub trait Widget {
    /// Draw into `area`. Writes outside it are clipped.
    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<(), RenderError>;

    /// Handle one event; `true` when consumed.
    fn handle_input(&mut self, _event: &InputEvent) -> bool {
        false
    }

    /// Smallest (width, height) the widget can draw in.
    fn minimum_size(&self) -> (u16, u16) {
        (1, 1)
    }

    fn focusable(&self) -> bool {
        true
    }

    /// Periodic update between frames; `true` when the widget needs a redraw.
    fn tick(&mut self) -> bool {
        false
    }
}

/// Title bar, border and error placeholder shared by framed widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetChrome {
    title: String,
    error: Option<String>,
}

impl WidgetChrome {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), error: None }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Border and title; returns the inner area.
    pub fn draw_frame(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Rect {
        let role = if ctx.is_focused() { ColorRole::Primary } else { ColorRole::Border };
        let border = ctx.style(role);
        ctx.draw_box(area, border);
        if !self.title.is_empty() && area.width > 4 {
            let title = truncate(&format!(" {} ", self.title), usize::from(area.width - 4));
            let style = ctx.style(ColorRole::Accent);
            ctx.print(area.x + 2, area.y, &title, style);
        }
        area.inset(1)
    }

    pub fn draw_error(&self, ctx: &mut DrawContext<'_>, area: Rect) {
        if let Some(message) = &self.error {
            let style = ctx.style(ColorRole::Error);
            let text = truncate(&format!("Error: {}", message), usize::from(area.width));
            ctx.print(area.x, area.y, &text, style);
        }
    }

    /// Frame, then either the error placeholder or `body` in the inner area.
    pub fn draw_with<F>(&self, ctx: &mut DrawContext<'_>, area: Rect, body: F) -> Result<(), RenderError>
    where
        F: FnOnce(&mut DrawContext<'_>, Rect) -> Result<(), RenderError>,
    {
        let inner = self.draw_frame(ctx, area);
        if inner.is_empty() {
            return Ok(());
        }
        if self.has_error() {
            self.draw_error(ctx, inner);
            return Ok(());
        }
        body(ctx, inner)
    }
}
