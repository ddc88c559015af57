use crate::render::{DrawContext, InputEvent, Rect, RenderError};

/// Navigation requested by a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    Back,
    Exit,
    Open(String),
}

/// A full-screen view.
pub trait Page {
    fn title(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<(), RenderError>;

    /// `None` keeps the page open.
    fn handle_input(&mut self, event: &InputEvent) -> Option<PageAction>;

    fn refresh(&mut self) {}

    fn on_enter(&mut self) {}

    fn on_exit(&mut self) {}
}
