use crate::render::{ColorRole, DrawContext, Rect};
use crate::utils::truncate;

/// Ticks a message stays on the status line
pub const MESSAGE_TICKS: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Message {
    text: String,
    role: ColorRole,
    ticks_left: u32,
}

/// Footer of the dashboard frame: key help, replaced by the latest message
/// until it expires.
#[derive(Debug, Clone)]
pub struct StatusLine {
    help: &'static str,
    message: Option<Message>,
}

impl StatusLine {
    pub fn new(help: &'static str) -> Self {
        Self { help, message: None }
    }

    pub fn help(&self) -> &str {
        self.help
    }

    pub fn set_help(&mut self, help: &'static str) {
        self.help = help;
    }

    /// Show `text` for [`MESSAGE_TICKS`] ticks.
    pub fn show(&mut self, text: impl Into<String>, role: ColorRole) {
        self.message = Some(Message { text: text.into(), role, ticks_left: MESSAGE_TICKS });
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.text.as_str())
    }

    /// Count the message down. `true` when it expired on this tick.
    pub fn tick(&mut self) -> bool {
        let Some(message) = self.message.as_mut() else { return false };
        message.ticks_left = message.ticks_left.saturating_sub(1);
        if message.ticks_left == 0 {
            self.message = None;
            return true;
        }
        false
    }

    pub fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) {
        let width = usize::from(area.width);
        match &self.message {
            Some(message) => {
                let style = ctx.style(message.role);
                ctx.print(area.x, area.y, &truncate(&message.text, width), style);
            }
            None => {
                let style = ctx.style(ColorRole::Secondary);
                ctx.print(area.x, area.y, &truncate(self.help, width), style);
            }
        }
    }
}
