use async_trait::async_trait;

use crate::capability::error::CommandError;

/// A named, runnable action.
///
/// `execute` returns the process exit code on success. Errors map to exit
/// codes in [`CommandRunner`](crate::commands::CommandRunner):
/// [`CommandError::Usage`] exits with 2, anything else with 1.
#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn help_text(&self) -> String {
        format!("{} - {}", self.name(), self.description())
    }

    async fn execute(&self, args: &[String]) -> Result<i32, CommandError>;
}

/// Name, description and usage line, for commands to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub description: String,
    pub usage: Option<String>,
}

impl CommandInfo {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into(), usage: None }
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn help_text(&self) -> String {
        match &self.usage {
            Some(usage) => format!("{} - {}\n\nUsage: {}", self.name, self.description, usage),
            None => format!("{} - {}", self.name, self.description),
        }
    }
}

/// Parse `--key value` / `--key=value` / `--flag` style options.
///
/// Returns the value for `key`, `Some("")` for a bare flag.
pub fn option_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    let long = format!("--{}", key);
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        if let Some(rest) = arg.strip_prefix(&long) {
            if let Some(value) = rest.strip_prefix('=') {
                return Some(value);
            }
            if rest.is_empty() {
                return match iter.peek() {
                    Some(next) if !next.starts_with("--") => Some(next.as_str()),
                    _ => Some(""),
                };
            }
        }
    }
    None
}
