//! Example plugin: the `hello` command and the `greeting` widget.
use async_trait::async_trait;
use log::info;

use hyper_core::capability::command::option_value;
use hyper_core::capability::{Command, CommandError, CommandInfo, ComponentSet, Widget, WidgetChrome};
use hyper_core::container::ServiceContainer;
use hyper_core::plugin_system::{CatalogEntry, EntryPoints, Plugin, PluginError, PluginMetadata};
use hyper_core::render::{ColorRole, DrawContext, InputEvent, KeyCode, Rect, RenderError};

pub const PLUGIN_NAME: &str = "hello-world";
pub const PLUGIN_VERSION: &str = "0.1.0";
const DESCRIPTION: &str = "Greets from the command line and the dashboard";

/// Upper bound for `--count`
pub const MAX_COUNT: usize = 20;

const GREETINGS: &[&str] = &["Hello", "Hola", "Bonjour", "Hallo", "Ciao", "Konnichiwa"];

/// Catalog entry the binary registers; metadata is readable before loading.
pub fn catalog_entry() -> CatalogEntry {
    CatalogEntry::new(PLUGIN_NAME, HelloWorldPlugin::new).with_metadata(metadata())
}

pub fn metadata() -> PluginMetadata {
    PluginMetadata {
        name: PLUGIN_NAME.to_string(),
        version: PLUGIN_VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        author: "Hyper Developers".to_string(),
        dependencies: Vec::new(),
        entry_points: EntryPoints {
            commands: vec!["hello".to_string()],
            widgets: vec!["greeting".to_string()],
            ..EntryPoints::default()
        },
    }
}

#[derive(Debug, Default)]
pub struct HelloWorldPlugin {
    initialized: bool,
}

impl HelloWorldPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for HelloWorldPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        PLUGIN_VERSION
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn author(&self) -> &str {
        "Hyper Developers"
    }

    fn initialize(&mut self, _container: &ServiceContainer) -> Result<(), PluginError> {
        info!("Initializing {} v{}", PLUGIN_NAME, PLUGIN_VERSION);
        self.initialized = true;
        Ok(())
    }

    fn register(&self) -> ComponentSet {
        ComponentSet::new().command(HelloCommand::new()).widget("greeting", GreetingWidget::new)
    }

    fn shutdown(&mut self) -> Result<(), PluginError> {
        if self.initialized {
            info!("Shutting down {}", PLUGIN_NAME);
            self.initialized = false;
        }
        Ok(())
    }
}

// ===== COMMAND =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreetingStyle {
    Plain,
    Shout,
}

impl GreetingStyle {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "plain" => Some(GreetingStyle::Plain),
            "shout" => Some(GreetingStyle::Shout),
            _ => None,
        }
    }
}

/// Parsed `hello` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelloOptions {
    pub name: String,
    pub count: usize,
    pub style: GreetingStyle,
}

impl HelloOptions {
    pub fn parse(args: &[String]) -> Result<Self, CommandError> {
        let name = match option_value(args, "name") {
            Some("") => return Err(CommandError::Usage("--name needs a value".to_string())),
            Some(name) => name.to_string(),
            None => "world".to_string(),
        };
        let count = match option_value(args, "count") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_COUNT).contains(n))
                .ok_or_else(|| CommandError::Usage(format!("--count must be between 1 and {}", MAX_COUNT)))?,
            None => 1,
        };
        let style = match option_value(args, "style") {
            Some(raw) => GreetingStyle::parse(raw)
                .ok_or_else(|| CommandError::Usage(format!("unknown style '{}' (plain, shout)", raw)))?,
            None => GreetingStyle::Plain,
        };
        Ok(Self { name, count, style })
    }

    pub fn lines(&self) -> Vec<String> {
        let line = match self.style {
            GreetingStyle::Plain => format!("Hello, {}!", self.name),
            GreetingStyle::Shout => format!("HELLO, {}!", self.name.to_uppercase()),
        };
        vec![line; self.count]
    }
}

pub struct HelloCommand {
    info: CommandInfo,
}

impl HelloCommand {
    pub fn new() -> Self {
        Self {
            info: CommandInfo::new("hello", "Print a greeting")
                .with_usage("hello [--name NAME] [--count N] [--style plain|shout]"),
        }
    }
}

impl Default for HelloCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for HelloCommand {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn help_text(&self) -> String {
        self.info.help_text()
    }

    async fn execute(&self, args: &[String]) -> Result<i32, CommandError> {
        if option_value(args, "help").is_some() {
            println!("{}", self.help_text());
            return Ok(0);
        }
        let options = HelloOptions::parse(args)?;
        for line in options.lines() {
            println!("{}", line);
        }
        Ok(0)
    }
}

// ===== WIDGET =====

/// Cycles through greetings in a few languages.
pub struct GreetingWidget {
    chrome: WidgetChrome,
    index: usize,
}

impl GreetingWidget {
    pub fn new() -> Self {
        Self { chrome: WidgetChrome::new("Greeting"), index: 0 }
    }

    pub fn greeting(&self) -> &'static str {
        GREETINGS[self.index]
    }

    fn step(&mut self, forward: bool) {
        let len = GREETINGS.len();
        self.index = if forward { (self.index + 1) % len } else { (self.index + len - 1) % len };
    }
}

impl Default for GreetingWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for GreetingWidget {
    fn draw(&self, ctx: &mut DrawContext<'_>, area: Rect) -> Result<(), RenderError> {
        self.chrome.draw_with(ctx, area, |ctx, inner| {
            let text = ctx.style(ColorRole::Text);
            ctx.print(inner.x, inner.y, &format!("{}, world!", self.greeting()), text);
            if inner.height > 1 {
                let hint = ctx.style(ColorRole::Secondary);
                ctx.print(inner.x, inner.y + 1, "Up/Down to change", hint);
            }
            Ok(())
        })
    }

    fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event.code() {
            Some(KeyCode::Up) | Some(KeyCode::Enter) => self.step(true),
            Some(KeyCode::Down) => self.step(false),
            _ => return false,
        }
        true
    }

    fn minimum_size(&self) -> (u16, u16) {
        (20, 3)
    }
}
