use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{info, warn};

use hyper_core::commands::ExitStatus;
use hyper_core::config::ConfigData;
use hyper_core::dashboard::TerminalEvents;
use hyper_core::kernel::constants::DEFAULT_LOG_LEVEL;
use hyper_core::kernel::error::Result;
use hyper_core::plugin_system::{OutcomeStatus, PluginCatalog, PluginOutcome, PluginSystemError};
use hyper_core::render::backend::{CrosstermBackend, TerminalSession};
use hyper_core::Application;

use crate::logging;

/// Hyper: plugin commands and a terminal dashboard
#[derive(Parser, Debug)]
#[command(name = "hyper", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Options file (JSON, YAML or TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Plugin search root; repeat for more. Replaces the configured roots
    #[arg(long = "plugin-path", value_name = "DIR")]
    pub plugin_paths: Vec<PathBuf>,

    /// Dashboard theme
    #[arg(long)]
    pub theme: Option<String>,

    /// Log level filter (RUST_LOG wins when set)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Discover plugins without loading them
    #[arg(long)]
    pub no_discovery: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a plugin command
    Run {
        /// Command name
        name: String,
        /// Arguments passed to the command as-is
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Open the interactive dashboard
    Dashboard {
        /// Start on this page instead of the widgets
        #[arg(long)]
        page: Option<String>,
    },
    /// Show what happened to every discovered plugin
    Plugins,
    /// List registered commands
    Commands,
}

/// Every plugin crate linked into the binary
pub fn catalog() -> std::result::Result<PluginCatalog, PluginSystemError> {
    PluginCatalog::new()
        .with(hello_world::catalog_entry())?
        .with(system_status::catalog_entry())
}

/// Options map: the config file, then command line overrides.
pub async fn build_options(args: &CliArgs) -> Result<ConfigData> {
    let mut options = match &args.config {
        Some(path) => ConfigData::load_file(path).await?,
        None => ConfigData::new(),
    };
    if !args.plugin_paths.is_empty() {
        options.set("plugin_search_paths", &args.plugin_paths)?;
    }
    if let Some(theme) = &args.theme {
        options.set("theme", theme)?;
    }
    if let Some(level) = &args.log_level {
        options.set("log_level", level)?;
    }
    if args.no_discovery {
        options.set("auto_discovery", false)?;
    }
    Ok(options)
}

pub fn log_level(options: &ConfigData) -> String {
    options.get_or("log_level", DEFAULT_LOG_LEVEL.to_string())
}

/// Start the application, run the subcommand, always shut down.
pub async fn execute(command: Commands, options: ConfigData) -> Result<i32> {
    let mut app = Application::new(options, catalog()?)?;
    let result = match app.start().await {
        Ok(outcomes) => dispatch(&app, command, &outcomes).await,
        Err(e) => Err(e),
    };
    let report = app.shutdown();
    for error in &report.errors {
        warn!("{}", error);
    }
    result
}

async fn dispatch(app: &Application, command: Commands, outcomes: &[PluginOutcome]) -> Result<i32> {
    match command {
        Commands::Run { name, args } => {
            let outcome = app.run_command(&name, args).await?;
            if let Some(message) = &outcome.error {
                eprintln!("hyper: {}", message);
            }
            Ok(outcome.code)
        }
        Commands::Dashboard { page } => run_dashboard(app, page.as_deref()),
        Commands::Plugins => {
            print_plugins(app, outcomes);
            Ok(ExitStatus::SUCCESS)
        }
        Commands::Commands => {
            print_commands(app);
            Ok(ExitStatus::SUCCESS)
        }
    }
}

fn run_dashboard(app: &Application, page: Option<&str>) -> Result<i32> {
    let mut session = TerminalSession::enter()?;
    logging::mute(true);
    let result = tokio::task::block_in_place(|| -> Result<_> {
        let mut grid = CrosstermBackend::stdout()?;
        let mut events = TerminalEvents::new();
        app.run_dashboard(&mut events, &mut grid, page)
    });
    let restored = session.leave();
    logging::mute(false);
    restored?;
    let summary = result?;
    info!("Dashboard rendered {} frame(s), {} cell(s)", summary.frames, summary.cells_written);
    Ok(ExitStatus::SUCCESS)
}

fn status_text(status: &OutcomeStatus) -> String {
    match status {
        OutcomeStatus::Loaded => "loaded".to_string(),
        OutcomeStatus::AlreadyLoaded => "already loaded".to_string(),
        OutcomeStatus::Shadowed => "shadowed".to_string(),
        OutcomeStatus::Failed(e) => format!("failed: {}", e),
    }
}

fn print_plugins(app: &Application, outcomes: &[PluginOutcome]) {
    if outcomes.is_empty() {
        let errors = app.registry().discovery_errors().len();
        println!("No plugins loaded ({} discovery error(s))", errors);
        return;
    }
    let summaries = app.registry().plugins();
    for outcome in outcomes {
        let version = summaries
            .iter()
            .find(|s| s.name == outcome.name && s.location == outcome.location)
            .map(|s| s.version.as_str())
            .unwrap_or("-");
        println!(
            "{:<20} {:<8} {:<40} {}",
            outcome.name,
            version,
            status_text(&outcome.status),
            outcome.location.display()
        );
    }
}

fn print_commands(app: &Application) {
    let names = app.registry().list_commands();
    if names.is_empty() {
        println!("No commands registered");
        return;
    }
    for name in names {
        let description = app.registry().get_command(&name).map(|c| c.description().to_string()).unwrap_or_default();
        let owner = app.capabilities().owner_of(hyper_core::ComponentKind::Command, &name).unwrap_or_default();
        println!("{:<16} {:<40} ({})", name, description, owner);
    }
}
