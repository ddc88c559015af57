//! Built-in `init` command: lay out a `.hyper` project directory.
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::capability::command::option_value;
use crate::capability::{Command, CommandError, CommandInfo};
use crate::kernel::constants::{DEFAULT_LOG_LEVEL, DEFAULT_PLUGINS_DIR, DEFAULT_THEME, PROJECT_DIR};

pub const INIT_COMMAND: &str = "init";

const EXAMPLE_PLUGIN_DIR: &str = "hello_world";
const EXAMPLE_PLUGIN_ENTRY: &str = "hello-world";

const GITIGNORE: &str = "# Hyper runtime files\n*.log\ncache/\n";

const EXAMPLE_DESCRIPTOR: &str = "\
name: hello-world
version: 0.1.0
description: Greets from the command line and the dashboard
author: Hyper Developers
entry_points:
  commands:
    - hello
  widgets:
    - greeting
";

fn options_file() -> String {
    format!(
        "# Hyper options, pass with --config\n\
         plugin_search_paths:\n  - {}\n\
         auto_discovery: true\n\
         theme: {}\n\
         log_level: {}\n",
        DEFAULT_PLUGINS_DIR, DEFAULT_THEME, DEFAULT_LOG_LEVEL
    )
}

/// Creates `.hyper/` below its root: an options file, a `.gitignore` and a
/// plugin directory holding the hello-world example.
pub struct InitCommand {
    info: CommandInfo,
    root: PathBuf,
}

impl InitCommand {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            info: CommandInfo::new(INIT_COMMAND, "Initialize a Hyper project in the working directory")
                .with_usage("init [--force]"),
            root: root.into(),
        }
    }

    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Write the project files and return their paths. An existing project
    /// directory is only overwritten with `force`.
    pub async fn scaffold(&self, force: bool) -> Result<Vec<PathBuf>, CommandError> {
        let project = self.project_dir();
        if !force && tokio::fs::try_exists(&project).await.unwrap_or(false) {
            return Err(CommandError::Failed(format!(
                "{} already exists; use --force to overwrite",
                project.display()
            )));
        }

        let example = self.root.join(DEFAULT_PLUGINS_DIR).join(EXAMPLE_PLUGIN_DIR);
        let files = [
            (project.join("config.yaml"), options_file()),
            (project.join(".gitignore"), GITIGNORE.to_string()),
            (example.join("plugin.entry"), format!("{}\n", EXAMPLE_PLUGIN_ENTRY)),
            (example.join("plugin.yaml"), EXAMPLE_DESCRIPTOR.to_string()),
        ];
        let mut written = Vec::with_capacity(files.len());
        for (path, contents) in files {
            write_file(&path, &contents).await?;
            written.push(path);
        }
        log::info!("Initialized project in {}", project.display());
        Ok(written)
    }
}

async fn write_file(path: &Path, contents: &str) -> Result<(), CommandError> {
    let failed = |e: std::io::Error| CommandError::Failed(format!("cannot write {}: {}", path.display(), e));
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(failed)?;
    }
    tokio::fs::write(path, contents).await.map_err(failed)
}

#[async_trait]
impl Command for InitCommand {
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
        if let Some(unknown) = args.iter().find(|a| a.as_str() != "--force") {
            return Err(CommandError::Usage(format!("unexpected argument '{}'", unknown)));
        }
        let force = option_value(args, "force").is_some();
        for path in self.scaffold(force).await? {
            let shown = path.strip_prefix(&self.root).unwrap_or(&path);
            println!("created {}", shown.display());
        }
        println!("Run `hyper --config {}/config.yaml plugins` to see the example plugin.", PROJECT_DIR);
        Ok(0)
    }
}
