use std::future::Future;
use std::sync::Arc;

use crate::capability::{CapabilityRegistry, CommandError};
use crate::commands::ExitStatus;

/// Exit code plus the single-line message to show the user, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub code: i32,
    pub error: Option<String>,
}

impl CommandOutcome {
    fn code(code: i32) -> Self {
        Self { code, error: None }
    }

    fn failed(code: i32, message: impl Into<String>) -> Self {
        Self { code, error: Some(message.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.code == ExitStatus::SUCCESS
    }
}

pub struct CommandRunner {
    capabilities: Arc<CapabilityRegistry>,
}

impl CommandRunner {
    pub fn new(capabilities: Arc<CapabilityRegistry>) -> Self {
        Self { capabilities }
    }

    /// Run `name`, aborting on Ctrl-C.
    pub async fn run(&self, name: &str, args: Vec<String>) -> CommandOutcome {
        self.run_until(name, args, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run `name` until it finishes or `interrupt` resolves.
    pub async fn run_until<F>(&self, name: &str, args: Vec<String>, interrupt: F) -> CommandOutcome
    where
        F: Future<Output = ()>,
    {
        let Some(command) = self.capabilities.command(name) else {
            return CommandOutcome::failed(ExitStatus::GENERAL_ERROR, format!("Unknown command: {}", name));
        };

        log::info!("Running command '{}' with {} argument(s)", name, args.len());
        let mut task = tokio::spawn(async move { command.execute(&args).await });

        tokio::select! {
            joined = &mut task => match joined {
                Ok(Ok(code)) => CommandOutcome::code(code),
                Ok(Err(CommandError::Usage(message))) => CommandOutcome::failed(
                    ExitStatus::APPLICATION_ERROR,
                    format!("{}: invalid usage: {}", name, message),
                ),
                Ok(Err(e)) => CommandOutcome::failed(ExitStatus::GENERAL_ERROR, format!("{}: {}", name, e)),
                Err(e) if e.is_panic() => {
                    log::error!("Command '{}' panicked", name);
                    CommandOutcome::failed(ExitStatus::GENERAL_ERROR, format!("{}: command panicked", name))
                }
                Err(e) => CommandOutcome::failed(ExitStatus::GENERAL_ERROR, format!("{}: {}", name, e)),
            },
            _ = interrupt => {
                task.abort();
                // Wait for the task to be dropped, which kills any child it spawned.
                let _ = task.await;
                log::info!("Command '{}' interrupted", name);
                CommandOutcome::failed(ExitStatus::INTERRUPTED, "Interrupted")
            }
        }
    }
}
