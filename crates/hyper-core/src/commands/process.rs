//! External programs run on behalf of a command.
//!
//! Output is always captured. [`Subprocess::stream`] also hands every line
//! to a callback while the program runs, for long jobs whose progress should
//! show up as it happens. Children are killed when the future running them
//! is dropped, so an interrupted command leaves nothing behind.
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::process::Command as ProcessCommand;

use crate::capability::CommandError;
use crate::commands::ExitStatus;

/// Which pipe a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the program was ended by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(ExitStatus::SUCCESS)
    }

    /// Code to exit with; a signal counts as a general error.
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(ExitStatus::GENERAL_ERROR)
    }
}

/// One program invocation
#[derive(Debug, Clone)]
pub struct Subprocess {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl Subprocess {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new(), cwd: None, env: Vec::new() }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    fn command(&self) -> ProcessCommand {
        let mut command = ProcessCommand::new(&self.program);
        command
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        command
    }

    fn failure(&self, action: &str, e: std::io::Error) -> CommandError {
        CommandError::Failed(format!("cannot {} '{}': {}", action, self.program, e))
    }

    /// Run to completion and capture both pipes.
    pub async fn output(&self) -> Result<ProcessOutput, CommandError> {
        log::debug!("Running '{}' with {} argument(s)", self.program, self.args.len());
        let output = self.command().output().await.map_err(|e| self.failure("run", e))?;
        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run to completion, passing each output line (without its line break)
    /// to `on_line` as soon as it is read. The captured text joins the lines
    /// of each pipe with `\n`.
    pub async fn stream<F>(&self, mut on_line: F) -> Result<ProcessOutput, CommandError>
    where
        F: FnMut(Stream, &str),
    {
        log::debug!("Streaming '{}' with {} argument(s)", self.program, self.args.len());
        let mut child = self.command().spawn().map_err(|e| self.failure("start", e))?;
        let mut stdout = child.stdout.take().map(|pipe| BufReader::new(pipe).lines());
        let mut stderr = child.stderr.take().map(|pipe| BufReader::new(pipe).lines());
        let (mut out_lines, mut err_lines) = (Vec::new(), Vec::new());

        while stdout.is_some() || stderr.is_some() {
            let (stream, line) = tokio::select! {
                line = next_line(&mut stdout) => (Stream::Stdout, line),
                line = next_line(&mut stderr) => (Stream::Stderr, line),
            };
            match (stream, line) {
                (Stream::Stdout, None) => stdout = None,
                (Stream::Stderr, None) => stderr = None,
                (stream, Some(line)) => {
                    on_line(stream, &line);
                    match stream {
                        Stream::Stdout => out_lines.push(line),
                        Stream::Stderr => err_lines.push(line),
                    }
                }
            }
        }

        let status = child.wait().await.map_err(|e| self.failure("wait for", e))?;
        Ok(ProcessOutput {
            code: status.code(),
            stdout: out_lines.join("\n"),
            stderr: err_lines.join("\n"),
        })
    }
}

/// Next line of an open pipe. A closed pipe never yields; a read error
/// closes it.
async fn next_line<R>(lines: &mut Option<Lines<R>>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    let Some(reader) = lines.as_mut() else {
        return std::future::pending().await;
    };
    match reader.next_line().await {
        Ok(line) => line,
        Err(e) => {
            log::warn!("Dropping unreadable process output: {}", e);
            None
        }
    }
}
