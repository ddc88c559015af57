//! stderr logging for the binary.
//!
//! The library and plugins log through the `log` facade; `LogTracer` forwards
//! those records to a `tracing` fmt subscriber. The level comes from the
//! options map and `RUST_LOG` overrides it.
use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

static MUTED: AtomicBool = AtomicBool::new(false);

/// Writes to stderr unless muted.
struct Console;

impl<'a> MakeWriter<'a> for Console {
    type Writer = Box<dyn Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        if MUTED.load(Ordering::Relaxed) {
            Box::new(io::sink())
        } else {
            Box::new(io::stderr())
        }
    }
}

pub fn init(level: &str) -> Result<(), String> {
    tracing_log::LogTracer::init().map_err(|e| format!("cannot bridge log records: {}", e))?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| format!("invalid log level '{}': {}", level, e))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Console)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init()
        .map_err(|e| format!("cannot install logger: {}", e))?;
    tracing::debug!(filter = level, "logging initialized");
    Ok(())
}

/// Drop log output while the dashboard owns the terminal.
pub fn mute(muted: bool) {
    MUTED.store(muted, Ordering::Relaxed);
}
