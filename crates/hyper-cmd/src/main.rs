mod cli;
mod logging;

use std::process::ExitCode;

use clap::Parser;

use hyper_core::commands::ExitStatus;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    let options = match cli::build_options(&args).await {
        Ok(options) => options,
        Err(e) => {
            eprintln!("hyper: {}", e);
            return exit_code(ExitStatus::GENERAL_ERROR);
        }
    };
    if let Err(e) = logging::init(&cli::log_level(&options)) {
        eprintln!("hyper: {}", e);
        return exit_code(ExitStatus::GENERAL_ERROR);
    }

    match cli::execute(args.command, options).await {
        Ok(code) => exit_code(code),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("hyper: {}", e);
            exit_code(ExitStatus::GENERAL_ERROR)
        }
    }
}

/// Codes outside 0..=255 become a general error.
fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(ExitStatus::GENERAL_ERROR as u8))
}
