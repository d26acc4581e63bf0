//! Vellum CLI
//!
//! Main entry point for the `vellum` binary.

use std::process::ExitCode;

use clap::Parser;
use vellum_common_log::{LogConfig, LogLevel};

mod cli;
mod commands;
mod error;

use cli::Cli;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    IoError = 3,
    NotFound = 4,
    RenderError = 5,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let dotenv_files = vellum_common_config::load_dotenv();

    let cli = Cli::parse();
    init_logging(&cli);
    tracing::debug!(files = ?dotenv_files, "loaded .env files");

    match cli.execute() {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            eprintln!("error: {e}");
            if let Some(context) = e.context() {
                eprintln!("  {context}");
            }
            for suggestion in e.suggestions() {
                eprintln!("  - {suggestion}");
            }
            e.exit_code().into()
        }
    }
}

fn init_logging(cli: &Cli) {
    // -v/-q win over VELLUM_LOG_LEVEL, which wins over RUST_LOG.
    let mut config = LogConfig::from_env();
    match cli.log_level() {
        Some(level) => config = config.with_level(level),
        None if !config.explicit_level && std::env::var_os("RUST_LOG").is_none() => {
            config.level = LogLevel::Warn;
        }
        None => {}
    }

    if let Err(e) = vellum_common_log::init(config) {
        eprintln!("warning: {e}");
    }
}
