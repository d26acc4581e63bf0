//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use vellum_common_config::{vars, ConfigLoader, VellumConfig};
use vellum_common_log::LogLevel;

use crate::commands::{RenderCommand, WritersCommand};
use crate::error::CliError;

/// Vellum - templated search response writer
///
/// Renders query responses through Handlebars templates.
#[derive(Debug, Parser)]
#[command(
    name = "vellum",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase verbosity level; overrides VELLUM_LOG_LEVEL and RUST_LOG"
    )]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error output; overrides VELLUM_LOG_LEVEL and RUST_LOG"
    )]
    pub quiet: bool,

    /// Path to the writer configuration file
    #[arg(
        short,
        long,
        global = true,
        env = vars::VELLUM_CONFIG,
        default_value = "vellum.yaml",
        value_hint = ValueHint::FilePath,
        help = "Path to writer configuration file"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render a query response through a configured writer
    Render(RenderCommand),

    /// List configured writers
    Writers(WritersCommand),
}

/// Shared state handed to every command
#[derive(Debug)]
pub struct CommandContext {
    pub config_path: PathBuf,
    pub config: VellumConfig,
}

impl Cli {
    /// Log level requested by `-v`/`-q`, if any
    pub fn log_level(&self) -> Option<LogLevel> {
        match self.verbose {
            0 if self.quiet => Some(LogLevel::Error),
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }

    /// Load the writer configuration file
    pub fn load_config(&self) -> Result<VellumConfig, CliError> {
        ConfigLoader::from_file(&self.config)
            .load_required()
            .map_err(CliError::from)
    }

    /// Execute the selected command
    pub fn execute(&self) -> Result<(), CliError> {
        let ctx = CommandContext {
            config_path: self.config.clone(),
            config: self.load_config()?,
        };

        match &self.command {
            Command::Render(cmd) => cmd.execute(&ctx),
            Command::Writers(cmd) => cmd.execute(&ctx),
        }
    }
}
