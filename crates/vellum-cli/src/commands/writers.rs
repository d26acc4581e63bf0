//! Writers command.

use std::io::{self, Write};

use clap::{Args, ValueEnum};
use vellum_writer::WriterRegistry;

use crate::cli::CommandContext;
use crate::error::CliError;

/// Listing format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    #[default]
    Text,
    Json,
}

/// List configured writers
#[derive(Debug, Args)]
pub struct WritersCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = ListFormat::Text)]
    pub format: ListFormat,

    /// Initialize every writer to validate templates and bundles
    #[arg(long)]
    pub check: bool,
}

impl WritersCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        if self.check {
            let registry = WriterRegistry::from_config(&ctx.config)?;
            tracing::info!(
                config = %ctx.config_path.display(),
                writers = registry.len(),
                "all writers initialized"
            );
        }

        let out = match self.format {
            ListFormat::Json => serde_json::to_string_pretty(&ctx.config.writers)
                .map_err(|e| CliError::validation(e.to_string()))?,
            ListFormat::Text => ctx
                .config
                .writers
                .iter()
                .map(|(name, config)| {
                    let base_dir = config
                        .template_base_dir
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "-".to_string());
                    let inline = if config.resource_loader_enabled {
                        "inline"
                    } else {
                        "no-inline"
                    };
                    format!("{name}\t{base_dir}\t{inline}")
                })
                .collect::<Vec<_>>()
                .join("\n"),
        };

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{out}").map_err(|e| CliError::io("failed to write to stdout", e))
    }
}
