//! Render command.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Args;
use tracing::info;
use vellum_common_config::vars;
use vellum_writer::{QueryResponse, RequestParams, ResponseWriter};

use crate::cli::CommandContext;
use crate::error::CliError;

/// Render a query response through a configured writer
#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Writer to render with
    #[arg(short, long, env = vars::VELLUM_WRITER, default_value = "velocity")]
    pub writer: String,

    /// Request parameter as `name=value`, repeatable
    #[arg(short, long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// JSON file holding the query response, `-` for stdin
    #[arg(short, long, value_name = "FILE")]
    pub response: Option<PathBuf>,

    /// Write the rendered body to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let config = ctx.config.writers.get(&self.writer).ok_or_else(|| {
            CliError::not_found("writer", &self.writer)
                .with_suggestions(ctx.config.writers.keys().cloned())
        })?;

        let writer = ResponseWriter::new(self.writer.clone(), config.clone())?;
        let params: RequestParams = self.params.iter().cloned().collect();
        let response = self.read_response()?;

        info!(
            writer = %self.writer,
            content_type = writer.content_type(&params),
            "rendering response"
        );

        let body = writer.render(&params, &response)?;
        match &self.output {
            Some(path) => fs::write(path, body).map_err(|e| {
                CliError::io_with_path(format!("failed to write {}", path.display()), e, path)
            })?,
            None => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(body.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(|e| CliError::io("failed to write to stdout", e))?;
            }
        }
        Ok(())
    }

    fn read_response(&self) -> Result<QueryResponse, CliError> {
        let json = match self.response.as_deref() {
            None => return Ok(QueryResponse::new()),
            Some(path) if path.as_os_str() == "-" => {
                let mut buf = String::new();
                io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|e| CliError::io("failed to read stdin", e))?;
                buf
            }
            Some(path) => fs::read_to_string(path).map_err(|e| {
                CliError::io_with_path(format!("failed to read {}", path.display()), e, path)
            })?,
        };

        Ok(QueryResponse::from_json(&json)?)
    }
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))
}
