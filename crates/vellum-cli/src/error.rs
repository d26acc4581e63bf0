//! CLI error handling.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use vellum_common_config::ConfigError;
use vellum_writer::WriterError;

use crate::Exit;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
        path: Option<PathBuf>,
    },

    #[error("{message}")]
    NotFound {
        message: String,
        resource_type: String,
        resource_name: String,
        suggestions: Vec<String>,
    },

    #[error("{message}")]
    Render { message: String, template: String },

    #[error("{message}")]
    Validation { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> Exit {
        match self {
            Self::Config { .. } => Exit::ConfigError,
            Self::Io { .. } => Exit::IoError,
            Self::NotFound { .. } => Exit::NotFound,
            Self::Render { .. } => Exit::RenderError,
            Self::Validation { .. } => Exit::GeneralError,
        }
    }

    /// Extra line printed under the message
    pub fn context(&self) -> Option<String> {
        match self {
            Self::Io {
                path: Some(path), ..
            } => Some(format!("path: {}", path.display())),
            Self::Render { template, .. } => Some(format!("template: {template}")),
            Self::NotFound {
                resource_type,
                resource_name,
                suggestions,
                ..
            } if !suggestions.is_empty() => Some(format!(
                "'{resource_name}' is not a configured {resource_type}; available:"
            )),
            _ => None,
        }
    }

    /// Get suggestions for this error
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::NotFound { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
            path: None,
        }
    }

    /// Create an IO error with path
    pub fn io_with_path(
        message: impl Into<String>,
        source: io::Error,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source,
            path: Some(path.into()),
        }
    }

    /// Create a not found error
    pub fn not_found(resource_type: impl Into<String>, resource_name: impl Into<String>) -> Self {
        let resource_type = resource_type.into();
        let resource_name = resource_name.into();
        Self::NotFound {
            message: format!("{resource_type} '{resource_name}' not found"),
            resource_type,
            resource_name,
            suggestions: Vec::new(),
        }
    }

    /// Attach suggestions to a not found error
    pub fn with_suggestions(mut self, items: impl IntoIterator<Item = String>) -> Self {
        if let Self::NotFound { suggestions, .. } = &mut self {
            suggestions.extend(items);
        }
        self
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<WriterError> for CliError {
    fn from(err: WriterError) -> Self {
        match err {
            WriterError::TemplateNotFound(name) => Self::not_found("template", name),
            WriterError::Render { template, message } => Self::Render {
                message: format!("render error in '{template}': {message}"),
                template,
            },
            WriterError::Configuration(message) => Self::config(message),
            WriterError::InvalidResponse(message) => {
                Self::validation(format!("invalid query response: {message}"))
            }
            WriterError::Io(source) => Self::io(source.to_string(), source),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ReadError { source } => {
                Self::io(format!("failed to read configuration: {source}"), source)
            }
            other => Self::Config {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
