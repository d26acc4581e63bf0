//! Templated response writer for Vellum
//!
//! Renders an already computed query response through Handlebars templates:
//! - **Resolver**: finds a template inline in the request, in the template
//!   base directory, or in the built-in set
//! - **Macros**: inline-partial libraries (`_macros`, `VM_global_library`,
//!   `macros`) merged by name, last loaded wins
//! - **Context**: `request`, `response`, `locale` and `resource` strings
//! - **Wrapper**: optional layout and JSON callback envelope
//!
//! ## Template directory
//!
//! ```text
//! templates/
//! ├── macros.vm              custom macro library
//! ├── VM_global_library.vm   legacy macro library
//! ├── layout.vm
//! ├── browse.vm
//! ├── partials/header.vm     referenced as `partials/header`
//! ├── resources.properties
//! └── resources_en_UK.properties
//! ```

pub mod builtin;
pub mod context;
pub mod helpers;
pub mod macros;
pub mod params;
pub mod registry;
pub mod resolver;
pub mod response;
pub mod wrapper;
pub mod writer;

use std::io;

pub use context::{ContextBuilder, RenderContext};
pub use macros::{MacroDefinition, MacroRegistry};
pub use params::RequestParams;
pub use registry::WriterRegistry;
pub use resolver::{TemplateResolver, TemplateSource};
pub use response::QueryResponse;
pub use wrapper::OutputWrapper;
pub use writer::ResponseWriter;

/// Result type for writer operations
pub type Result<T> = std::result::Result<T, WriterError>;

/// Errors raised while initializing a writer or rendering a response
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// No source provides the template, or the request names none
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Template syntax or evaluation failure
    #[error("Render error in '{template}': {message}")]
    Render { template: String, message: String },

    /// Invalid writer configuration or init properties
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Response payload that is not a JSON object
    #[error("Invalid response payload: {0}")]
    InvalidResponse(String),

    /// Stream or file failure
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl WriterError {
    pub(crate) fn render(template: &str, err: impl std::fmt::Display) -> Self {
        Self::Render {
            template: template.to_string(),
            message: err.to_string(),
        }
    }

    /// The `io::ErrorKind` this error surfaces as.
    pub fn io_kind(&self) -> io::ErrorKind {
        match self {
            Self::TemplateNotFound(_) => io::ErrorKind::NotFound,
            Self::Render { .. } | Self::InvalidResponse(_) => io::ErrorKind::InvalidData,
            Self::Configuration(_) => io::ErrorKind::InvalidInput,
            Self::Io(e) => e.kind(),
        }
    }
}

impl From<WriterError> for io::Error {
    fn from(err: WriterError) -> Self {
        match err {
            WriterError::Io(e) => e,
            other => io::Error::new(other.io_kind(), other),
        }
    }
}

impl From<vellum_common_config::ConfigError> for WriterError {
    fn from(err: vellum_common_config::ConfigError) -> Self {
        match err {
            vellum_common_config::ConfigError::ReadError { source } => Self::Io(source),
            other => Self::Configuration(other.to_string()),
        }
    }
}

impl From<vellum_common_i18n::I18nError> for WriterError {
    fn from(err: vellum_common_i18n::I18nError) -> Self {
        match err {
            vellum_common_i18n::I18nError::LoadError { source, .. } => Self::Io(source),
            other => Self::Configuration(other.to_string()),
        }
    }
}
