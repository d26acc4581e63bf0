//! Configuration file loading and parsing.

use crate::types::{InitProperties, VellumConfig, WriterConfig};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Default configuration file name inside a project directory.
pub const CONFIG_FILE_NAME: &str = "vellum.yaml";

/// `${VAR}` or `${VAR:-default}`.
static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is valid")
});

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

impl ConfigError {
    fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    fn parse(e: serde_yaml::Error) -> Self {
        Self::ParseError {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        }
    }
}

/// Configuration loader.
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for `vellum.yaml` inside the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            config_path: project_dir.as_ref().join(CONFIG_FILE_NAME),
        }
    }

    /// Create a loader for an explicit configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Path this loader reads from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load the configuration, returning defaults if the file is absent.
    pub fn load(&self) -> Result<VellumConfig, ConfigError> {
        if !self.config_path.exists() {
            return Ok(VellumConfig::default());
        }
        self.load_required()
    }

    /// Load the configuration, failing if the file is absent.
    pub fn load_required(&self) -> Result<VellumConfig, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound {
                path: self.config_path.clone(),
            });
        }

        let contents = std::fs::read_to_string(&self.config_path)?;
        let expanded = expand_env_vars(&contents)?;

        let config: VellumConfig = serde_yaml::from_str(&expanded).map_err(ConfigError::parse)?;

        self.validate(&config)?;
        Ok(config)
    }

    /// Validate configuration values.
    fn validate(&self, config: &VellumConfig) -> Result<(), ConfigError> {
        for (name, writer) in &config.writers {
            if name.trim().is_empty() {
                return Err(ConfigError::validation("writer names must not be empty"));
            }
            validate_writer(writer)
                .map_err(|e| ConfigError::validation(format!("writer '{name}': {e}")))?;
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in ENV_VAR_PATTERN.captures_iter(content) {
        let Some(full_match) = cap.get(0) else {
            continue;
        };
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match.as_str(), &value);
    }

    Ok(result)
}

/// Check a single writer's values.
pub fn validate_writer(writer: &WriterConfig) -> Result<(), ConfigError> {
    if writer.template_extension.is_empty() || writer.template_extension.starts_with('.') {
        return Err(ConfigError::validation(
            "template-extension must be non-empty and must not start with '.'",
        ));
    }

    if writer.content_type.trim().is_empty() {
        return Err(ConfigError::validation("content-type must not be empty"));
    }

    if let Some(dir) = &writer.template_base_dir {
        if !dir.is_dir() {
            return Err(ConfigError::validation(format!(
                "template-base-dir is not a directory: {}",
                dir.display()
            )));
        }
    }

    Ok(())
}

/// Load init properties from a YAML file.
pub fn load_init_properties(path: &Path) -> Result<InitProperties, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(ConfigError::parse)
}

impl WriterConfig {
    /// Build a writer configuration from string init args, the form a host
    /// server hands to a plugin.
    ///
    /// Init properties use an `init-properties.` prefix, e.g.
    /// `init-properties.loop-counter = false`.
    pub fn from_init_args<I, K, V>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = WriterConfig::default();

        for (key, value) in args {
            let key = key.as_ref();
            let value = value.as_ref();
            match key {
                "resource-loader-enabled" => {
                    config.resource_loader_enabled = parse_bool(key, value)?;
                }
                "template-base-dir" => config.template_base_dir = Some(PathBuf::from(value)),
                "template-extension" => config.template_extension = value.to_string(),
                "init-properties-file" => {
                    config.init_properties_file = Some(PathBuf::from(value));
                }
                "default-locale" => config.default_locale = Some(value.to_string()),
                "content-type" => config.content_type = value.to_string(),
                _ => match key.strip_prefix("init-properties.") {
                    Some(prop) => {
                        let flag = parse_bool(key, value)?;
                        if !config.init_properties.set(prop, flag) {
                            return Err(ConfigError::validation(format!(
                                "unknown init property: {prop}"
                            )));
                        }
                    }
                    None => {
                        return Err(ConfigError::validation(format!(
                            "unknown writer option: {key}"
                        )))
                    }
                },
            }
        }

        validate_writer(&config)?;
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::validation(format!(
            "{key} expects a boolean, got '{value}'"
        ))),
    }
}
