//! Configuration types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default file extension for templates and macro libraries.
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "vm";

/// Default content type of rendered responses.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html;charset=UTF-8";

/// Root configuration: every named writer the host registers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VellumConfig {
    /// Writer configurations keyed by writer name.
    pub writers: BTreeMap<String, WriterConfig>,
}

/// Configuration of a single response writer instance.
///
/// Parsed once when the writer is initialized and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct WriterConfig {
    /// Allow inline per-request templates (`template.param.<name>`).
    pub resource_loader_enabled: bool,
    /// Filesystem root for file-backed templates, macro libraries and
    /// resource bundles.
    pub template_base_dir: Option<PathBuf>,
    /// Extension of file-backed templates, without the leading dot.
    pub template_extension: String,
    /// Engine-level toggles.
    pub init_properties: InitProperties,
    /// YAML file holding additional init properties. Relative paths are
    /// resolved against `template_base_dir`.
    pub init_properties_file: Option<PathBuf>,
    /// Locale used when the request does not name one.
    pub default_locale: Option<String>,
    /// Content type reported for non-JSON responses.
    pub content_type: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            resource_loader_enabled: false,
            template_base_dir: None,
            template_extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
            init_properties: InitProperties::default(),
            init_properties_file: None,
            default_locale: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

impl WriterConfig {
    /// Path of `init_properties_file`, resolved against the base directory.
    pub fn init_properties_path(&self) -> Option<PathBuf> {
        let file = self.init_properties_file.as_ref()?;
        if file.is_absolute() {
            return Some(file.clone());
        }
        Some(match &self.template_base_dir {
            Some(base) => base.join(file),
            None => file.clone(),
        })
    }
}

/// Engine init properties.
///
/// Every field is optional so that a properties file and inline properties
/// can be layered; the accessors supply the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct InitProperties {
    /// Expose the implicit `@index` loop counter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_counter: Option<bool>,
    /// Treat missing variables as render errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_mode: Option<bool>,
    /// HTML-escape `{{expr}}` output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escape_html: Option<bool>,
    /// Re-read file templates on every render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_mode: Option<bool>,
}

impl InitProperties {
    /// Whether `@index` is visible inside `{{#each}}`.
    pub fn loop_counter(&self) -> bool {
        self.loop_counter.unwrap_or(true)
    }

    /// Whether missing variables fail the render.
    pub fn strict_mode(&self) -> bool {
        self.strict_mode.unwrap_or(false)
    }

    /// Whether expression output is HTML-escaped.
    pub fn escape_html(&self) -> bool {
        self.escape_html.unwrap_or(false)
    }

    /// Whether file templates are reloaded per render.
    pub fn dev_mode(&self) -> bool {
        self.dev_mode.unwrap_or(false)
    }

    /// Layer `self` over `base`: values set in `self` win.
    pub fn over(self, base: InitProperties) -> InitProperties {
        InitProperties {
            loop_counter: self.loop_counter.or(base.loop_counter),
            strict_mode: self.strict_mode.or(base.strict_mode),
            escape_html: self.escape_html.or(base.escape_html),
            dev_mode: self.dev_mode.or(base.dev_mode),
        }
    }

    /// Set a property from its string form, as found in host init args.
    pub fn set(&mut self, key: &str, value: bool) -> bool {
        let slot = match key {
            "loop-counter" => &mut self.loop_counter,
            "strict-mode" => &mut self.strict_mode,
            "escape-html" => &mut self.escape_html,
            "dev-mode" => &mut self.dev_mode,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_defaults() {
        let config = WriterConfig::default();
        assert!(!config.resource_loader_enabled);
        assert!(config.template_base_dir.is_none());
        assert_eq!(config.template_extension, "vm");
        assert_eq!(config.content_type, "text/html;charset=UTF-8");
        assert!(config.init_properties.loop_counter());
        assert!(!config.init_properties.strict_mode());
        assert!(!config.init_properties.escape_html());
        assert!(!config.init_properties.dev_mode());
    }

    #[test]
    fn test_init_properties_layering() {
        let file = InitProperties {
            loop_counter: Some(false),
            strict_mode: Some(true),
            ..Default::default()
        };
        let inline = InitProperties {
            strict_mode: Some(false),
            ..Default::default()
        };

        let merged = inline.over(file);
        assert!(!merged.loop_counter());
        assert!(!merged.strict_mode());
    }

    #[test]
    fn test_init_property_set_rejects_unknown() {
        let mut props = InitProperties::default();
        assert!(props.set("loop-counter", false));
        assert!(!props.set("foreach-counter", false));
        assert!(!props.loop_counter());
    }

    #[test]
    fn test_init_properties_path_resolution() {
        let config = WriterConfig {
            template_base_dir: Some(PathBuf::from("/srv/templates")),
            init_properties_file: Some(PathBuf::from("init.yaml")),
            ..Default::default()
        };
        assert_eq!(
            config.init_properties_path(),
            Some(PathBuf::from("/srv/templates/init.yaml"))
        );

        let absolute = WriterConfig {
            init_properties_file: Some(PathBuf::from("/etc/vellum/init.yaml")),
            ..config
        };
        assert_eq!(
            absolute.init_properties_path(),
            Some(PathBuf::from("/etc/vellum/init.yaml"))
        );
    }
}
