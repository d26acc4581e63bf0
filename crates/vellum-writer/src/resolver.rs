//! Template resolution
//!
//! A template name resolves against three sources, first match wins:
//! 1. the request's `template.param.<name>` (only with
//!    `resource-loader-enabled`)
//! 2. `<name>.<ext>` under the template base directory
//! 3. the built-in set

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use vellum_common_config::WriterConfig;
use walkdir::WalkDir;

use crate::params::RequestParams;
use crate::{builtin, Result, WriterError};

/// Where a resolved template comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Source text taken from the request
    Inline(String),
    /// File under the base directory, registered under its name
    File(PathBuf),
    /// Built-in template, registered under its name
    Builtin(&'static str),
}

impl TemplateSource {
    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Inline(_) => "inline",
            Self::File(_) => "file",
            Self::Builtin(_) => "builtin",
        }
    }
}

/// Resolves template names for one writer
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    resource_loader_enabled: bool,
    base_dir: Option<PathBuf>,
    extension: String,
    dev_mode: bool,
    files: BTreeMap<String, PathBuf>,
}

impl TemplateResolver {
    /// Scan the base directory of `config` for template files
    pub fn new(config: &WriterConfig, dev_mode: bool) -> Result<Self> {
        let mut resolver = Self {
            resource_loader_enabled: config.resource_loader_enabled,
            base_dir: config.template_base_dir.clone(),
            extension: config.template_extension.clone(),
            dev_mode,
            files: BTreeMap::new(),
        };
        resolver.files = resolver.scan()?;
        Ok(resolver)
    }

    fn scan(&self) -> Result<BTreeMap<String, PathBuf>> {
        let mut files = BTreeMap::new();
        let Some(dir) = &self.base_dir else {
            return Ok(files);
        };
        if !dir.is_dir() {
            return Err(WriterError::Configuration(format!(
                "template base directory not found: {}",
                dir.display()
            )));
        }

        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|e| WriterError::Io(e.into()))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().map(|e| e != self.extension.as_str()).unwrap_or(true)
            {
                continue;
            }
            if let Some(name) = template_name(dir, path) {
                tracing::trace!(template = %name, path = %path.display(), "found template file");
                files.insert(name, path.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Resolve `name`, consulting the request for inline templates
    pub fn resolve(&self, name: &str, params: &RequestParams) -> Result<TemplateSource> {
        if self.resource_loader_enabled {
            if let Some(source) = params.inline_template(name) {
                tracing::debug!(template = %name, "resolved inline template");
                return Ok(TemplateSource::Inline(source.to_string()));
            }
        }

        self.resolve_static(name)
            .ok_or_else(|| WriterError::TemplateNotFound(name.to_string()))
    }

    /// Resolve `name` from the base directory and the built-in set only
    pub fn resolve_static(&self, name: &str) -> Option<TemplateSource> {
        if let Some(path) = self.file_path(name) {
            tracing::debug!(template = %name, path = %path.display(), "resolved file template");
            return Some(TemplateSource::File(path));
        }

        builtin::lookup(name).map(|(name, _)| {
            tracing::debug!(template = %name, "resolved built-in template");
            TemplateSource::Builtin(name)
        })
    }

    /// Source text of a file or built-in template
    pub fn read_static(&self, name: &str) -> Result<Option<String>> {
        match self.resolve_static(name) {
            Some(TemplateSource::File(path)) => Ok(Some(std::fs::read_to_string(path)?)),
            Some(TemplateSource::Builtin(name)) => Ok(builtin::get(name).map(str::to_string)),
            Some(TemplateSource::Inline(source)) => Ok(Some(source)),
            None => Ok(None),
        }
    }

    fn file_path(&self, name: &str) -> Option<PathBuf> {
        if let Some(path) = self.files.get(name) {
            return Some(path.clone());
        }
        if !self.dev_mode || !is_relative_name(name) {
            return None;
        }
        let path = self.base_dir.as_ref()?.join(format!("{name}.{}", self.extension));
        path.is_file().then_some(path)
    }

    /// Template files found at startup, by name
    pub fn files(&self) -> &BTreeMap<String, PathBuf> {
        &self.files
    }

    /// Whether file templates are re-read on every render
    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    /// Template base directory, if configured
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }
}

/// `<dir>/partials/header.vm` → `partials/header`
fn template_name(dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(dir).ok()?.with_extension("");
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

/// Only plain relative names may reach the filesystem
fn is_relative_name(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
