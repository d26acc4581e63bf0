//! Named writers built from one configuration file

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use vellum_common_config::{ConfigLoader, VellumConfig};

use crate::writer::ResponseWriter;
use crate::Result;

/// Writers by name, each initialized once and shared
#[derive(Debug, Clone, Default)]
pub struct WriterRegistry {
    writers: BTreeMap<String, Arc<ResponseWriter>>,
}

impl WriterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize every writer of `config`
    pub fn from_config(config: &VellumConfig) -> Result<Self> {
        let mut registry = Self::new();
        for (name, writer_config) in &config.writers {
            let writer = ResponseWriter::new(name.clone(), writer_config.clone())?;
            registry.insert(writer);
        }
        tracing::info!(writers = registry.len(), "writer registry ready");
        Ok(registry)
    }

    /// Load a configuration file and initialize its writers
    pub fn load(path: &Path) -> Result<Self> {
        let config = ConfigLoader::from_file(path).load_required()?;
        Self::from_config(&config)
    }

    /// Register a writer under its own name, replacing any previous one
    pub fn insert(&mut self, writer: ResponseWriter) -> Option<Arc<ResponseWriter>> {
        let name = writer.name().to_string();
        let previous = self.writers.insert(name.clone(), Arc::new(writer));
        if previous.is_some() {
            tracing::warn!(writer = %name, "writer replaced");
        }
        previous
    }

    /// Look up a writer by name
    pub fn get(&self, name: &str) -> Option<Arc<ResponseWriter>> {
        self.writers.get(name).cloned()
    }

    /// Writer names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.writers.keys().map(String::as_str)
    }

    /// Number of writers
    pub fn len(&self) -> usize {
        self.writers.len()
    }

    /// Whether no writer is registered
    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WriterError;
    use std::fs;
    use tempfile::TempDir;
    use vellum_common_config::WriterConfig;

    #[test]
    fn test_from_config() {
        let mut config = VellumConfig::default();
        config.writers.insert("velocity".into(), WriterConfig::default());
        config.writers.insert(
            "inline".into(),
            WriterConfig {
                resource_loader_enabled: true,
                ..Default::default()
            },
        );

        let registry = WriterRegistry::from_config(&config).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["inline", "velocity"]);
        assert!(registry.get("inline").unwrap().config().resource_loader_enabled);
        assert!(registry.get("json").is_none());
    }

    #[test]
    fn test_get_shares_instance() {
        let mut registry = WriterRegistry::new();
        registry.insert(ResponseWriter::new("velocity", WriterConfig::default()).unwrap());
        let a = registry.get("velocity").unwrap();
        let b = registry.get("velocity").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = WriterRegistry::load(&dir.path().join("vellum.yaml")).unwrap_err();
        assert!(matches!(err, WriterError::Configuration(_)));
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("file.vm"), "testing").unwrap();
        let yaml = format!(
            "writers:\n  velocity:\n    template-base-dir: {}\n",
            dir.path().display()
        );
        let path = dir.path().join("vellum.yaml");
        fs::write(&path, yaml).unwrap();

        let registry = WriterRegistry::load(&path).unwrap();
        let writer = registry.get("velocity").unwrap();
        assert!(writer.resolver().files().contains_key("file"));
    }
}
