//! Macro libraries
//!
//! A library is a template holding `{{#*inline "name"}}…{{/inline}}` blocks.
//! Libraries load in a fixed order and later definitions replace earlier
//! ones by name, so install-specific macros override the built-in ones.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::resolver::TemplateResolver;
use crate::{builtin, Result};

/// Legacy global library, kept for older template directories
pub const LEGACY_LIBRARY: &str = "VM_global_library";
/// Install-specific library
pub const CUSTOM_LIBRARY: &str = "macros";

/// Libraries in load order; later ones win
pub const LIBRARY_ORDER: [&str; 3] = [builtin::MACROS, LEGACY_LIBRARY, CUSTOM_LIBRARY];

static INLINE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)\{\{(~?)#\*inline\s+"([^"]+)"\s*(~?)\}\}(.*?)\{\{(~?)/inline\s*(~?)\}\}"#,
    )
    .expect("inline block pattern is valid")
});

/// One macro and the library that defined it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub body: String,
    pub library: String,
}

/// Merged macros of every loaded library
#[derive(Debug, Clone, Default)]
pub struct MacroRegistry {
    macros: BTreeMap<String, MacroDefinition>,
}

impl MacroRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every library in [`LIBRARY_ORDER`]. Missing libraries are skipped.
    pub fn load(resolver: &TemplateResolver) -> Result<Self> {
        let mut registry = Self::new();
        for library in LIBRARY_ORDER {
            match resolver.read_static(library)? {
                Some(source) => {
                    let count = registry.load_library(library, &source);
                    tracing::debug!(library, macros = count, "loaded macro library");
                }
                None => tracing::trace!(library, "macro library not present"),
            }
        }
        Ok(registry)
    }

    /// Merge the macros of one library, returning how many it defined
    pub fn load_library(&mut self, library: &str, source: &str) -> usize {
        let blocks = parse_library(source);
        let count = blocks.len();
        for (name, body) in blocks {
            let definition = MacroDefinition {
                body,
                library: library.to_string(),
            };
            if let Some(previous) = self.macros.insert(name.clone(), definition) {
                tracing::debug!(
                    macro_name = %name,
                    from = %previous.library,
                    to = %library,
                    "macro overridden"
                );
            }
        }
        count
    }

    /// Look up a macro
    pub fn get(&self, name: &str) -> Option<&MacroDefinition> {
        self.macros.get(name)
    }

    /// Macros by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MacroDefinition)> {
        self.macros.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of macros
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    /// Whether no macro is defined
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

/// Extract `(name, body)` pairs from a library, in source order.
///
/// `~` on the opening tag trims leading whitespace of the body and `~` on
/// the closing tag trims trailing whitespace.
pub fn parse_library(source: &str) -> Vec<(String, String)> {
    INLINE_BLOCK
        .captures_iter(source)
        .map(|cap| {
            let name = cap[2].to_string();
            let mut body = &cap[4];
            if !cap[3].is_empty() {
                body = body.trim_start();
            }
            if !cap[5].is_empty() {
                body = body.trim_end();
            }
            (name, body.to_string())
        })
        .collect()
}
