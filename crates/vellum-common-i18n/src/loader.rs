//! Resource bundle loading.
//!
//! Bundles are `.properties` files named `<base>[_<suffix>].properties`.
//! All bundles of a directory are read once; resolving a locale afterwards
//! only merges in-memory catalogs.

use super::{Catalog, I18nError, Locale};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Base name of resource bundles, as in `resources_en_UK.properties`.
pub const DEFAULT_BUNDLE_NAME: &str = "resources";

const BUNDLE_EXTENSION: &str = "properties";

/// Every bundle of one base name, keyed by locale suffix (`""` is root).
#[derive(Debug, Clone, Default)]
pub struct ResourceBundles {
    base_name: String,
    bundles: HashMap<String, Catalog>,
}

impl ResourceBundles {
    /// An empty set; every lookup resolves to an empty catalog.
    pub fn empty() -> Self {
        Self {
            base_name: DEFAULT_BUNDLE_NAME.to_string(),
            bundles: HashMap::new(),
        }
    }

    /// Load all `<base_name>*.properties` files from `dir`.
    ///
    /// A missing directory yields an empty set.
    pub fn load_dir(dir: &Path, base_name: &str) -> Result<Self, I18nError> {
        let mut bundles = HashMap::new();

        if dir.is_dir() {
            let entries = fs::read_dir(dir).map_err(|source| I18nError::LoadError {
                path: dir.to_path_buf(),
                source,
            })?;

            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e != BUNDLE_EXTENSION).unwrap_or(true) {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let Some(suffix) = bundle_suffix(stem, base_name) else {
                    continue;
                };

                let content = fs::read_to_string(&path).map_err(|source| I18nError::LoadError {
                    path: path.clone(),
                    source,
                })?;
                let catalog = parse_properties(&content);
                tracing::debug!(bundle = %stem, messages = catalog.len(), "loaded resource bundle");
                bundles.insert(suffix.to_string(), catalog);
            }
        }

        Ok(Self {
            base_name: base_name.to_string(),
            bundles,
        })
    }

    /// Base name these bundles were loaded for.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Number of bundle files loaded.
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Whether no bundle was found.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Merge root and every bundle on the locale's fallback chain, more
    /// specific bundles overriding less specific ones.
    pub fn resolve(&self, locale: &Locale) -> Catalog {
        let mut catalog = self.bundles.get("").cloned().unwrap_or_default();
        for suffix in locale.fallback_chain().iter().rev() {
            if let Some(bundle) = self.bundles.get(suffix) {
                catalog.extend_from(bundle);
            }
        }
        catalog
    }
}

/// `resources` → `""`, `resources_en_UK` → `"en_UK"`, others → `None`.
fn bundle_suffix<'a>(stem: &'a str, base_name: &str) -> Option<&'a str> {
    let rest = stem.strip_prefix(base_name)?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix('_').filter(|s| !s.is_empty())
}

/// Parse `.properties` content.
///
/// Supports `=`, `:` and whitespace separators, `#`/`!` comments,
/// backslash line continuations and the `\t \n \r \\ \uXXXX` escapes.
pub fn parse_properties(content: &str) -> Catalog {
    let mut catalog = Catalog::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let mut logical = line.trim_start().to_string();
        if logical.is_empty() || logical.starts_with('#') || logical.starts_with('!') {
            continue;
        }

        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical);
        catalog.insert(unescape(key), unescape(value));
    }

    catalog
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..i], line[i + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[i..].trim_start();
                let rest = rest
                    .strip_prefix(['=', ':'])
                    .map(str::trim_start)
                    .unwrap_or(rest);
                return (&line[..i], rest);
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}
