//! Internationalization support for Vellum.
//!
//! Templates see locale-specific strings through resource bundles
//! (`resources.properties`, `resources_en.properties`,
//! `resources_en_UK.properties`, ...) resolved with a most-specific-first
//! fallback chain, and format numbers with the locale's separators.

pub mod detect;
pub mod format;
pub mod loader;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use detect::detect_locale;
pub use format::{NumberFormat, MAX_FRACTION_DIGITS};
pub use loader::{parse_properties, ResourceBundles, DEFAULT_BUNDLE_NAME};

/// A locale identifier: language, optional country, optional variant.
///
/// Accepts BCP-47-like tags with either separator, so `en-US` and `en_US`
/// are the same locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    language: String,
    country: Option<String>,
    variant: Option<String>,
}

impl Locale {
    /// Parse from a locale string (e.g., "en-US", "ja_JP", "de").
    ///
    /// An empty country segment followed by a variant (`de__1996`) is the
    /// form [`Display`](fmt::Display) writes for a variant without country.
    pub fn parse(s: &str) -> Result<Self, I18nError> {
        let invalid = || I18nError::InvalidLocale(s.to_string());

        let mut parts = s.trim().split(['-', '_']).peekable();
        let language = parts.next().filter(|l| is_alpha(l, 2..=3)).ok_or_else(invalid)?;

        let mut country = None;
        if parts.next_if_eq(&"").is_some() {
            if parts.peek().is_none() {
                return Err(invalid());
            }
        } else if let Some(part) = parts.next_if(|p| is_alpha(p, 2..=2) || is_digits(p, 3)) {
            country = Some(part.to_uppercase());
        }

        let mut variant = Vec::new();
        for part in parts {
            if part.is_empty() {
                return Err(invalid());
            }
            variant.push(part);
        }

        Ok(Self {
            language: language.to_lowercase(),
            country,
            variant: (!variant.is_empty()).then(|| variant.join("_")),
        })
    }

    /// Lowercase language code.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Uppercase country code, if any.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Variant, if any.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Bundle suffixes from most to least specific, root excluded:
    /// `en_UK_x` → `["en_UK_x", "en_UK", "en"]`.
    pub fn fallback_chain(&self) -> Vec<String> {
        let mut chain = Vec::with_capacity(3);
        if let (Some(country), Some(variant)) = (&self.country, &self.variant) {
            chain.push(format!("{}_{}_{}", self.language, country, variant));
        } else if let Some(variant) = &self.variant {
            chain.push(format!("{}__{}", self.language, variant));
        }
        if let Some(country) = &self.country {
            chain.push(format!("{}_{}", self.language, country));
        }
        chain.push(self.language.clone());
        chain
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            country: None,
            variant: None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if let Some(country) = &self.country {
            write!(f, "_{country}")?;
        }
        if let Some(variant) = &self.variant {
            if self.country.is_none() {
                f.write_str("_")?;
            }
            write!(f, "_{variant}")?;
        }
        Ok(())
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_alpha(s: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_digit())
}

/// Message catalog: the resolved key → string table for one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    messages: BTreeMap<String, String>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a translated message.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(|s| s.as_str())
    }

    /// Add a message.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.messages.insert(key.into(), value.into());
    }

    /// Overlay `other` onto this catalog; entries in `other` win.
    pub fn extend_from(&mut self, other: &Catalog) {
        for (key, value) in &other.messages {
            self.messages.insert(key.clone(), value.clone());
        }
    }

    /// All messages in key order.
    pub fn messages(&self) -> &BTreeMap<String, String> {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the catalog holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// i18n errors.
#[derive(Debug, thiserror::Error)]
pub enum I18nError {
    #[error("failed to load bundle {path}: {source}")]
    LoadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid locale: {0}")]
    InvalidLocale(String),
}
