//! Request parameters

use serde::Serialize;
use std::collections::BTreeMap;

/// Name of the template to render
pub const TEMPLATE: &str = "template";
/// Prefix of inline template parameters: `template.param.<name>`
pub const TEMPLATE_PARAM_PREFIX: &str = "template.param.";
/// Locale tag for resource strings and number formatting
pub const LOCALE: &str = "locale";
/// Name of the layout template wrapping the output
pub const LAYOUT: &str = "layout";
/// Set to `false` to skip the layout even when one is named
pub const LAYOUT_ENABLED: &str = "layout.enabled";
/// JSON callback name
pub const JSON_WRAPPER: &str = "json.wrapper";
/// Content type override
pub const CONTENT_TYPE: &str = "content.type";

/// Ordered multi-valued request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    params: Vec<(String, String)>,
}

impl RequestParams {
    /// Create empty parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Builder-style [`add`](Self::add)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    /// First value of a parameter
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// First value parsed as a boolean; anything other than `true`/`false`
    /// (case-insensitive) is `None`.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        let value = self.get(name)?.trim();
        if value.eq_ignore_ascii_case("true") {
            Some(true)
        } else if value.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    /// First value, ignoring blank ones
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Requested template name
    pub fn template(&self) -> Option<&str> {
        self.get_non_empty(TEMPLATE)
    }

    /// Inline template source for `name`
    pub fn inline_template(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| n.strip_prefix(TEMPLATE_PARAM_PREFIX) == Some(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over all name/value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no parameter is set
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Templates see `params` (first value per name) and `multi` (all values)
    pub(crate) fn view(&self) -> RequestView<'_> {
        let mut params = BTreeMap::new();
        let mut multi: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (name, value) in &self.params {
            params.entry(name.as_str()).or_insert(value.as_str());
            multi.entry(name.as_str()).or_default().push(value.as_str());
        }
        RequestView { params, multi }
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Serialized form of the request inside the render context
#[derive(Debug, Clone, Serialize)]
pub struct RequestView<'a> {
    pub params: BTreeMap<&'a str, &'a str>,
    pub multi: BTreeMap<&'a str, Vec<&'a str>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_wins() {
        let params: RequestParams = [("fq", "a"), ("fq", "b"), ("q", "*:*")].into_iter().collect();
        assert_eq!(params.get("fq"), Some("a"));
        assert_eq!(params.view().multi["fq"], vec!["a", "b"]);
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_get_bool() {
        let params = RequestParams::new()
            .with(LAYOUT_ENABLED, "FALSE")
            .with("a", "true")
            .with("b", "nope");
        assert_eq!(params.get_bool(LAYOUT_ENABLED), Some(false));
        assert_eq!(params.get_bool("a"), Some(true));
        assert_eq!(params.get_bool("b"), None);
        assert_eq!(params.get_bool("c"), None);
    }

    #[test]
    fn test_template_and_inline() {
        let params = RequestParams::new()
            .with(TEMPLATE, "custom")
            .with("template.param.custom", "{{response.response_data}}")
            .with("template.param.other", "x");
        assert_eq!(params.template(), Some("custom"));
        assert_eq!(params.inline_template("custom"), Some("{{response.response_data}}"));
        assert_eq!(params.inline_template("missing"), None);
    }

    #[test]
    fn test_blank_template_is_none() {
        let params = RequestParams::new().with(TEMPLATE, "  ");
        assert_eq!(params.template(), None);
    }

    #[test]
    fn test_view() {
        let params = RequestParams::new().with("fq", "a").with("fq", "b").with("q", "x");
        let view = params.view();
        assert_eq!(view.params.get("fq"), Some(&"a"));
        assert_eq!(view.multi.get("fq"), Some(&vec!["a", "b"]));
        assert_eq!(view.multi.get("q"), Some(&vec!["x"]));
    }
}
