//! Render context: the variables a template sees

use std::collections::BTreeMap;

use serde::Serialize;
use vellum_common_i18n::{Locale, ResourceBundles};

use crate::params::{RequestParams, RequestView, LOCALE};
use crate::response::QueryResponse;

/// Variables exposed to templates.
///
/// | Variable | Content |
/// |----------|---------|
/// | `request.params` | first value of each request parameter |
/// | `request.multi` | every value of each request parameter |
/// | `response` | the response payload |
/// | `locale` | resolved locale tag, e.g. `en_UK` |
/// | `resource` | resource strings for `locale` |
/// | `content` | primary output, only while rendering a layout |
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext<'a> {
    pub request: RequestView<'a>,
    pub response: &'a QueryResponse,
    pub locale: String,
    pub resource: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl RenderContext<'_> {
    /// The same context with the layout variable set
    pub fn with_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }
}

/// Builds per-request contexts from the writer's resource bundles
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    bundles: ResourceBundles,
    default_locale: Locale,
}

impl ContextBuilder {
    /// Create a builder falling back to `default_locale`
    pub fn new(bundles: ResourceBundles, default_locale: Locale) -> Self {
        Self {
            bundles,
            default_locale,
        }
    }

    /// Locale used when the request names none
    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// Resource bundles available to templates
    pub fn bundles(&self) -> &ResourceBundles {
        &self.bundles
    }

    /// Request `locale` parameter, else the default. An unparsable request
    /// locale falls back to the default.
    pub fn resolve_locale(&self, params: &RequestParams) -> Locale {
        let Some(tag) = params.get_non_empty(LOCALE) else {
            return self.default_locale.clone();
        };
        match Locale::parse(tag) {
            Ok(locale) => locale,
            Err(e) => {
                tracing::warn!(locale = %tag, error = %e, "ignoring request locale");
                self.default_locale.clone()
            }
        }
    }

    /// Build the context for one request
    pub fn build<'a>(
        &self,
        params: &'a RequestParams,
        response: &'a QueryResponse,
    ) -> RenderContext<'a> {
        let locale = self.resolve_locale(params);
        let resource = self.bundles.resolve(&locale).messages().clone();

        RenderContext {
            request: params.view(),
            response,
            locale: locale.to_string(),
            resource,
            content: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;
    use vellum_common_i18n::DEFAULT_BUNDLE_NAME;

    fn builder() -> (TempDir, ContextBuilder) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("resources.properties"), "color=Color\n").unwrap();
        fs::write(dir.path().join("resources_en_UK.properties"), "color=Colour\n").unwrap();
        let bundles = ResourceBundles::load_dir(dir.path(), DEFAULT_BUNDLE_NAME).unwrap();
        let builder = ContextBuilder::new(bundles, Locale::parse("en_US").unwrap());
        (dir, builder)
    }

    #[test]
    fn test_locale_resolution() {
        let (_dir, builder) = builder();

        let params = RequestParams::new().with("locale", "en-UK");
        assert_eq!(builder.resolve_locale(&params).to_string(), "en_UK");

        let params = RequestParams::new();
        assert_eq!(builder.resolve_locale(&params).to_string(), "en_US");

        let params = RequestParams::new().with("locale", "not a locale");
        assert_eq!(builder.resolve_locale(&params).to_string(), "en_US");
    }

    #[test]
    fn test_resource_strings_follow_locale() {
        let (_dir, builder) = builder();
        let response = QueryResponse::new();

        let us = RequestParams::new().with("locale", "en_US");
        let uk = RequestParams::new().with("locale", "en_UK");
        assert_eq!(builder.build(&us, &response).resource["color"], "Color");
        assert_eq!(builder.build(&uk, &response).resource["color"], "Colour");
    }

    #[test]
    fn test_serialized_shape() {
        let (_dir, builder) = builder();
        let mut response = QueryResponse::new();
        response.add("response_data", "testing");
        let params = RequestParams::new().with("q", "*:*").with("fq", "a").with("fq", "b");

        let value = serde_json::to_value(builder.build(&params, &response)).unwrap();
        assert_eq!(value["request"]["params"]["fq"], json!("a"));
        assert_eq!(value["request"]["multi"]["fq"], json!(["a", "b"]));
        assert_eq!(value["response"]["response_data"], json!("testing"));
        assert_eq!(value["locale"], json!("en_US"));
        assert_eq!(value["resource"]["color"], json!("Color"));
        assert!(value.get("content").is_none());

        let with_layout = builder.build(&params, &response).with_content("0".into());
        let value = serde_json::to_value(with_layout).unwrap();
        assert_eq!(value["content"], json!("0"));
    }
}
