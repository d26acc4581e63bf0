//! Layout and JSON callback wrapping of rendered output
//!
//! The layout is applied first, the JSON callback second:
//! `callback({"result":"<layout(body)>"})`.

use crate::params::{RequestParams, JSON_WRAPPER, LAYOUT, LAYOUT_ENABLED};
use crate::{Result, WriterError};

/// Content type of JSON-wrapped responses
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Wrapping requested by one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputWrapper<'a> {
    layout: Option<&'a str>,
    json_callback: Option<&'a str>,
}

impl<'a> OutputWrapper<'a> {
    /// Read `layout`, `layout.enabled` and `json.wrapper` from the request
    pub fn from_params(params: &'a RequestParams) -> Self {
        let layout_enabled = params.get_bool(LAYOUT_ENABLED).unwrap_or(true);
        Self {
            layout: params.get_non_empty(LAYOUT).filter(|_| layout_enabled),
            json_callback: params.get_non_empty(JSON_WRAPPER),
        }
    }

    /// Layout template to render around the body, if enabled
    pub fn layout(&self) -> Option<&'a str> {
        self.layout
    }

    /// JSON callback name
    pub fn json_callback(&self) -> Option<&'a str> {
        self.json_callback
    }

    /// Whether the output is JSON-wrapped
    pub fn is_json(&self) -> bool {
        self.json_callback.is_some()
    }

    /// Apply the layout through `render_layout`, then the JSON callback
    pub fn wrap<F>(&self, body: String, render_layout: F) -> Result<String>
    where
        F: FnOnce(&str, String) -> Result<String>,
    {
        let body = match self.layout {
            Some(layout) => render_layout(layout, body)?,
            None => body,
        };

        match self.json_callback {
            Some(callback) => wrap_json(callback, &body),
            None => Ok(body),
        }
    }
}

/// `callback({"result":"<body as JSON string>"})`
pub fn wrap_json(callback: &str, body: &str) -> Result<String> {
    let escaped = serde_json::to_string(body)
        .map_err(|e| WriterError::render(JSON_WRAPPER, e))?;
    Ok(format!("{callback}({{\"result\":{escaped}}})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_braces(_: &str, body: String) -> Result<String> {
        Ok(format!("{{{{{{{body}}}}}}}"))
    }

    #[test]
    fn test_from_params() {
        let params = RequestParams::new()
            .with("layout", "layout")
            .with("json.wrapper", "foo");
        let wrapper = OutputWrapper::from_params(&params);
        assert_eq!(wrapper.layout(), Some("layout"));
        assert_eq!(wrapper.json_callback(), Some("foo"));
        assert!(wrapper.is_json());

        let params = RequestParams::new()
            .with("layout", "layout")
            .with("layout.enabled", "false");
        let wrapper = OutputWrapper::from_params(&params);
        assert_eq!(wrapper.layout(), None);
        assert!(!wrapper.is_json());
    }

    #[test]
    fn test_layout_only() {
        let params = RequestParams::new().with("layout", "layout");
        let out = OutputWrapper::from_params(&params)
            .wrap("0".into(), layout_braces)
            .unwrap();
        assert_eq!(out, "{{{0}}}");
    }

    #[test]
    fn test_json_only() {
        let params = RequestParams::new().with("json.wrapper", "foo");
        let out = OutputWrapper::from_params(&params)
            .wrap("0".into(), layout_braces)
            .unwrap();
        assert_eq!(out, r#"foo({"result":"0"})"#);
    }

    #[test]
    fn test_layout_then_json() {
        let params = RequestParams::new()
            .with("json.wrapper", "foo")
            .with("layout", "layout");
        let out = OutputWrapper::from_params(&params)
            .wrap("0".into(), layout_braces)
            .unwrap();
        assert_eq!(out, r#"foo({"result":"{{{0}}}"})"#);
    }

    #[test]
    fn test_no_wrapping_skips_layout_renderer() {
        let params = RequestParams::new();
        let out = OutputWrapper::from_params(&params)
            .wrap("body".into(), |_, _| panic!("layout must not render"))
            .unwrap();
        assert_eq!(out, "body");
    }

    #[test]
    fn test_wrap_json_escapes_body() {
        let out = wrap_json("cb", "line \"one\"\n<two>").unwrap();
        assert_eq!(out, r#"cb({"result":"line \"one\"\n<two>"})"#);
    }
}
