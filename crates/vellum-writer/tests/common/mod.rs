//! Shared fixtures for writer integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::json;
use vellum_common_config::WriterConfig;
use vellum_writer::{QueryResponse, RequestParams, ResponseWriter};

/// Template base directory shipped with the tests
pub fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/templates")
}

/// Config pointing at the fixture templates, pinned to `en_US`
pub fn fixture_config() -> WriterConfig {
    WriterConfig {
        template_base_dir: Some(templates_dir()),
        default_locale: Some("en_US".to_string()),
        ..Default::default()
    }
}

/// The `velocity` writer: fixture templates, default init properties
pub fn velocity() -> ResponseWriter {
    ResponseWriter::new("velocity", fixture_config()).expect("Failed to build writer")
}

/// The `velocityWithInitProps` writer: loop counter disabled by file
pub fn velocity_with_init_props() -> ResponseWriter {
    let config = WriterConfig {
        init_properties_file: Some(PathBuf::from("init-props.yaml")),
        ..fixture_config()
    };
    ResponseWriter::new("velocityWithInitProps", config).expect("Failed to build writer")
}

/// A search response with no matches and two stored docs
pub fn search_response() -> QueryResponse {
    let mut response = QueryResponse::new();
    response
        .add("responseHeader", json!({"status": 0, "QTime": 1}))
        .add(
            "response",
            json!({"numFound": 0, "start": 0, "docs": [{"id": "1"}, {"id": "2"}]}),
        );
    response
}

/// Request for `template` plus extra parameters
pub fn request(template: &str, extra: &[(&str, &str)]) -> RequestParams {
    let mut params = RequestParams::new().with("q", "*:*").with("template", template);
    for (name, value) in extra {
        params.add(*name, *value);
    }
    params
}

/// Render through `write` and return the bytes as a string
pub fn query(writer: &ResponseWriter, params: &RequestParams) -> String {
    let mut out = Vec::new();
    writer
        .write(&mut out, params, &search_response())
        .expect("Render failed");
    String::from_utf8(out).expect("Output is not UTF-8")
}
