//! The response writer
//!
//! Built once per configured writer and shared read-only afterwards. Each
//! request goes through resolve → build context → render → wrap → write,
//! with the whole body buffered so a failure never leaves partial output.

use std::fs;
use std::io::{self, Write};

use handlebars::Handlebars;
use vellum_common_config::{load_init_properties, validate_writer, InitProperties, WriterConfig};
use vellum_common_i18n::{detect_locale, Locale, ResourceBundles, DEFAULT_BUNDLE_NAME};
use vellum_common_log::spans::{init_span, record_error, render_span, Timer};

use crate::context::{ContextBuilder, RenderContext};
use crate::macros::MacroRegistry;
use crate::params::{RequestParams, CONTENT_TYPE, TEMPLATE};
use crate::resolver::{TemplateResolver, TemplateSource};
use crate::response::QueryResponse;
use crate::wrapper::{OutputWrapper, JSON_CONTENT_TYPE};
use crate::{builtin, helpers, Result, WriterError};

/// Renders query responses through templates
pub struct ResponseWriter {
    name: String,
    config: WriterConfig,
    properties: InitProperties,
    engine: Handlebars<'static>,
    resolver: TemplateResolver,
    macros: MacroRegistry,
    contexts: ContextBuilder,
}

impl std::fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseWriter")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("properties", &self.properties)
            .field("templates", &self.resolver.files().len())
            .field("macros", &self.macros.len())
            .finish_non_exhaustive()
    }
}

impl ResponseWriter {
    /// Initialize a writer: load init properties, scan templates, merge
    /// macro libraries and read resource bundles.
    pub fn new(name: impl Into<String>, config: WriterConfig) -> Result<Self> {
        let name = name.into();
        let span = init_span(&name);
        let _guard = span.enter();

        validate_writer(&config)?;
        let properties = resolve_properties(&config)?;
        let resolver = TemplateResolver::new(&config, properties.dev_mode())?;
        let macros = MacroRegistry::load(&resolver)?;
        let engine = build_engine(&properties, &resolver, &macros)?;

        let default_locale = match &config.default_locale {
            Some(tag) => Locale::parse(tag)?,
            None => detect_locale(),
        };
        let bundles = match resolver.base_dir() {
            Some(dir) => ResourceBundles::load_dir(dir, DEFAULT_BUNDLE_NAME)?,
            None => ResourceBundles::empty(),
        };

        tracing::info!(
            writer = %name,
            templates = resolver.files().len(),
            macros = macros.len(),
            bundles = bundles.len(),
            locale = %default_locale,
            "response writer initialized"
        );

        Ok(Self {
            name,
            config,
            properties,
            engine,
            resolver,
            macros,
            contexts: ContextBuilder::new(bundles, default_locale),
        })
    }

    /// Writer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the writer was built from
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Effective init properties, file and inline entries merged
    pub fn init_properties(&self) -> &InitProperties {
        &self.properties
    }

    /// Merged macro libraries
    pub fn macros(&self) -> &MacroRegistry {
        &self.macros
    }

    /// Template resolver
    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    /// Locale used when the request names none
    pub fn default_locale(&self) -> &Locale {
        self.contexts.default_locale()
    }

    /// Render the response to a string
    pub fn render(&self, params: &RequestParams, response: &QueryResponse) -> Result<String> {
        let template = params
            .template()
            .ok_or_else(|| WriterError::TemplateNotFound(format!("no '{TEMPLATE}' parameter")))?;

        let span = render_span(&self.name, template);
        let _guard = span.enter();
        let timer = Timer::start("render");

        let result = self.render_wrapped(template, params, response);
        if let Err(e) = &result {
            record_error(e);
            tracing::warn!(error = %e, "render failed");
        }

        timer.finish();
        result
    }

    /// Render the response and write it to `out`.
    ///
    /// Every failure surfaces as an `io::Error` wrapping the [`WriterError`].
    pub fn write<W>(
        &self,
        out: &mut W,
        params: &RequestParams,
        response: &QueryResponse,
    ) -> io::Result<()>
    where
        W: Write + ?Sized,
    {
        let body = self.render(params, response)?;
        out.write_all(body.as_bytes())?;
        out.flush()
    }

    /// Content type of the response: the `content.type` parameter, else
    /// JSON when wrapped in a callback, else the configured type
    pub fn content_type<'a>(&'a self, params: &'a RequestParams) -> &'a str {
        if let Some(content_type) = params.get_non_empty(CONTENT_TYPE) {
            return content_type;
        }
        if OutputWrapper::from_params(params).is_json() {
            return JSON_CONTENT_TYPE;
        }
        &self.config.content_type
    }

    fn render_wrapped(
        &self,
        template: &str,
        params: &RequestParams,
        response: &QueryResponse,
    ) -> Result<String> {
        let context = self.contexts.build(params, response);
        let body = self.render_template(template, params, &context)?;

        OutputWrapper::from_params(params).wrap(body, move |layout, body| {
            self.render_template(layout, params, &context.with_content(body))
        })
    }

    fn render_template(
        &self,
        name: &str,
        params: &RequestParams,
        context: &RenderContext<'_>,
    ) -> Result<String> {
        let source = self.resolver.resolve(name, params)?;
        tracing::debug!(template = %name, source = source.kind(), "rendering template");

        let rendered = match &source {
            TemplateSource::Inline(text) => self.engine.render_template(text, context),
            TemplateSource::File(path) if self.resolver.dev_mode() => {
                let text = fs::read_to_string(path)?;
                self.engine.render_template(&text, context)
            }
            TemplateSource::File(_) | TemplateSource::Builtin(_) => self.engine.render(name, context),
        };

        rendered.map_err(|e| WriterError::render(name, e))
    }
}

/// Inline init properties layered over the properties file
fn resolve_properties(config: &WriterConfig) -> Result<InitProperties> {
    let from_file = match config.init_properties_path() {
        Some(path) => load_init_properties(&path)?,
        None => InitProperties::default(),
    };
    Ok(config.init_properties.over(from_file))
}

fn build_engine(
    properties: &InitProperties,
    resolver: &TemplateResolver,
    macros: &MacroRegistry,
) -> Result<Handlebars<'static>> {
    let mut engine = Handlebars::new();
    engine.set_strict_mode(properties.strict_mode());
    if properties.escape_html() {
        engine.register_escape_fn(handlebars::html_escape);
    } else {
        engine.register_escape_fn(handlebars::no_escape);
    }
    helpers::register(&mut engine, properties.loop_counter());

    for (name, source) in builtin::all() {
        engine
            .register_template_string(name, source)
            .map_err(|e| WriterError::render(name, e))?;
    }

    for (name, path) in resolver.files() {
        let source = fs::read_to_string(path)?;
        if builtin::get(name).is_some() {
            tracing::debug!(template = %name, "file template replaces built-in");
        }
        engine
            .register_template_string(name, source)
            .map_err(|e| WriterError::render(name, e))?;
    }

    for (name, definition) in macros.iter() {
        if engine.has_template(name) {
            tracing::warn!(
                macro_name = %name,
                library = %definition.library,
                "macro shadowed by a template of the same name"
            );
            continue;
        }
        engine
            .register_partial(name, &definition.body)
            .map_err(|e| WriterError::render(name, e))?;
    }

    Ok(engine)
}
