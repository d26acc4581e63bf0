//! Template helpers
//!
//! Formatting tools bound to the request locale, plus an `each` that
//! honors the `loop-counter` init property.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use handlebars::{
    to_json, BlockContext, BlockParams, Context, Handlebars, Helper, HelperDef, HelperResult,
    Output, RenderContext as HbRenderContext, RenderError, RenderErrorReason, Renderable,
};
use serde_json::Value as Json;
use vellum_common_i18n::{Locale, NumberFormat, MAX_FRACTION_DIGITS};

/// Default `strftime` pattern of the `date` helper
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Register every helper on `hb`, replacing the built-in `each`
pub fn register(hb: &mut Handlebars<'_>, loop_counter: bool) {
    hb.register_helper("each", Box::new(EachHelper { loop_counter }));
    hb.register_helper("number", Box::new(number_helper));
    hb.register_helper("date", Box::new(date_helper));
    hb.register_helper("json", Box::new(json_helper));
    hb.register_helper("url_encode", Box::new(url_encode_helper));
    hb.register_helper("html", Box::new(html_helper));
    hb.register_helper("msg", Box::new(msg_helper));
}

/// `{{#each}}` over arrays and objects.
///
/// Sets `@first`, `@last` and, for objects, `@key`. `@index` is only set
/// when the loop counter is enabled.
#[derive(Debug, Clone, Copy)]
pub struct EachHelper {
    loop_counter: bool,
}

impl EachHelper {
    fn enter_item<'reg: 'rc, 'rc>(
        &self,
        rc: &mut HbRenderContext<'reg, 'rc>,
        h: &Helper<'rc>,
        item: &Json,
        index: usize,
        key: Option<&str>,
        last: bool,
    ) -> Result<(), RenderError> {
        let Some(block) = rc.block_mut() else {
            return Ok(());
        };

        block.set_base_value(item.clone());
        block.set_local_var("first", to_json(index == 0));
        block.set_local_var("last", to_json(last));
        if self.loop_counter {
            block.set_local_var("index", to_json(index));
        }
        let key = match key {
            Some(k) => {
                block.set_local_var("key", to_json(k));
                to_json(k)
            }
            None => to_json(index),
        };

        if let Some(name) = h.block_param() {
            let mut params = BlockParams::new();
            params.add_value(name, item.clone())?;
            block.set_block_params(params);
        } else if let Some((name, key_name)) = h.block_param_pair() {
            let mut params = BlockParams::new();
            params.add_value(name, item.clone())?;
            params.add_value(key_name, key)?;
            block.set_block_params(params);
        }

        Ok(())
    }
}

impl HelperDef for EachHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut HbRenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let value = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("each", 0))?;
        let Some(template) = h.template() else {
            return Ok(());
        };

        match value.value() {
            Json::Array(list) if !list.is_empty() => {
                rc.push_block(BlockContext::new());
                let last = list.len() - 1;
                for (i, item) in list.iter().enumerate() {
                    self.enter_item(rc, h, item, i, None, i == last)?;
                    template.render(r, ctx, rc, out)?;
                }
                rc.pop_block();
            }
            Json::Object(map) if !map.is_empty() => {
                rc.push_block(BlockContext::new());
                let last = map.len() - 1;
                for (i, (key, item)) in map.iter().enumerate() {
                    self.enter_item(rc, h, item, i, Some(key), i == last)?;
                    template.render(r, ctx, rc, out)?;
                }
                rc.pop_block();
            }
            _ => {
                if let Some(inverse) = h.inverse() {
                    inverse.render(r, ctx, rc, out)?;
                }
            }
        }

        Ok(())
    }
}

/// Locale of the render context, `en` when absent
fn context_locale(ctx: &Context) -> Locale {
    ctx.data()
        .get("locale")
        .and_then(Json::as_str)
        .and_then(|tag| Locale::parse(tag).ok())
        .unwrap_or_default()
}

/// Plain text of a JSON value: strings unquoted, null empty
fn as_text(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}

/// `{{number value [digits]}}` or `{{number value digits=2}}`
///
/// `digits` above [`MAX_FRACTION_DIGITS`] fails the render.
fn number_helper(
    h: &Helper,
    _: &Handlebars,
    ctx: &Context,
    _: &mut HbRenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h
        .param(0)
        .map(|v| v.value())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("number", 0))?;
    let digits = h
        .param(1)
        .or_else(|| h.hash_get("digits"))
        .and_then(|v| v.value().as_u64())
        .map(|d| match usize::try_from(d) {
            Ok(d) if d <= MAX_FRACTION_DIGITS => Ok(d),
            _ => Err(RenderErrorReason::Other(format!(
                "number: digits must be at most {MAX_FRACTION_DIGITS}, got {d}"
            ))),
        })
        .transpose()?;

    let format = NumberFormat::for_locale(&context_locale(ctx));
    let text = match value {
        Json::Number(n) => match (n.as_i64(), digits) {
            (Some(i), None) => format.format_integer(i),
            _ => n
                .as_f64()
                .map(|f| format.format(f, digits))
                .unwrap_or_else(|| n.to_string()),
        },
        Json::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => format.format(f, digits),
            _ => s.clone(),
        },
        other => as_text(other),
    };

    out.write(&text)?;
    Ok(())
}

/// `{{date}}`, `{{date value}}` or `{{date value "%d %b %Y"}}`.
///
/// Values are RFC 3339 strings, `YYYY-MM-DD` strings or epoch milliseconds.
/// Anything else is written unchanged.
fn date_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut HbRenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let format = h
        .param(1)
        .or_else(|| h.hash_get("format"))
        .and_then(|v| v.value().as_str())
        .unwrap_or(DEFAULT_DATE_FORMAT);

    let text = match h.param(0).map(|v| v.value()) {
        None => format_date(Utc::now(), format)?,
        Some(Json::String(s)) => match parse_date(s) {
            Some(date) => format_date(date, format)?,
            None => s.clone(),
        },
        Some(Json::Number(n)) => match n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis) {
            Some(date) => format_date(date, format)?,
            None => n.to_string(),
        },
        Some(other) => as_text(other),
    };

    out.write(&text)?;
    Ok(())
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(s) {
        return Some(date.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?))
}

fn format_date(date: DateTime<Utc>, format: &str) -> Result<String, RenderError> {
    let mut text = String::new();
    write!(text, "{}", date.format(format))
        .map_err(|_| RenderErrorReason::Other(format!("invalid date format: {format}")))?;
    Ok(text)
}

/// `{{json value}}` or `{{json value pretty=true}}`
fn json_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut HbRenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let value = h
        .param(0)
        .map(|v| v.value())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("json", 0))?;
    let pretty = h
        .hash_get("pretty")
        .and_then(|v| v.value().as_bool())
        .unwrap_or(false);

    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| RenderErrorReason::Other(e.to_string()))?;

    out.write(&text)?;
    Ok(())
}

/// `{{url_encode value}}`: form encoding for query string values
fn url_encode_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut HbRenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = h.param(0).map(|v| as_text(v.value())).unwrap_or_default();
    let encoded: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();
    out.write(&encoded)?;
    Ok(())
}

/// `{{html value}}`: HTML-escape regardless of the `escape-html` setting
fn html_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut HbRenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = h.param(0).map(|v| as_text(v.value())).unwrap_or_default();
    out.write(&handlebars::html_escape(&text))?;
    Ok(())
}

/// `{{msg "key"}}` or `{{msg "key" "fallback"}}`: resource string lookup
/// for keys that are not valid path segments, e.g. `search.title`
fn msg_helper(
    h: &Helper,
    _: &Handlebars,
    ctx: &Context,
    _: &mut HbRenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let key = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("msg", 0))?;

    let text = ctx
        .data()
        .get("resource")
        .and_then(|r| r.get(key))
        .and_then(Json::as_str)
        .or_else(|| h.param(1).and_then(|v| v.value().as_str()))
        .unwrap_or(key);

    out.write(text)?;
    Ok(())
}
