//! Redirect target templating.
//!
//! # Responsibilities
//! - Expose the per-request context a template can reference
//! - Build the handlebars registry rule tables compile into
//! - Provide the `header` helper for request header lookup
//!
//! # Design Decisions
//! - Templates see a fixed schema: `host`, `path`, `query`, `headers`
//! - `{{header "Name"}}` is the supported way to read headers
//!   (case-insensitive, absent headers render as empty string)
//! - Strict mode: a typo'd variable fails the render instead of
//!   silently expanding to nothing

use axum::http::HeaderMap;
use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, RenderErrorReason,
};
use serde_json::{json, Map, Value};

/// Read-only view of the request fields a redirect template may reference.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    host: &'a str,
    path: &'a str,
    query: &'a str,
    headers: &'a HeaderMap,
}

impl<'a> RequestContext<'a> {
    pub fn new(host: &'a str, path: &'a str, query: &'a str, headers: &'a HeaderMap) -> Self {
        Self {
            host,
            path,
            query,
            headers,
        }
    }

    /// Host the rule table is keyed by.
    pub fn host(&self) -> &str {
        self.host
    }

    /// Template payload. Header names are lowercased; for repeated headers
    /// the first value wins, matching common `Get`-style accessors.
    pub(crate) fn data(&self) -> Value {
        let mut headers = Map::new();
        for (name, value) in self.headers {
            if let Ok(text) = value.to_str() {
                headers
                    .entry(name.as_str().to_owned())
                    .or_insert_with(|| Value::String(text.to_owned()));
            }
        }
        json!({
            "host": self.host,
            "path": self.path,
            "query": self.query,
            "headers": headers,
        })
    }
}

/// Fresh template registry for one rule-table generation.
///
/// Each generation compiles its own templates into its own registry, so a
/// reload never mutates anything a concurrent render could be reading.
pub(crate) fn registry() -> Handlebars<'static> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_helper("header", Box::new(header_helper));
    registry
}

/// `{{header "X-Region"}}`: first value of the named request header, or the
/// empty string when the header is absent.
fn header_helper(
    h: &Helper,
    _: &Handlebars,
    ctx: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let name = h
        .param(0)
        .and_then(|p| p.value().as_str())
        .ok_or(RenderErrorReason::ParamNotFoundForIndex("header", 0))?;
    let value = ctx
        .data()
        .get("headers")
        .and_then(|headers| headers.get(name.to_ascii_lowercase().as_str()))
        .and_then(Value::as_str)
        .unwrap_or("");
    out.write(value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn render(pattern: &str, ctx: &RequestContext<'_>) -> Result<String, handlebars::RenderError> {
        let mut registry = registry();
        registry
            .register_template_string("t", pattern)
            .expect("pattern compiles");
        registry.render("t", &ctx.data())
    }

    #[test]
    fn test_context_fields_substituted() {
        let headers = HeaderMap::new();
        let ctx = RequestContext::new("a.example.com", "/docs", "q=1", &headers);
        let out = render("{{host}}{{path}}?{{query}}", &ctx).unwrap();
        assert_eq!(out, "a.example.com/docs?q=1");
    }

    #[test]
    fn test_header_helper_case_insensitive() {
        let headers = headers(&[("x-region", "eu")]);
        let ctx = RequestContext::new("svc.example.com", "/", "", &headers);
        let out = render(r#"dest.example.com/{{header "X-Region"}}"#, &ctx).unwrap();
        assert_eq!(out, "dest.example.com/eu");
    }

    #[test]
    fn test_absent_header_renders_empty() {
        let headers = HeaderMap::new();
        let ctx = RequestContext::new("svc.example.com", "/", "", &headers);
        let out = render(r#"dest.example.com/{{header "X-Region"}}"#, &ctx).unwrap();
        assert_eq!(out, "dest.example.com/");
    }

    #[test]
    fn test_repeated_header_first_value_wins() {
        let headers = headers(&[("x-tag", "first"), ("x-tag", "second")]);
        let ctx = RequestContext::new("svc.example.com", "/", "", &headers);
        let out = render(r#"{{header "X-Tag"}}"#, &ctx).unwrap();
        assert_eq!(out, "first");
    }

    #[test]
    fn test_header_helper_requires_name() {
        let headers = HeaderMap::new();
        let ctx = RequestContext::new("svc.example.com", "/", "", &headers);
        let err = render("{{header}}", &ctx).unwrap_err();
        assert!(err.to_string().contains("header"));
    }

    #[test]
    fn test_unknown_variable_fails_render() {
        let headers = HeaderMap::new();
        let ctx = RequestContext::new("svc.example.com", "/", "", &headers);
        assert!(render("{{hots}}", &ctx).is_err());
    }

    #[test]
    fn test_malformed_pattern_fails_compile() {
        let mut registry = registry();
        assert!(registry
            .register_template_string("bad", "dest/{{header")
            .is_err());
    }

    #[test]
    fn test_render_is_deterministic() {
        let headers = headers(&[("x-region", "eu")]);
        let ctx = RequestContext::new("svc.example.com", "/a", "b=c", &headers);
        let pattern = r#"{{host}}{{path}}/{{header "X-Region"}}"#;
        assert_eq!(render(pattern, &ctx).unwrap(), render(pattern, &ctx).unwrap());
    }
}
