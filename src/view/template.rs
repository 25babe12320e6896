//! Placeholder templates.
//!
//! | Syntax                     | Output                                  |
//! |----------------------------|-----------------------------------------|
//! | `{{ user.name }}`          | dotted lookup in locals, HTML-escaped   |
//! | `{{{ body }}}`             | same, unescaped                         |
//! | `{{ hashes["main.css"] }}` | versioned URL of an asset               |
//! | `{{{ hashes }}}`           | whole asset index as JSON               |
//!
//! Unknown or malformed expressions render as the empty string.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::RenderContext;
use crate::debug;
use crate::utils::html::escape;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\{\s*(.*?)\s*\}\}\}|\{\{\s*(.*?)\s*\}\}").unwrap());

static HASH_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^hashes\s*\[\s*(?:"([^"]*)"|'([^']*)')\s*\]$"#).unwrap());

static PATH_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][\w$]*(?:\.[\w$]+)*$").unwrap());

const HASHES: &str = "hashes";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    /// `hashes["key"]`
    Asset(String),
    /// `a.b.c`
    Path(Vec<String>),
    Invalid,
}

impl Expr {
    fn parse(src: &str) -> Self {
        if let Some(caps) = HASH_EXPR.captures(src) {
            let key = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            return Self::Asset(key.to_string());
        }
        if PATH_EXPR.is_match(src) {
            return Self::Path(src.split('.').map(str::to_string).collect());
        }
        debug!("view"; "unsupported expression `{}`", src);
        Self::Invalid
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Tag { expr: Expr, raw: bool },
}

/// A parsed template, reusable across renders.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(src: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in TAG.captures_iter(src) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                segments.push(Segment::Text(src[last..whole.start()].to_string()));
            }
            let (inner, raw) = match caps.get(1) {
                Some(m) => (m.as_str(), true),
                None => (caps.get(2).map_or("", |m| m.as_str()), false),
            };
            segments.push(Segment::Tag {
                expr: Expr::parse(inner),
                raw,
            });
            last = whole.end();
        }
        if last < src.len() {
            segments.push(Segment::Text(src[last..].to_string()));
        }

        Self { segments }
    }

    pub fn render(&self, ctx: &RenderContext) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Tag { expr, raw } => {
                    let value = eval(expr, ctx);
                    if *raw {
                        out.push_str(&value);
                    } else {
                        out.push_str(&escape(&value));
                    }
                }
            }
        }
        out
    }
}

fn eval<'a>(expr: &Expr, ctx: &'a RenderContext) -> Cow<'a, str> {
    match expr {
        Expr::Asset(key) => ctx
            .hashes()
            .and_then(|h| h.get(key))
            .map_or(Cow::Borrowed(""), Cow::Borrowed),
        Expr::Path(path) if path[0] == HASHES && !ctx.contains(HASHES) => match ctx.hashes() {
            Some(hashes) if path.len() == 1 => {
                Cow::Owned(serde_json::to_string(hashes).unwrap_or_default())
            }
            Some(hashes) => hashes
                .get(&path[1..].join("."))
                .map_or(Cow::Borrowed(""), Cow::Borrowed),
            None => Cow::Borrowed(""),
        },
        Expr::Path(path) => ctx.lookup(path.as_slice()).map_or(Cow::Borrowed(""), display),
        Expr::Invalid => Cow::Borrowed(""),
    }
}

fn display(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Number(n) => Cow::Owned(n.to_string()),
        other => Cow::Owned(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetIndex;
    use serde_json::json;
    use std::sync::Arc;

    fn ctx() -> RenderContext {
        let index: AssetIndex = [
            ("main.css".to_string(), "/css/main.css?v=abc".to_string()),
            ("app.js".to_string(), "/js/app.js?v=def".to_string()),
        ]
        .into_iter()
        .collect();
        let mut ctx = RenderContext::new();
        ctx.set_hashes(Arc::new(index));
        ctx.insert("user", json!({ "name": "<ada>", "admin": true, "visits": 3 }));
        ctx.insert("currentPath", "/about");
        ctx
    }

    fn render(src: &str) -> String {
        Template::parse(src).render(&ctx())
    }

    #[test]
    fn test_asset_lookup() {
        assert_eq!(
            render(r#"<link href="{{ hashes["main.css"] }}">"#),
            r#"<link href="/css/main.css?v=abc">"#
        );
        assert_eq!(render("{{hashes['app.js']}}"), "/js/app.js?v=def");
        assert_eq!(render("{{ hashes.app.js }}"), "/js/app.js?v=def");
        assert_eq!(render(r#"[{{ hashes["missing.css"] }}]"#), "[]");
    }

    #[test]
    fn test_hashes_as_json() {
        assert_eq!(
            render("{{{ hashes }}}"),
            r#"{"app.js":"/js/app.js?v=def","main.css":"/css/main.css?v=abc"}"#
        );
    }

    #[test]
    fn test_locals_escaped_and_raw() {
        assert_eq!(render("Hi {{ user.name }}"), "Hi &lt;ada&gt;");
        assert_eq!(render("Hi {{{ user.name }}}"), "Hi <ada>");
        assert_eq!(render("{{ user.admin }}/{{ user.visits }}"), "true/3");
        assert_eq!(render("{{ currentPath }}"), "/about");
    }

    #[test]
    fn test_unknown_renders_empty() {
        assert_eq!(render("[{{ nope }}][{{ user.nope.deeper }}][{{ 1 + 2 }}]"), "[][][]");
    }

    #[test]
    fn test_patterns_compile() {
        assert!(TAG.is_match("{{ a }}"));
        assert!(HASH_EXPR.is_match("hashes [ 'a.css' ]"));
        assert!(PATH_EXPR.is_match("user.name"));
        assert!(!PATH_EXPR.is_match("1 + 2"));
    }

    #[test]
    fn test_text_preserved() {
        let src = "<p>{ not a tag }</p>\n<p>{{ currentPath }}</p>\n";
        assert_eq!(render(src), "<p>{ not a tag }</p>\n<p>/about</p>\n");
    }

    #[test]
    fn test_without_hashes() {
        let tpl = Template::parse(r#"[{{ hashes["main.css"] }}][{{{ hashes }}}]"#);
        assert_eq!(tpl.render(&RenderContext::new()), "[][]");
    }
}
