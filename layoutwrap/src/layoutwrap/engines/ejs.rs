//! Output-only EJS renderer.
//!
//! Supports the tags layouts actually use: `<%= expr %>` (HTML escaped),
//! `<%- expr %>` (raw), `<%# comment %>`, `<%%` for a literal `<%`, and a
//! trailing `-%>` that swallows the next newline. `<%_` drops the spaces
//! and tabs before it, `_%>` the ones after it. Expressions are string
//! literals or property paths such as `file.contents`, `items[0]` or
//! `locals["title"]`. Scriptlets carrying code are rejected.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::layoutwrap::error::EngineError;

#[derive(Debug, Error)]
pub enum EjsError {
    #[error("Could not find matching close tag for \"<%{0}\".")]
    Unclosed(String),

    #[error("{0} is not defined")]
    NotDefined(String),

    #[error("Cannot read properties of {base} (reading '{key}')")]
    ReadThroughEmpty { base: &'static str, key: String },

    #[error("unsupported expression `{0}`")]
    UnsupportedExpression(String),

    #[error("scriptlets are not supported: `<%{0}%>`")]
    Scriptlet(String),
}

pub fn render(template: &str, context: &Value) -> Result<String, EngineError> {
    Ok(render_ejs(template, context)?)
}

#[derive(Clone, Copy, PartialEq)]
enum Tag {
    Escaped,
    Raw,
    Comment,
    Scriptlet,
}

fn render_ejs(template: &str, context: &Value) -> Result<String, EjsError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("<%") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        if let Some(tail) = after.strip_prefix('%') {
            out.push_str("<%");
            rest = tail;
            continue;
        }

        let (tag, marker) = match after.as_bytes().first() {
            Some(b'=') => (Tag::Escaped, "="),
            Some(b'-') => (Tag::Raw, "-"),
            Some(b'#') => (Tag::Comment, "#"),
            Some(b'_') => {
                let kept = out.trim_end_matches([' ', '\t']).len();
                out.truncate(kept);
                (Tag::Scriptlet, "_")
            }
            _ => (Tag::Scriptlet, ""),
        };
        let inner = &after[marker.len()..];
        let end = inner
            .find("%>")
            .ok_or_else(|| EjsError::Unclosed(marker.to_string()))?;

        let (body, close) = match inner[..end].strip_suffix(['-', '_']) {
            Some(body) => (body, inner.as_bytes()[end - 1]),
            None => (&inner[..end], b'%'),
        };

        match tag {
            Tag::Escaped => {
                if let Some(value) = evaluate(body.trim(), context)? {
                    out.push_str(&escape_xml(&stringify(&value)));
                }
            }
            Tag::Raw => {
                if let Some(value) = evaluate(body.trim(), context)? {
                    out.push_str(&stringify(&value));
                }
            }
            Tag::Comment => {}
            Tag::Scriptlet => {
                if !body.trim().is_empty() {
                    return Err(EjsError::Scriptlet(body.to_string()));
                }
            }
        }

        rest = &inner[end + 2..];
        match close {
            b'-' => {
                rest = rest
                    .strip_prefix("\r\n")
                    .or_else(|| rest.strip_prefix('\n'))
                    .unwrap_or(rest);
            }
            b'_' => rest = rest.trim_start_matches([' ', '\t']),
            _ => {}
        }
    }

    out.push_str(rest);
    Ok(out)
}

static PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^([A-Za-z_$][\w$]*)((?:\s*\.\s*[A-Za-z_$][\w$]*|\[\s*\d+\s*\]|\[\s*"[^"]*"\s*\]|\[\s*'[^']*'\s*\])*)$"#,
    )
    .expect("ejs path regex")
});

static SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\.\s*([A-Za-z_$][\w$]*)|\[\s*(\d+)\s*\]|\[\s*"([^"]*)"\s*\]|\[\s*'([^']*)'\s*\]"#)
        .expect("ejs segment regex")
});

/// Evaluates an expression. `None` stands for JavaScript's `undefined`.
fn evaluate(expr: &str, context: &Value) -> Result<Option<Value>, EjsError> {
    if let Some(literal) = string_literal(expr) {
        return Ok(Some(Value::String(literal.to_string())));
    }

    let caps = PATH
        .captures(expr)
        .ok_or_else(|| EjsError::UnsupportedExpression(expr.to_string()))?;
    let root = &caps[1];

    let mut current = if root == "locals" {
        Some(context.clone())
    } else {
        Some(
            context
                .get(root)
                .cloned()
                .ok_or_else(|| EjsError::NotDefined(root.to_string()))?,
        )
    };

    for seg in SEGMENT.captures_iter(&caps[2]) {
        let key = seg
            .get(1)
            .or_else(|| seg.get(2))
            .or_else(|| seg.get(3))
            .or_else(|| seg.get(4))
            .map(|m| m.as_str())
            .unwrap_or_default();
        current = property(current.as_ref(), key)?;
    }

    Ok(current)
}

fn string_literal(expr: &str) -> Option<&str> {
    ['"', '\'']
        .into_iter()
        .find_map(|q| expr.strip_prefix(q)?.strip_suffix(q))
        .filter(|s| !s.contains(['"', '\'', '\\']))
}

fn property(base: Option<&Value>, key: &str) -> Result<Option<Value>, EjsError> {
    let value = match base {
        None => {
            return Err(EjsError::ReadThroughEmpty {
                base: "undefined",
                key: key.to_string(),
            });
        }
        Some(Value::Null) => {
            return Err(EjsError::ReadThroughEmpty {
                base: "null",
                key: key.to_string(),
            });
        }
        Some(value) => value,
    };

    Ok(match value {
        Value::Object(map) => map.get(key).cloned(),
        Value::Array(items) if key == "length" => Some(Value::from(items.len())),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
        Value::String(s) if key == "length" => Some(Value::from(s.chars().count())),
        Value::String(s) => key
            .parse::<usize>()
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string())),
        _ => None,
    })
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".into(),
    }
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
