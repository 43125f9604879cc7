pub mod ejs;

use std::fmt;
use std::str::FromStr;

use handlebars::Handlebars;
use minijinja::{AutoEscape, Environment};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::layoutwrap::error::{ConfigError, EngineError};

/// Rendering function shared by every engine: template source plus context.
pub type Capability = fn(&str, &Value) -> Result<String, EngineError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Engine {
    Ejs,
    Handlebars,
    Mustache,
    Hogan,
    Nunjucks,
}

impl Engine {
    pub const ALL: [Engine; 5] = [
        Engine::Ejs,
        Engine::Handlebars,
        Engine::Mustache,
        Engine::Hogan,
        Engine::Nunjucks,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Engine::Ejs => "ejs",
            Engine::Handlebars => "handlebars",
            Engine::Mustache => "mustache",
            Engine::Hogan => "hogan",
            Engine::Nunjucks => "nunjucks",
        }
    }

    /// Comma separated list of valid names, for error messages.
    pub fn names() -> String {
        Engine::ALL
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn validate(name: Option<&str>) -> Result<Engine, ConfigError> {
        match name {
            None => Err(ConfigError::MissingEngine),
            Some(name) => name.parse(),
        }
    }

    pub fn capability(self) -> Capability {
        match self {
            Engine::Ejs => ejs::render,
            Engine::Handlebars | Engine::Mustache | Engine::Hogan => render_handlebars,
            Engine::Nunjucks => render_nunjucks,
        }
    }

    pub fn render(self, template: &str, context: &Value) -> Result<String, EngineError> {
        (self.capability())(template, context)
    }
}

impl FromStr for Engine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Engine::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| ConfigError::UnknownEngine { name: s.to_string() })
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Mustache and hogan layouts use the subset of syntax handlebars shares with them.
static HANDLEBARS: Lazy<Handlebars<'static>> = Lazy::new(Handlebars::new);

fn render_handlebars(template: &str, context: &Value) -> Result<String, EngineError> {
    Ok(HANDLEBARS.render_template(template, context)?)
}

static NUNJUCKS: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.set_keep_trailing_newline(true);
    env
});

fn render_nunjucks(template: &str, context: &Value) -> Result<String, EngineError> {
    Ok(NUNJUCKS.render_str(template, context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hello() -> Value {
        json!({ "file": { "contents": "<p>Hello</p>" }, "title": "A & B" })
    }

    #[test]
    fn every_engine_name_parses_back() {
        for engine in Engine::ALL {
            assert_eq!(Engine::validate(Some(engine.name())).unwrap(), engine);
        }
    }

    #[test]
    fn missing_engine_is_rejected() {
        let err = Engine::validate(None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEngine));
        assert!(err.to_string().contains("ejs,handlebars,mustache,hogan,nunjucks"));
    }

    #[test]
    fn unknown_engine_lists_valid_options() {
        let err = Engine::validate(Some("erb")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEngine { ref name } if name == "erb"));
        assert!(err.to_string().contains("Unknown `engine`: erb"));
        assert!(err.to_string().contains("nunjucks"));
    }

    #[test]
    fn handlebars_wraps_raw_contents() {
        let out = Engine::Handlebars
            .render("<html><body>{{{file.contents}}}</body></html>\n", &hello())
            .unwrap();
        assert_eq!(out, "<html><body><p>Hello</p></body></html>\n");
    }

    #[test]
    fn mustache_escapes_double_braces() {
        let out = Engine::Mustache
            .render("<title>{{title}}</title>{{{file.contents}}}", &hello())
            .unwrap();
        assert_eq!(out, "<title>A &amp; B</title><p>Hello</p>");
    }

    #[test]
    fn hogan_renders_mustache_layouts() {
        assert_eq!(Engine::validate(Some("hogan")).unwrap(), Engine::Hogan);
        let out = Engine::Hogan
            .render("<title>{{title}}</title>{{{file.contents}}}", &hello())
            .unwrap();
        assert_eq!(out, "<title>A &amp; B</title><p>Hello</p>");
    }

    #[test]
    fn nunjucks_autoescapes_unless_safe() {
        let out = Engine::Nunjucks
            .render("{{ file.contents }}|{{ file.contents | safe }}", &hello())
            .unwrap();
        let (escaped, raw) = out.split_once('|').unwrap();
        assert!(escaped.starts_with("&lt;p&gt;Hello"));
        assert!(!escaped.contains('<'));
        assert_eq!(raw, "<p>Hello</p>");
    }

    #[test]
    fn engine_syntax_errors_propagate() {
        assert!(Engine::Nunjucks.render("{% if %}", &hello()).is_err());
        assert!(Engine::Handlebars.render("{{#if file}}", &hello()).is_err());
    }
}
