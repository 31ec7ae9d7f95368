use serde_json::{Map, Number, Value};
use tera::{Context, Tera};
use thiserror::Error;

use crate::document::Document;

/// Template names Tera autoescapes unless told otherwise.
const AUTOESCAPE_SUFFIXES: [&str; 3] = [".html", ".htm", ".xml"];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template error: {0}")]
    Tera(#[from] tera::Error),
}

/// Template environment pages are rendered against.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Load every template matching `glob`, e.g. `templates/**/*.html`.
    pub fn new(glob: &str) -> Result<Self, TemplateError> {
        let tera = Tera::new(glob)?;
        Ok(Self { tera })
    }

    pub fn from_tera(tera: Tera) -> Self {
        Self { tera }
    }

    /// Document bodies are usually markup already, so sites turn this off.
    pub fn set_autoescape(&mut self, enabled: bool) {
        if enabled {
            self.tera.autoescape_on(AUTOESCAPE_SUFFIXES.to_vec());
        } else {
            self.tera.autoescape_on(Vec::new());
        }
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Copy of this environment with `source` registered under `name`.
    ///
    /// The source may extend or include templates already in the environment.
    pub fn with_template(&self, name: &str, source: &str) -> Result<Self, TemplateError> {
        let mut tera = self.tera.clone();
        tera.add_raw_template(name, source)?;
        Ok(Self { tera })
    }

    /// Render a named template with an external context.
    pub fn render_with_context(&self, template: &str, context: &Context) -> Result<String, TemplateError> {
        Ok(self.tera.render(template, context)?)
    }
}

/// Rendering context for a document: its metadata plus `content` set to the body.
pub fn document_context(document: &Document) -> Context {
    let mut context = Context::new();
    for (key, value) in &document.metadata {
        context.insert(key.as_str(), &to_json(value));
    }
    context.insert("content", &document.content);
    context
}

/// Dates become their TOML text (`2010-01-02`), which Tera's `date` filter accepts.
fn to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Metadata;

    fn renderer(name: &str, source: &str) -> TemplateRenderer {
        let mut tera = Tera::default();
        tera.add_raw_template(name, source).unwrap();
        TemplateRenderer::from_tera(tera)
    }

    #[test]
    fn test_context_has_metadata_and_content() {
        let mut metadata = Metadata::new();
        metadata.insert("title".into(), "Hi".into());
        metadata.insert("published".into(), "2010-01-02".parse::<toml::value::Datetime>().unwrap().into());
        let doc = Document::new(metadata, "body");

        let context = document_context(&doc);
        assert_eq!(context.get("title"), Some(&Value::from("Hi")));
        assert_eq!(context.get("published"), Some(&Value::from("2010-01-02")));
        assert_eq!(context.get("content"), Some(&Value::from("body")));
    }

    #[test]
    fn test_content_key_overrides_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("content".into(), "from metadata".into());
        let doc = Document::new(metadata, "from body");
        assert_eq!(document_context(&doc).get("content"), Some(&Value::from("from body")));
        assert_eq!(doc.get_str("content"), Some("from metadata"));
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let renderer = renderer("base.html", "{{ content }}");
        assert!(renderer.render_with_context("nope.html", &Context::new()).is_err());
    }

    #[test]
    fn test_autoescape_toggle() {
        let mut renderer = renderer("base.html", "{{ content }}");
        let doc = Document::default().with_content("<p>x</p>");
        let context = document_context(&doc);

        assert_eq!(renderer.render_with_context("base.html", &context).unwrap(), "&lt;p&gt;x&lt;&#x2F;p&gt;");
        renderer.set_autoescape(false);
        assert_eq!(renderer.render_with_context("base.html", &context).unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_with_template_can_extend() {
        let base = renderer("base.html", "[{% block body %}{% endblock %}]");
        let extended = base
            .with_template("inline", "{% extends \"base.html\" %}{% block body %}{{ content }}{% endblock %}")
            .unwrap();
        let doc = Document::default().with_content("hi");
        assert_eq!(extended.render_with_context("inline", &document_context(&doc)).unwrap(), "[hi]");
        assert!(!base.has_template("inline"));
        assert!(extended.has_template("inline"));
    }
}
