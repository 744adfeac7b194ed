//! Liquid template engine
//!
//! Wraps a `liquid::Parser` whose partials (`{% include %}`)
//! resolve against an ordered list of search roots. Partial names without an
//! extension get the source extension appended, so `{% include 'header' %}`
//! finds `snippets/header.liquid`. Undefined variables render as nothing.

use std::collections::BTreeMap;
use std::path::PathBuf;

use liquid::partials::LazyCompiler;
use tracing::{debug, info};

use crate::error::RenderError;

mod globals;
mod partials;

pub use globals::{Lenient, LenientArray, LenientGlobals, LenientObject, Missing};
pub use partials::SearchRootSource;

/// A configured Liquid parser plus the globals every render sees
pub struct TemplateEngine {
    parser: liquid::Parser,
    globals: LenientGlobals,
}

impl TemplateEngine {
    /// Build a parser over the given search roots
    pub fn new(
        roots: Vec<PathBuf>,
        extension: &str,
        globals: &BTreeMap<String, serde_json::Value>,
    ) -> Result<Self, RenderError> {
        debug!(?roots, %extension, globals = globals.len(), "TemplateEngine::new: called");
        let source = SearchRootSource::new(roots, extension);
        let parser = liquid::ParserBuilder::with_stdlib()
            .partials(LazyCompiler::new(source))
            .build()?;
        Ok(Self {
            parser,
            globals: LenientGlobals::new(globals),
        })
    }

    /// Parse and render template text
    pub fn render(&self, text: &str) -> Result<String, RenderError> {
        debug!(len = text.len(), "TemplateEngine::render: called");
        let template = self.parser.parse(text)?;
        let output = template.render(&self.globals)?;
        info!(input_len = text.len(), output_len = output.len(), "Rendered template");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn globals(pairs: &[(&str, &str)]) -> BTreeMap<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_render_plain_text_verbatim() {
        let engine = TemplateEngine::new(vec![], "liquid", &BTreeMap::new()).unwrap();
        assert_eq!(engine.render("<p>No directives here</p>").unwrap(), "<p>No directives here</p>");
    }

    #[test]
    fn test_render_variable_from_globals() {
        let engine = TemplateEngine::new(vec![], "liquid", &globals(&[("name", "World")])).unwrap();
        assert_eq!(engine.render("Hello {{ name }}").unwrap(), "Hello World");
    }

    #[test]
    fn test_render_undefined_variable_is_empty() {
        let engine = TemplateEngine::new(vec![], "liquid", &BTreeMap::new()).unwrap();
        assert_eq!(engine.render("Hello {{ name }}!").unwrap(), "Hello !");
        assert_eq!(engine.render("<p>{{ product.title }}</p>").unwrap(), "<p></p>");
        assert_eq!(engine.render("{{ a.b.c | upcase }}").unwrap(), "");
    }

    #[test]
    fn test_undefined_variable_is_falsy_and_defaultable() {
        let engine = TemplateEngine::new(vec![], "liquid", &BTreeMap::new()).unwrap();
        assert_eq!(
            engine.render("{% if user %}yes{% else %}no{% endif %}").unwrap(),
            "no"
        );
        assert_eq!(engine.render("{{ user.name | default: 'guest' }}").unwrap(), "guest");
        assert_eq!(engine.render("{% for item in cart.items %}x{% endfor %}").unwrap(), "");
    }

    #[test]
    fn test_nested_globals_with_missing_fields() {
        let mut g = BTreeMap::new();
        g.insert(
            "product".to_string(),
            serde_json::json!({"title": "Lamp", "tags": ["red"]}),
        );
        let engine = TemplateEngine::new(vec![], "liquid", &g).unwrap();
        assert_eq!(
            engine
                .render("{{ product.title }}|{{ product.price }}|{{ product.tags[0] }}|{{ product.tags[3] }}")
                .unwrap(),
            "Lamp|||red|"
        );
    }

    #[test]
    fn test_assign_shadows_globals() {
        let engine = TemplateEngine::new(vec![], "liquid", &globals(&[("name", "World")])).unwrap();
        assert_eq!(
            engine.render("{% assign name = 'Liquid' %}{{ name }}").unwrap(),
            "Liquid"
        );
    }

    #[test]
    fn test_render_syntax_error() {
        let engine = TemplateEngine::new(vec![], "liquid", &BTreeMap::new()).unwrap();
        assert!(matches!(engine.render("{% if %}"), Err(RenderError::Template(_))));
    }

    #[test]
    fn test_include_from_second_root_with_extension_appended() {
        let dir = tempfile::tempdir().unwrap();
        let snippets = dir.path().join("snippets");
        fs::create_dir_all(&snippets).unwrap();
        fs::write(snippets.join("header.liquid"), "<h1>{{ title }}</h1>").unwrap();

        let engine = TemplateEngine::new(
            vec![dir.path().to_path_buf(), snippets],
            "liquid",
            &globals(&[("title", "Welcome")]),
        )
        .unwrap();
        assert_eq!(engine.render("{% include 'header' %}").unwrap(), "<h1>Welcome</h1>");
    }

    #[test]
    fn test_include_cannot_escape_roots() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("site");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join("secret.liquid"), "secret").unwrap();

        let engine = TemplateEngine::new(vec![root], "liquid", &BTreeMap::new()).unwrap();
        assert!(matches!(
            engine.render("{% include '../secret' %}"),
            Err(RenderError::Template(_))
        ));
    }

    #[test]
    fn test_missing_partial_is_template_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = TemplateEngine::new(vec![dir.path().to_path_buf()], "liquid", &BTreeMap::new()).unwrap();
        assert!(matches!(engine.render("{% include 'nope' %}"), Err(RenderError::Template(_))));
    }
}
