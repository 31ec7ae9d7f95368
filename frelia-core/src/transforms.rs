//! Built-in page and document transforms.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use pulldown_cmark::{Options, Parser, html};

use crate::document::Document;
use crate::page::Page;
use crate::renderer::DocumentRenderer;
use crate::template::{TemplateError, TemplateRenderer, document_context};
use crate::transform::{Stream, Transform};

/// Template used for documents without a `template` field.
pub const DEFAULT_TEMPLATE: &str = "base.html";

/// Metadata field naming the template a document is rendered with.
pub const TEMPLATE_KEY: &str = "template";

/// Name the inline template is registered under.
const INLINE_TEMPLATE: &str = "__frelia_inline__";

/// Replaces each document's body with a named template rendered against it.
///
/// The template is taken from the document's `template` field, falling back
/// to the default template. The context is the metadata plus `content`
/// holding the original body. Metadata passes through unchanged.
#[derive(Clone)]
pub struct RenderTemplate {
    renderer: Arc<TemplateRenderer>,
    default_template: String,
}

impl RenderTemplate {
    pub fn new(renderer: Arc<TemplateRenderer>) -> Self {
        Self {
            renderer,
            default_template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    pub fn with_default_template(mut self, name: impl Into<String>) -> Self {
        self.default_template = name.into();
        self
    }

    pub fn template_name<'d>(&'d self, document: &'d Document) -> &'d str {
        document.get_str(TEMPLATE_KEY).unwrap_or(&self.default_template)
    }
}

impl DocumentRenderer for RenderTemplate {
    fn render(&self, document: &Document) -> Result<String, TemplateError> {
        let template = self.template_name(document);
        tracing::debug!(template, "rendering document");
        self.renderer
            .render_with_context(template, &document_context(document))
    }
}

impl Transform<Document> for RenderTemplate {
    fn apply<'a>(&'a self, items: Stream<'a, Document>) -> Stream<'a, Document>
    where
        Document: 'a,
    {
        Box::new(items.map(move |item| {
            let document = item?;
            let content = self.render(&document)?;
            Ok(document.with_content(content))
        }))
    }
}

/// Like [`RenderTemplate`], but with one template given as source text.
///
/// The source is compiled once, against the same environment, so it can
/// extend or include named templates.
pub struct RenderInlineTemplate {
    renderer: TemplateRenderer,
}

impl RenderInlineTemplate {
    pub fn new(renderer: &TemplateRenderer, source: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            renderer: renderer.with_template(INLINE_TEMPLATE, source)?,
        })
    }
}

impl DocumentRenderer for RenderInlineTemplate {
    fn render(&self, document: &Document) -> Result<String, TemplateError> {
        self.renderer
            .render_with_context(INLINE_TEMPLATE, &document_context(document))
    }
}

impl Transform<Document> for RenderInlineTemplate {
    fn apply<'a>(&'a self, items: Stream<'a, Document>) -> Stream<'a, Document>
    where
        Document: 'a,
    {
        Box::new(items.map(move |item| {
            let document = item?;
            let content = self.render(&document)?;
            Ok(document.with_content(content))
        }))
    }
}

/// Converts a Markdown body to HTML.
pub fn render_markdown(document: Document) -> Document {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(&document.content, options);

    let mut out = String::new();
    html::push_html(&mut out, parser);
    document.with_content(out)
}

/// Strips a leading directory from page paths.
///
/// Paths outside the prefix are left alone.
pub struct RebasePagePath {
    prefix: String,
}

impl RebasePagePath {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn rebase<'p>(&self, path: &'p str) -> &'p str {
        path.strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path)
    }
}

impl Transform<Page> for RebasePagePath {
    fn apply<'a>(&'a self, items: Stream<'a, Page>) -> Stream<'a, Page>
    where
        Page: 'a,
    {
        Box::new(items.map(move |item| {
            let page = item?;
            let path = self.rebase(&page.path).to_string();
            Ok(page.with_path(path))
        }))
    }
}

/// Drops a trailing `.html` so pages get extensionless URLs.
///
/// `index.html` keeps its name, since servers look for it by that name.
pub fn strip_extension(page: Page) -> Page {
    if page.file_name() == "index.html" {
        return page;
    }
    match page.path.strip_suffix(".html") {
        Some(stem) => {
            let path = stem.to_string();
            page.with_path(path)
        }
        None => page,
    }
}

/// Sets a date field from a `YYYY/MM/DD` run of path segments.
///
/// Documents that already have the field keep it. Paths without a valid
/// date leave the metadata as it is.
pub struct SetDateFromPath {
    key: String,
}

impl SetDateFromPath {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn set_date(&self, page: Page) -> Page {
        if page.payload.metadata.contains_key(&self.key) {
            return page;
        }
        let Some(date) = date_from_path(&page.path) else {
            return page;
        };
        let key = self.key.clone();
        page.map(|document| document.with_field(key, toml_date(date)))
    }
}

impl Transform<Page> for SetDateFromPath {
    fn apply<'a>(&'a self, items: Stream<'a, Page>) -> Stream<'a, Page>
    where
        Page: 'a,
    {
        Box::new(items.map(move |item| item.map(|page| self.set_date(page))))
    }
}

/// Leftmost run of three segments forming a valid calendar date.
pub fn date_from_path(path: &str) -> Option<NaiveDate> {
    let segments: Vec<&str> = path.split('/').collect();
    segments
        .windows(3)
        .find_map(|run| parse_date(run[0], run[1], run[2]))
}

fn parse_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    if !(is_digits(year, 4) && is_digits(month, 2) && is_digits(day, 2)) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn is_digits(segment: &str, len: usize) -> bool {
    segment.len() == len && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Date-only TOML value. Years come from four digits, so they fit in `u16`.
fn toml_date(date: NaiveDate) -> toml::value::Datetime {
    toml::value::Datetime {
        date: Some(toml::value::Date {
            year: date.year() as u16,
            month: date.month() as u8,
            day: date.day() as u8,
        }),
        time: None,
        offset: None,
    }
}
