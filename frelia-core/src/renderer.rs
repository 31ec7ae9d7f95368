use crate::document::Document;
use crate::error::PipelineError;
use crate::page::{Page, RenderedPage};
use crate::template::TemplateError;
use crate::transform::Stream;

/// Turns a document into the final text of its page.
pub trait DocumentRenderer {
    fn render(&self, document: &Document) -> Result<String, TemplateError>;
}

impl<R: DocumentRenderer + ?Sized> DocumentRenderer for Box<R> {
    fn render(&self, document: &Document) -> Result<String, TemplateError> {
        (**self).render(document)
    }
}

/// Uses the body as is, for pipelines that already rendered it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyRenderer;

impl DocumentRenderer for BodyRenderer {
    fn render(&self, document: &Document) -> Result<String, TemplateError> {
        Ok(document.content.clone())
    }
}

/// Last stage of a pipeline: pages with documents in, pages with text out.
pub struct PageRenderer<R> {
    renderer: R,
}

impl<R: DocumentRenderer> PageRenderer<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    pub fn render<'a>(&'a self, pages: Stream<'a, Page>) -> Stream<'a, RenderedPage> {
        Box::new(pages.map(move |item| {
            let page = item?;
            match self.renderer.render(&page.payload) {
                Ok(text) => {
                    tracing::debug!(path = %page.path, "rendered page");
                    Ok(Page::new(page.path, text))
                }
                Err(source) => Err(PipelineError::Render {
                    path: page.path,
                    source,
                }),
            }
        }))
    }
}
