use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::error::PipelineError;
use crate::loader::PageLoader;
use crate::page::Page;
use crate::renderer::{BodyRenderer, DocumentRenderer, PageRenderer};
use crate::template::{TemplateError, TemplateRenderer};
use crate::transform::{Transform, TransformGroup};
use crate::writer::PageWriter;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Source directory not specified")]
    MissingSourceDir,
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

pub struct SiteBuilder {
    source_dir: Option<PathBuf>,
    output_dir: PathBuf,
    transforms: TransformGroup<Page>,
    renderer: Box<dyn DocumentRenderer>,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self {
            source_dir: None,
            output_dir: PathBuf::from("./out"),
            transforms: TransformGroup::default(),
            renderer: Box::new(BodyRenderer),
        }
    }

    // Required configuration
    pub fn source_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = path.as_ref().to_path_buf();
        self
    }

    /// Append one transform to the pipeline.
    pub fn transform(mut self, transform: impl Transform<Page> + 'static) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Replace the whole pipeline.
    pub fn transforms(mut self, transforms: TransformGroup<Page>) -> Self {
        self.transforms = transforms;
        self
    }

    /// How documents leaving the pipeline become text. Defaults to their body.
    pub fn renderer(mut self, renderer: impl DocumentRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn build(self) -> Result<Site, BuildError> {
        let source_dir = self.source_dir.ok_or(BuildError::MissingSourceDir)?;

        Ok(Site {
            loader: PageLoader::new(source_dir),
            transforms: self.transforms,
            renderer: PageRenderer::new(self.renderer),
            writer: PageWriter::new(self.output_dir),
        })
    }
}

/// A configured pipeline from source directory to output directory.
pub struct Site {
    loader: PageLoader,
    transforms: TransformGroup<Page>,
    renderer: PageRenderer<Box<dyn DocumentRenderer>>,
    writer: PageWriter,
}

impl Site {
    pub fn source_dir(&self) -> &Path {
        self.loader.source_dir()
    }

    pub fn output_dir(&self) -> &Path {
        self.writer.output_dir()
    }

    /// Load, transform, render and write every page. Returns the page count.
    ///
    /// Stops at the first error; pages written before it stay on disk.
    pub fn render_all(&self) -> Result<usize, PipelineError> {
        let pages = self.transforms.apply(self.loader.load());
        let written = self.writer.write(self.renderer.render(pages))?;

        tracing::info!(
            pages = written,
            output = %self.output_dir().display(),
            "site built"
        );
        Ok(written)
    }
}

/// Build a site the way `frelia build` does.
///
/// `templates` is a glob such as `templates/**/*.html`; template names are
/// relative to the directory the glob starts in.
pub fn build_site(
    config: &Config,
    source_dir: &Path,
    output_dir: &Path,
    templates: &str,
) -> Result<usize, BuildError> {
    let mut renderer = TemplateRenderer::new(templates)?;
    renderer.set_autoescape(config.autoescape);

    let site = SiteBuilder::new()
        .source_dir(source_dir)
        .output_dir(output_dir)
        .transforms(config.pipeline(&Arc::new(renderer))?)
        .build()?;

    Ok(site.render_all()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_dir() {
        assert!(matches!(SiteBuilder::new().build(), Err(BuildError::MissingSourceDir)));
    }

    #[test]
    fn test_builder_paths() {
        let site = SiteBuilder::new().source_dir("site").output_dir("public").build().unwrap();
        assert_eq!(site.source_dir(), Path::new("site"));
        assert_eq!(site.output_dir(), Path::new("public"));
    }

    #[test]
    fn test_default_output_dir() {
        let site = SiteBuilder::new().source_dir("site").build().unwrap();
        assert_eq!(site.output_dir(), Path::new("./out"));
    }
}
