use std::path::PathBuf;

use thiserror::Error;

use crate::document::DocumentError;
use crate::template::TemplateError;

/// Error travelling through a page stream. The first one ends the build.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: DocumentError,
    },
    #[error("cannot scan source directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("cannot render {path}: {source}")]
    Render {
        path: String,
        #[source]
        source: TemplateError,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("document transform yielded more documents than pages it was given")]
    Unpaired,
}

impl PipelineError {
    /// Attach the page path to an error raised while handling that page's document.
    pub fn in_page(self, path: impl Into<String>) -> Self {
        match self {
            PipelineError::Template(source) => PipelineError::Render {
                path: path.into(),
                source,
            },
            other => other,
        }
    }
}
