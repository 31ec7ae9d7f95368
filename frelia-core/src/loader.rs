use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::document::{self, DocumentError};
use crate::error::PipelineError;
use crate::page::Page;
use crate::transform::Stream;

/// Loads every file under a directory as a page.
///
/// Page paths are relative to the source directory and slash-separated.
/// Files are read one at a time, as the stream is pulled.
pub struct PageLoader {
    source_dir: PathBuf,
}

impl PageLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            source_dir: path.as_ref().to_path_buf(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn load(&self) -> Stream<'_, Page> {
        tracing::debug!(source = %self.source_dir.display(), "scanning");

        let entries = WalkDir::new(&self.source_dir)
            .sort_by_file_name()
            .into_iter()
            .filter(|entry| !matches!(entry, Ok(e) if e.file_type().is_dir()));

        Box::new(entries.map(move |entry| self.load_page(entry?.path())))
    }

    fn load_page(&self, path: &Path) -> Result<Page, PipelineError> {
        let relative = relative_path(&self.source_dir, path);
        let document = read_document(path).map_err(|source| PipelineError::Load {
            path: relative.clone(),
            source,
        })?;

        tracing::debug!(path = %relative, "loaded page");
        Ok(Page::new(relative, document))
    }
}

fn read_document(path: &Path) -> Result<document::Document, DocumentError> {
    let file = File::open(path)?;
    document::read(BufReader::new(file))
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
