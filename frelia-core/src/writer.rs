use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::page::RenderedPage;

/// Writes rendered pages under an output directory.
pub struct PageWriter {
    output_dir: PathBuf,
}

impl PageWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            output_dir: path.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write pages until the stream ends or yields an error.
    ///
    /// Returns the number of pages written. Files written before an error
    /// are left in place.
    pub fn write<I>(&self, pages: I) -> Result<usize, PipelineError>
    where
        I: IntoIterator<Item = Result<RenderedPage, PipelineError>>,
    {
        let mut written = 0;
        for page in pages {
            self.write_page(&page?)?;
            written += 1;
        }
        Ok(written)
    }

    fn write_page(&self, page: &RenderedPage) -> Result<(), PipelineError> {
        let output_path = self.output_dir.join(&page.path);
        let to_error = |source| PipelineError::Write {
            path: output_path.clone(),
            source,
        };

        // Ensure parent directory exists
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(to_error)?;
        }
        fs::write(&output_path, page.text()).map_err(to_error)?;

        tracing::debug!(path = %output_path.display(), "wrote page");
        Ok(())
    }
}
