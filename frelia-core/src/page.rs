//! Webpages.
//!
//! A page pairs the path it will be written to with its payload. Before
//! rendering the payload is a [`Document`]; afterwards it is the final text.
//! Paths are relative and slash-separated, and are not validated here.

use crate::document::Document;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T = Document> {
    pub path: String,
    pub payload: T,
}

/// Page holding its final text, ready to be written.
pub type RenderedPage = Page<String>;

impl<T> Page<T> {
    pub fn new(path: impl Into<String>, payload: T) -> Self {
        Self {
            path: path.into(),
            payload,
        }
    }

    /// Same payload at another path.
    pub fn with_path(self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            payload: self.payload,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Page<U> {
        Page {
            path: self.path,
            payload: f(self.payload),
        }
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

impl Page {
    pub fn document(&self) -> &Document {
        &self.payload
    }
}

impl RenderedPage {
    pub fn text(&self) -> &str {
        &self.payload
    }
}
