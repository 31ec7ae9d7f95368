//! Documents: a metadata table paired with a body.
//!
//! On disk a document is TOML front matter, a line holding only `---`, and
//! then the body:
//!
//! ```text
//! title = "Hello"
//! template = "post.html"
//! ---
//! <p>Hello world!</p>
//! ```

use std::io::{Read, Write};

use thiserror::Error;

/// Line separating the metadata header from the body.
pub const SEPARATOR: &str = "---";

/// Document metadata, keyed by field name.
pub type Metadata = toml::Table;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing `---` line between metadata and body")]
    MissingSeparator,
    #[error("invalid metadata: {0}")]
    Metadata(#[from] toml::de::Error),
    #[error("cannot serialize metadata: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Unrendered unit of content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub metadata: Metadata,
    pub content: String,
}

impl Document {
    pub fn new(metadata: Metadata, content: impl Into<String>) -> Self {
        Self {
            metadata,
            content: content.into(),
        }
    }

    /// Same metadata, different body.
    pub fn with_content(self, content: impl Into<String>) -> Self {
        Self {
            metadata: self.metadata,
            content: content.into(),
        }
    }

    /// Same body, with `key` set to `value`.
    pub fn with_field(self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        let mut metadata = self.metadata;
        metadata.insert(key.into(), value.into());
        Self {
            metadata,
            content: self.content,
        }
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.metadata.get(key)
    }

    /// String-valued field, `None` if missing or of another type.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(toml::Value::as_str)
    }
}

/// Parse a document from its on-disk text.
pub fn parse(text: &str) -> Result<Document, DocumentError> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == SEPARATOR {
            let metadata: Metadata = toml::from_str(&text[..offset])?;
            return Ok(Document::new(metadata, &text[offset + line.len()..]));
        }
        offset += line.len();
    }

    Err(DocumentError::MissingSeparator)
}

/// Read a document from a stream.
pub fn read<R: Read>(mut reader: R) -> Result<Document, DocumentError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse(&text)
}

/// Serialize a document to its on-disk text.
pub fn to_string(document: &Document) -> Result<String, DocumentError> {
    let mut out = toml::to_string(&document.metadata)?;
    out.push_str(SEPARATOR);
    out.push('\n');
    out.push_str(&document.content);
    Ok(out)
}

/// Write a document to a stream.
pub fn write<W: Write>(document: &Document, mut writer: W) -> Result<(), DocumentError> {
    writer.write_all(to_string(document)?.as_bytes())?;
    Ok(())
}
