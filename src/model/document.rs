//! Document structure and metadata.

use super::{Node, NodeKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// A complete document parsed from an ODT package.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,
    /// Children of `office:body/office:text`
    pub body: Vec<Node>,
    /// Pictures stored in the package, keyed by their path inside it
    #[serde(skip)]
    pub pictures: BTreeMap<String, Picture>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document from body nodes.
    pub fn from_body(body: Vec<Node>) -> Self {
        Self {
            body,
            ..Default::default()
        }
    }

    /// Counts body nodes of every depth matching the predicate.
    pub fn count(&self, predicate: impl Fn(&NodeKind) -> bool) -> usize {
        self.body.iter().map(|n| n.count(&predicate)).sum()
    }

    /// Returns the total number of paragraphs in the document.
    pub fn paragraph_count(&self) -> usize {
        self.count(|k| matches!(k, NodeKind::Paragraph { .. }))
    }

    /// Returns the number of headings in the document.
    pub fn heading_count(&self) -> usize {
        self.count(|k| matches!(k, NodeKind::Heading { .. }))
    }

    /// Returns the number of tables in the document.
    pub fn table_count(&self) -> usize {
        self.count(|k| matches!(k, NodeKind::Table))
    }

    /// Returns the node tree as pretty-printed JSON.
    pub fn raw_content(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Document metadata from `meta.xml`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
    /// Application that created the document
    pub generator: Option<String>,
}

/// A picture stored in the package.
#[derive(Debug, Clone, Serialize)]
pub struct Picture {
    /// Path inside the package, e.g. `Pictures/1000000.png`
    pub path: String,
    /// Binary data
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Picture {
    /// Creates a picture entry.
    pub fn new(path: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    /// Returns the file name within the package folder.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Returns the extension including the leading dot, or an empty string.
    pub fn extension(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(pos) if pos > 0 => &name[pos..],
            _ => "",
        }
    }
}
