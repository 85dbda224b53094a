//! ODT (OpenDocument Text) package parser.
//!
//! ODT files are ZIP archives whose `content.xml` holds the document body.
//! Flat `.fodt` files carry the same body in a single XML document.

mod container;
mod content;

pub use container::OdtContainer;
pub use content::{build_tree, parse_content};

use crate::error::Result;
use crate::model::{Document, Metadata, Picture};
use std::io::{Read, Seek};
use std::path::Path;

/// ODT document parser.
pub struct OdtParser {
    container: OdtContainer,
}

impl OdtParser {
    /// Opens an ODT document from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let container = OdtContainer::open(path)?;
        Ok(Self { container })
    }

    /// Opens an ODT document from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let container = OdtContainer::from_reader(reader)?;
        Ok(Self { container })
    }

    /// Parses the package into the document model.
    pub fn parse(&mut self) -> Result<Document> {
        self.container.verify_mimetype()?;

        let mut document = Document::new();

        let content_xml = self.container.read_content_xml()?;
        document.body = parse_content(&content_xml)?;

        if let Some(meta_xml) = self.container.read_meta_xml() {
            document.metadata = parse_metadata(&meta_xml);
        }

        self.extract_pictures(&mut document)?;

        log::debug!(
            "parsed ODT package: {} body nodes, {} pictures",
            document.body.len(),
            document.pictures.len()
        );

        Ok(document)
    }

    /// Reads the PNG and JPEG pictures of the package.
    fn extract_pictures(&mut self, document: &mut Document) -> Result<()> {
        for path in self.container.list_pictures() {
            let data = self.container.read_binary(&path)?;
            document
                .pictures
                .insert(path.clone(), Picture::new(path, data));
        }
        Ok(())
    }
}

/// Parses a flat (single XML) ODT document.
pub fn parse_flat(xml: &str) -> Result<Document> {
    let mut document = Document::from_body(parse_content(xml)?);
    if let Some(meta) = meta_section(xml) {
        document.metadata = parse_metadata(meta);
    }
    Ok(document)
}

/// Returns the contents of the `office:meta` element of a flat document.
///
/// Annotations in the body carry their own `dc:creator`, so metadata is
/// only read from this slice.
fn meta_section(xml: &str) -> Option<&str> {
    const OPEN: &str = "<office:meta";
    const CLOSE: &str = "</office:meta>";

    let mut offset = 0;
    while let Some(found) = xml[offset..].find(OPEN) {
        let after = offset + found + OPEN.len();
        match xml[after..].chars().next() {
            Some(c) if c == '>' || c.is_whitespace() => {
                let start = after + xml[after..].find('>')? + 1;
                let end = xml[start..].find(CLOSE)?;
                return Some(&xml[start..start + end]);
            }
            _ => offset = after,
        }
    }
    None
}

/// Reads title, author and generator from meta.xml.
fn parse_metadata(xml: &str) -> Metadata {
    Metadata {
        title: extract_metadata_field(xml, "dc:title"),
        author: extract_metadata_field(xml, "meta:initial-creator")
            .or_else(|| extract_metadata_field(xml, "dc:creator")),
        generator: extract_metadata_field(xml, "meta:generator"),
    }
}

/// Extracts the text of the first `<tag>...</tag>` occurrence.
fn extract_metadata_field(xml: &str, tag: &str) -> Option<String> {
    let start_tag = format!("<{}>", tag);
    let end_tag = format!("</{}>", tag);

    let start = xml.find(&start_tag)? + start_tag.len();
    let end = xml[start..].find(&end_tag)?;
    let value = xml[start..start + end].trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_metadata() {
        let meta = r#"<office:document-meta><office:meta>
            <meta:generator>LibreOffice/7.6</meta:generator>
            <dc:title>Manual</dc:title>
            <dc:creator>Someone</dc:creator>
        </office:meta></office:document-meta>"#;

        let metadata = parse_metadata(meta);
        assert_eq!(metadata.title.as_deref(), Some("Manual"));
        assert_eq!(metadata.author.as_deref(), Some("Someone"));
        assert_eq!(metadata.generator.as_deref(), Some("LibreOffice/7.6"));
    }

    #[test]
    fn test_initial_creator_preferred() {
        let meta = "<meta:initial-creator>First</meta:initial-creator><dc:creator>Last</dc:creator>";
        assert_eq!(parse_metadata(meta).author.as_deref(), Some("First"));
    }

    #[test]
    fn test_flat_author_ignores_annotations() {
        let xml = r#"<office:document xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0"
    xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"
    xmlns:dc="http://purl.org/dc/elements/1.1/">
  <office:meta><dc:title>Flat</dc:title></office:meta>
  <office:body><office:text>
    <text:p>Body<office:annotation><dc:creator>Reviewer</dc:creator><text:p>note</text:p></office:annotation></text:p>
  </office:text></office:body>
</office:document>"#;

        let document = parse_flat(xml).unwrap();
        assert_eq!(document.metadata.title.as_deref(), Some("Flat"));
        assert!(document.metadata.author.is_none());
    }

    #[test]
    fn test_flat_without_meta_section() {
        let xml = r#"<office:document xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0"
    xmlns:dc="http://purl.org/dc/elements/1.1/">
  <office:body><office:text><dc:title>Not metadata</dc:title></office:text></office:body>
</office:document>"#;

        assert!(parse_flat(xml).unwrap().metadata.title.is_none());
    }

    #[test]
    fn test_meta_section_slice() {
        let xml = "<office:meta-extra/><office:meta id=\"m\"><dc:title>T</dc:title></office:meta><dc:title>X</dc:title>";
        assert_eq!(meta_section(xml), Some("<dc:title>T</dc:title>"));
        assert!(meta_section("<office:body/>").is_none());
    }

    #[test]
    fn test_empty_field_is_none() {
        assert!(extract_metadata_field("<dc:title> </dc:title>", "dc:title").is_none());
        assert!(extract_metadata_field("<dc:title>open", "dc:title").is_none());
    }
}
