//! # unodt
//!
//! A Rust library for converting OpenDocument Text files into
//! reStructuredText with synchronised image folders.
//!
//! ## Supported Formats
//!
//! - **ODT**: Zipped OpenDocument packages (`.odt`, `.ott`)
//! - **Flat ODT**: Single-file XML documents (`.fodt`)
//!
//! Documents written by docutils' ODF writer convert back with their
//! headings, lists, admonitions, definitions, code blocks, figures and
//! grid tables intact.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unodt::{parse_file, RenderOptions};
//!
//! fn main() -> unodt::Result<()> {
//!     // Parse a document
//!     let document = parse_file("document.odt")?;
//!
//!     // Render to reStructuredText
//!     let options = RenderOptions::default();
//!     let rst = unodt::render::render_rst(&document, &options)?;
//!
//!     println!("{}", rst);
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod detect;
pub mod error;
pub mod model;
pub mod odt;
pub mod render;

// Re-exports
pub use assets::{synchronize_pictures, PictureMap};
pub use detect::{detect_format, detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use model::Document;
pub use render::{ErrorMode, RenderOptions, StyleNames};

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

/// Default image folder, relative to the output document.
pub const DEFAULT_IMAGE_DIR: &str = "images";

/// Parses a document from a file path.
///
/// Automatically detects whether the file is a zipped package or flat XML.
///
/// # Example
///
/// ```no_run
/// use unodt::parse_file;
///
/// let document = parse_file("example.odt")?;
/// println!("Paragraphs: {}", document.paragraph_count());
/// # Ok::<(), unodt::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let format = detect_format_from_path(path)?;

    match format {
        FormatType::Odt => {
            let mut parser = odt::OdtParser::open(path)?;
            parser.parse()
        }
        FormatType::FlatOdt => {
            let data = std::fs::read(path)?;
            odt::parse_flat(std::str::from_utf8(&data)?)
        }
    }
}

/// Parses a document from a reader.
///
/// Automatically detects the format and uses the appropriate parser.
pub fn parse_reader<R: Read + Seek>(reader: R) -> Result<Document> {
    let mut buf_reader = std::io::BufReader::new(reader);
    let format = detect::detect_format(&mut buf_reader)?;

    match format {
        FormatType::Odt => {
            let mut parser = odt::OdtParser::from_reader(buf_reader)?;
            parser.parse()
        }
        FormatType::FlatOdt => {
            let mut data = Vec::new();
            buf_reader.read_to_end(&mut data)?;
            odt::parse_flat(std::str::from_utf8(&data)?)
        }
    }
}

/// Parses a document from bytes.
///
/// Automatically detects the format and uses the appropriate parser.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let cursor = std::io::Cursor::new(data);
    parse_reader(cursor)
}

/// Converts a document to reStructuredText with default options.
///
/// Image paths are left as they appear inside the package.
///
/// # Example
///
/// ```no_run
/// use unodt::to_rst;
///
/// let rst = to_rst("document.odt")?;
/// std::fs::write("output.rst", rst)?;
/// # Ok::<(), unodt::Error>(())
/// ```
pub fn to_rst(path: impl AsRef<Path>) -> Result<String> {
    let document = parse_file(path)?;
    render::render_rst(&document, &RenderOptions::default())
}

/// Converts a document to reStructuredText with custom options.
///
/// # Example
///
/// ```no_run
/// use unodt::{to_rst_with_options, RenderOptions};
///
/// let options = RenderOptions::default()
///     .lenient()
///     .without_sentence_split();
///
/// let rst = to_rst_with_options("document.odt", &options)?;
/// std::fs::write("output.rst", rst)?;
/// # Ok::<(), unodt::Error>(())
/// ```
pub fn to_rst_with_options(path: impl AsRef<Path>, options: &RenderOptions) -> Result<String> {
    let document = parse_file(path)?;
    render::render_rst(&document, options)
}

/// Converts `input` to `output`, synchronising pictures into `images`
/// (relative to the output file's folder).
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    images: impl Into<String>,
) -> Result<()> {
    Unodt::new()
        .with_image_dir(images)
        .parse(input)?
        .write_to(output)?;
    Ok(())
}

/// Builder for parsing and rendering documents.
///
/// Provides a fluent API for configuring document processing.
///
/// # Example
///
/// ```no_run
/// use unodt::Unodt;
///
/// Unodt::new()
///     .with_image_dir("assets")
///     .lenient()
///     .parse("document.odt")?
///     .write_to("document.rst")?;
/// # Ok::<(), unodt::Error>(())
/// ```
pub struct Unodt {
    render_options: RenderOptions,
    image_dir: String,
    sync_images: bool,
}

impl Default for Unodt {
    fn default() -> Self {
        Self::new()
    }
}

impl Unodt {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            render_options: RenderOptions::default(),
            image_dir: DEFAULT_IMAGE_DIR.to_string(),
            sync_images: true,
        }
    }

    /// Enables or disables picture synchronisation on [`ParsedDocument::write_to`].
    pub fn with_images(mut self, sync: bool) -> Self {
        self.sync_images = sync;
        self
    }

    /// Sets the image folder, relative to the output document.
    pub fn with_image_dir(mut self, dir: impl Into<String>) -> Self {
        self.image_dir = dir.into();
        self
    }

    /// Skips malformed tables instead of failing.
    pub fn lenient(mut self) -> Self {
        self.render_options = self.render_options.lenient();
        self
    }

    /// Writes debug markers into the output.
    pub fn with_debug_markers(mut self) -> Self {
        self.render_options = self.render_options.with_debug_markers();
        self
    }

    /// Replaces the render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Parses a document from a file path.
    pub fn parse(self, path: impl AsRef<Path>) -> Result<ParsedDocument> {
        let document = parse_file(path)?;
        Ok(self.wrap(document))
    }

    /// Parses a document from bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<ParsedDocument> {
        let document = parse_bytes(data)?;
        Ok(self.wrap(document))
    }

    fn wrap(self, document: Document) -> ParsedDocument {
        ParsedDocument {
            document,
            render_options: self.render_options,
            image_dir: self.image_dir,
            sync_images: self.sync_images,
        }
    }
}

/// A parsed document ready for rendering.
pub struct ParsedDocument {
    document: Document,
    render_options: RenderOptions,
    image_dir: String,
    sync_images: bool,
}

impl ParsedDocument {
    /// Returns a reference to the underlying document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Renders the document with package image paths.
    pub fn to_rst(&self) -> Result<String> {
        render::render_rst(&self.document, &self.render_options)
    }

    /// Renders the document, resolving image paths through `pictures`.
    pub fn to_rst_with_pictures(&self, pictures: &PictureMap) -> Result<String> {
        render::render_rst_with_pictures(&self.document, &self.render_options, pictures)
    }

    /// Synchronises the pictures next to `output` and writes the rendered document.
    ///
    /// Returns the picture map used for rendering.
    pub fn write_to(&self, output: impl AsRef<Path>) -> Result<PictureMap> {
        let output = output.as_ref();

        let pictures = if self.sync_images {
            let output_dir = output_folder(output);
            synchronize_pictures(&self.document.pictures, &output_dir, &self.image_dir)?
        } else {
            PictureMap::new()
        };

        log::info!(
            "writing {} ({} pictures mapped)",
            output.display(),
            pictures.len()
        );

        let content = self.to_rst_with_pictures(&pictures)?;
        std::fs::write(output, content)?;
        Ok(pictures)
    }

    /// Returns the number of paragraphs in the document.
    pub fn paragraph_count(&self) -> usize {
        self.document.paragraph_count()
    }

    /// Consumes self and returns the underlying document.
    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Returns the folder holding `output`, or the current folder for bare names.
fn output_folder(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Returns `input` with its extension replaced by `.rst`.
pub fn default_output_path(input: impl AsRef<Path>) -> PathBuf {
    input.as_ref().with_extension("rst")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0"
    xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0"
    xmlns:dc="http://purl.org/dc/elements/1.1/">
  <office:meta><dc:title>Flat</dc:title></office:meta>
  <office:body><office:text><text:h text:outline-level="2">Flat doc</text:h><text:p text:style-name="Standard">Body.</text:p></office:text></office:body>
</office:document>"#;

    #[test]
    fn test_parse_flat_bytes() {
        let document = parse_bytes(FLAT.as_bytes()).unwrap();
        assert_eq!(document.heading_count(), 1);
        assert_eq!(document.paragraph_count(), 1);
        assert_eq!(document.metadata.title.as_deref(), Some("Flat"));
    }

    #[test]
    fn test_builder_renders_flat_document() {
        let rst = Unodt::new()
            .parse_bytes(FLAT.as_bytes())
            .unwrap()
            .to_rst()
            .unwrap();
        assert_eq!(rst, "\n\nFlat doc\n========\n\nBody.\n");
    }

    #[test]
    fn test_parse_bytes_unknown_format() {
        let result = parse_bytes(b"\xFF\xFE\x00\x01garbage");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_parse_bytes_too_short() {
        assert!(matches!(parse_bytes(b"<"), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_builder_options() {
        let builder = Unodt::new()
            .with_images(false)
            .with_image_dir("assets")
            .lenient()
            .with_debug_markers();

        assert!(!builder.sync_images);
        assert_eq!(builder.image_dir, "assets");
        assert!(builder.render_options.is_lenient());
        assert!(builder.render_options.debug_markers);
    }

    #[test]
    fn test_output_folder() {
        assert_eq!(output_folder(Path::new("doc.rst")), PathBuf::from("."));
        assert_eq!(
            output_folder(Path::new("out/doc.rst")),
            PathBuf::from("out")
        );
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path("manual.odt"),
            PathBuf::from("manual.rst")
        );
        assert_eq!(
            default_output_path("dir/manual.v2.odt"),
            PathBuf::from("dir/manual.v2.rst")
        );
    }

    #[test]
    fn test_document_model_empty() {
        let doc = model::Document::new();
        assert!(doc.body.is_empty());
        assert!(doc.pictures.is_empty());
        assert!(doc.metadata.title.is_none());
    }
}
