//! reStructuredText rendering for documents.

mod inline;
mod options;
mod rst;
mod sink;
mod table;

pub use inline::{code_text, raw_text, InlineRenderer};
pub use options::{ErrorMode, RenderOptions, StyleNames};
pub use rst::RstRenderer;
pub use sink::{ImageRegistry, OutputSink};
pub use table::{column_widths, grow_column_widths, render_grid, render_table};

use crate::assets::PictureMap;
use crate::error::Result;
use crate::model::Document;
use std::io::Write;
use std::path::Path;

/// Renders a document to reStructuredText.
pub fn render_rst(document: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = RstRenderer::new(options.clone());
    renderer.render(document)
}

/// Renders a document to reStructuredText, resolving image paths through `pictures`.
pub fn render_rst_with_pictures(
    document: &Document,
    options: &RenderOptions,
    pictures: &PictureMap,
) -> Result<String> {
    let renderer = RstRenderer::new(options.clone());
    renderer.render_with_pictures(document, pictures)
}

/// Renders a document to reStructuredText and writes to a file.
pub fn render_to_file(
    document: &Document,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<()> {
    let content = render_rst(document, options)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Renders a document to reStructuredText and writes to a writer.
pub fn render_to_writer<W: Write>(
    document: &Document,
    writer: &mut W,
    options: &RenderOptions,
) -> Result<()> {
    let content = render_rst(document, options)?;
    writer.write_all(content.as_bytes())?;
    Ok(())
}
