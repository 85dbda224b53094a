//! Inline content rendering.

use super::options::StyleNames;
use super::sink::ImageRegistry;
use crate::assets::PictureMap;
use crate::model::{Node, NodeKind};

/// Renders the inline content of paragraphs, headings and table cells.
#[derive(Debug, Clone, Copy)]
pub struct InlineRenderer<'a> {
    styles: &'a StyleNames,
    pictures: &'a PictureMap,
}

impl<'a> InlineRenderer<'a> {
    /// Creates a renderer resolving image paths through `pictures`.
    pub fn new(styles: &'a StyleNames, pictures: &'a PictureMap) -> Self {
        Self { styles, pictures }
    }

    /// Renders a node's text and children as one line of markup.
    ///
    /// Inline images are registered in `images` and replaced by their
    /// `|name|` substitution reference.
    pub fn render(&self, node: &Node, images: &mut ImageRegistry) -> String {
        let mut output = String::new();
        self.render_content(node, images, &mut output);
        output.replace('\n', " ")
    }

    fn render_content(&self, node: &Node, images: &mut ImageRegistry, output: &mut String) {
        output.push_str(&node.text);
        for child in &node.children {
            self.render_child(child, images, output);
            output.push_str(&child.tail);
        }
    }

    fn render_child(&self, child: &Node, images: &mut ImageRegistry, output: &mut String) {
        match &child.kind {
            NodeKind::Span { style } => {
                let mut inner = String::new();
                self.render_content(child, images, &mut inner);

                match self.marker(style.as_deref()) {
                    Some(marker) if !inner.is_empty() && !self.has_styled_descendant(child) => {
                        output.push_str(marker);
                        output.push_str(&inner);
                        output.push_str(marker);
                    }
                    _ => output.push_str(&inner),
                }
            }
            NodeKind::Paragraph { .. } | NodeKind::Heading { .. } => {
                self.render_content(child, images, output);
            }
            NodeKind::Link { href } => {
                let mut inner = String::new();
                self.render_content(child, images, &mut inner);
                let label = inner.trim();

                if href.is_empty() {
                    output.push_str(&inner);
                } else if label.is_empty() || label == href {
                    output.push_str(href);
                } else {
                    output.push_str(&format!("`{} <{}>`_", label, href));
                }
            }
            NodeKind::Frame { .. } => {
                if let Some(NodeKind::Image { href }) = child.first_child().map(|c| &c.kind) {
                    let reference = self.image_reference(href, images);
                    output.push_str(&reference);
                }
            }
            NodeKind::Space { count } => {
                output.push_str(&" ".repeat(*count));
            }
            NodeKind::LineBreak | NodeKind::Tab => output.push(' '),
            other => {
                log::debug!("ignoring inline element {:?}", other);
            }
        }
    }

    /// Registers an inline image and returns its substitution reference.
    fn image_reference(&self, href: &str, images: &mut ImageRegistry) -> String {
        let path = self.resolve_path(href);
        let name = images.register(&path, file_stem(&path));
        format!("|{}|", name)
    }

    /// Resolves a package picture path to its output path with `/` separators.
    pub fn resolve_path(&self, href: &str) -> String {
        self.pictures.resolve(href).replace('\\', "/")
    }

    fn marker(&self, style: Option<&str>) -> Option<&'static str> {
        let style = style?;
        if style == self.styles.emphasis {
            Some("*")
        } else if style == self.styles.strong {
            Some("**")
        } else if style == self.styles.literal {
            Some("``")
        } else {
            None
        }
    }

    fn has_styled_descendant(&self, node: &Node) -> bool {
        node.children.iter().any(|child| {
            let styled = matches!(&child.kind, NodeKind::Span { style } if self.marker(style.as_deref()).is_some());
            styled || self.has_styled_descendant(child)
        })
    }
}

/// Returns the file name of `path` without its extension.
fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[..pos],
        _ => name,
    }
}

/// Returns the text of `node` with markup removed.
///
/// Only paragraphs and spans contribute their content; other elements
/// contribute their tails. Newlines are collapsed to spaces.
pub fn raw_text(node: &Node) -> String {
    let mut text = node.text.clone();
    for child in &node.children {
        if matches!(child.kind, NodeKind::Paragraph { .. } | NodeKind::Span { .. }) {
            text.push_str(&raw_text(child));
        }
        text.push_str(&child.tail);
    }
    text.replace('\n', " ")
}

/// Returns the verbatim text of a code paragraph.
///
/// Line breaks become newlines and `text:s` runs become spaces.
pub fn code_text(node: &Node) -> String {
    let mut text = node.text.clone();
    for child in &node.children {
        match &child.kind {
            NodeKind::Paragraph { .. } | NodeKind::Span { .. } => text.push_str(&code_text(child)),
            NodeKind::LineBreak => text.push('\n'),
            NodeKind::Space { count } => text.push_str(&" ".repeat(*count)),
            _ => {}
        }
        text.push_str(&child.tail);
    }
    text
}
