//! reStructuredText renderer implementation.

use super::inline::{code_text, raw_text, InlineRenderer};
use super::sink::{ImageRegistry, OutputSink};
use super::table::render_table;
use super::RenderOptions;
use crate::assets::PictureMap;
use crate::error::Result;
use crate::model::{escape_cell_text, Document, Node, NodeKind, Table, TableCell, TableRow};

use regex::Regex;
use std::sync::LazyLock;

/// Two letters or quotes followed by a full stop and a space end a sentence.
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-zA-Z"']{2})\. "#).unwrap());

/// Indentation of admonition, definition and code bodies.
const BLOCK_INDENT: &str = "   ";

/// reStructuredText renderer.
#[derive(Debug, Clone, Default)]
pub struct RstRenderer {
    options: RenderOptions,
}

impl RstRenderer {
    /// Creates a new renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Renders a document, keeping image paths as they appear in the package.
    pub fn render(&self, document: &Document) -> Result<String> {
        self.render_with_pictures(document, &PictureMap::new())
    }

    /// Renders a document, resolving image paths through `pictures`.
    pub fn render_with_pictures(&self, document: &Document, pictures: &PictureMap) -> Result<String> {
        let mut transformer = Transformer::new(&self.options, pictures);
        transformer.transform(&document.body)?;
        Ok(transformer.sink.finish())
    }
}

/// Bullet state of one enclosing list.
#[derive(Debug, Clone, Copy)]
struct ListFrame {
    /// Set by each list item until its first paragraph takes the marker
    pending_first_item: bool,
    /// Running item number; `None` for bulleted lists
    ordinal: Option<usize>,
}

impl ListFrame {
    fn new(ordered: bool) -> Self {
        Self {
            pending_first_item: true,
            ordinal: ordered.then_some(0),
        }
    }

    fn marker(&self) -> String {
        match self.ordinal {
            Some(n) => format!(" {}. ", n % 10),
            None => " - ".to_string(),
        }
    }

    fn blank(&self) -> &'static str {
        match self.ordinal {
            Some(_) => "    ",
            None => "   ",
        }
    }
}

enum Work<'d> {
    Visit(&'d Node),
    LeaveList,
}

/// Walks the node tree and writes into an [`OutputSink`].
struct Transformer<'a> {
    options: &'a RenderOptions,
    inline: InlineRenderer<'a>,
    sink: OutputSink,
    lists: Vec<ListFrame>,
}

impl<'a> Transformer<'a> {
    fn new(options: &'a RenderOptions, pictures: &'a PictureMap) -> Self {
        Self {
            options,
            inline: InlineRenderer::new(&options.styles, pictures),
            sink: OutputSink::new(options.debug_markers),
            lists: Vec::new(),
        }
    }

    fn transform(&mut self, nodes: &[Node]) -> Result<()> {
        let mut stack: Vec<Work> = nodes.iter().rev().map(Work::Visit).collect();

        while let Some(work) = stack.pop() {
            match work {
                Work::Visit(node) => self.visit(node, &mut stack)?,
                Work::LeaveList => {
                    self.lists.pop();
                }
            }
        }

        Ok(())
    }

    fn visit<'d>(&mut self, node: &'d Node, stack: &mut Vec<Work<'d>>) -> Result<()> {
        match &node.kind {
            NodeKind::Paragraph { style } => self.paragraph(node, style.as_deref()),
            NodeKind::Heading { level, .. } => {
                let text = self.inline.render(node, self.sink.images_mut());
                self.write_title(&text, usize::from(*level));
            }
            NodeKind::Section => push_children(stack, node),
            NodeKind::List { style } => {
                let options = self.options;
                let styles = &options.styles;

                if styles.is_outline_list(style.as_deref()) {
                    let targets: Vec<&Node> = node.children.iter().filter_map(outline_target).collect();
                    for target in targets.into_iter().rev() {
                        push_children(stack, target);
                    }
                } else {
                    let ordered = styles.is_ordered_list(style.as_deref());
                    self.sink.write("\n");
                    self.lists.push(ListFrame::new(ordered));
                    stack.push(Work::LeaveList);
                    push_children(stack, node);
                }
            }
            NodeKind::ListItem => {
                match self.lists.last_mut() {
                    Some(frame) => {
                        frame.pending_first_item = true;
                        if let Some(n) = frame.ordinal.as_mut() {
                            *n += 1;
                        }
                    }
                    None => log::debug!("list item outside a list"),
                }
                push_children(stack, node);
            }
            NodeKind::Table => self.table(node)?,
            other => log::debug!("ignoring block element {:?}", other),
        }

        Ok(())
    }

    fn paragraph(&mut self, node: &Node, style: Option<&str>) {
        let options = self.options;
        let styles = &options.styles;
        let style = style.unwrap_or_default();

        if style == styles.title {
            self.write_title(&node.text, 0);
        } else if style == styles.note_header {
            self.sink.write("\n.. note::\n");
        } else if style == styles.warning_header {
            self.sink.write("\n.. warning::\n");
        } else if style == styles.note_body || style == styles.warning_body {
            let text = self.inline.render(node, self.sink.images_mut());
            self.write_admonition_body(&text);
        } else if style == styles.block_indent {
            let text = self.inline.render(node, self.sink.images_mut());
            self.write_definition_body(&text);
        } else if style == styles.code_block {
            self.write_code_block(&code_text(node));
        } else if let Some(frame) = block_frame(node) {
            self.write_frame(frame);
        } else if let Some(annotation) = annotation(node) {
            self.write_comment(annotation);
        } else {
            let text = self.inline.render(node, self.sink.images_mut());
            self.write_paragraph(&text);
        }
    }

    fn write_title(&mut self, text: &str, level: usize) {
        let underline: String = std::iter::repeat(self.options.heading_char(level))
            .take(text.chars().count())
            .collect();

        let mut unit = String::new();
        if self.options.debug_markers {
            unit.push_str("pre-title");
        }
        unit.push_str(&format!("\n\n{}\n{}\n", text, underline));
        self.sink.write(&unit);
    }

    fn write_paragraph(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.options.dropped_prefixes.iter().any(|p| text.starts_with(p.as_str())) {
            log::debug!("dropping paragraph {:?}", text);
            return;
        }

        let mut unit = String::new();
        let first_of_item = self.lists.last().is_some_and(|f| f.pending_first_item);
        if !first_of_item {
            if self.options.debug_markers {
                unit.push_str(if self.lists.is_empty() { "pre-para" } else { "pre-item" });
            }
            unit.push('\n');
        }

        let (indent, bullet, continuation) = self.list_prefix();
        let separator = format!("\n{}{}", indent, continuation);

        unit.push_str(&indent);
        unit.push_str(&bullet);
        unit.push_str(&self.split_lines(text).join(&separator));

        self.sink.push_unit(unit);
    }

    /// Returns the indentation, the marker and the continuation marker for a
    /// paragraph in the current list, consuming the item's pending bullet.
    fn list_prefix(&mut self) -> (String, String, &'static str) {
        let Some((current, enclosing)) = self.lists.split_last_mut() else {
            return (String::new(), String::new(), "");
        };

        let indent: String = enclosing.iter().map(ListFrame::blank).collect();
        let bullet = if current.pending_first_item {
            current.marker()
        } else {
            current.blank().to_string()
        };
        current.pending_first_item = false;

        (indent, bullet, current.blank())
    }

    fn write_admonition_body(&mut self, text: &str) {
        let body = indent_lines(&self.split_lines(text));
        self.sink.write(&format!("{}\n\n", body));
    }

    /// Turns the pending paragraph into a definition term and writes `text`
    /// as its indented body.
    fn write_definition_body(&mut self, text: &str) {
        if let Some(term) = self.sink.take_pending() {
            self.sink.write(&strip_term_markup(&term));
        }
        self.sink.write("\n");

        let body = indent_lines(&self.split_lines(text));
        self.sink.write(&format!("{}\n", body));
    }

    fn write_code_block(&mut self, code: &str) {
        self.sink.rewrite_pending(|unit| unit.push_str(":\n"));

        let lines: Vec<&str> = code.split('\n').collect();
        self.sink.write(&format!("{}\n", indent_lines(&lines)));
    }

    fn write_frame(&mut self, frame: &Node) {
        match frame.first_child().map(|c| &c.kind) {
            Some(NodeKind::Image { href }) => {
                let path = self.inline.resolve_path(href);
                self.sink.write("\n");
                self.sink.write(&format!(".. image:: {}\n", path));
            }
            Some(NodeKind::TextBox) => match figure_parts(frame) {
                Some((href, caption)) => {
                    let path = self.inline.resolve_path(href);
                    self.sink.write("\n");
                    self.sink.write(&format!(".. figure:: {}\n\n", path));
                    if !caption.is_empty() {
                        self.sink.write(&format!("   {}\n", caption));
                    }
                }
                None => log::warn!("skipping figure without an image"),
            },
            other => log::debug!("ignoring frame content {:?}", other),
        }
    }

    fn write_comment(&mut self, annotation: &Node) {
        let lines: Vec<String> = annotation
            .children
            .iter()
            .filter(|c| matches!(c.kind, NodeKind::Paragraph { .. }))
            .map(raw_text)
            .collect();

        if lines.iter().all(|l| l.is_empty()) {
            log::warn!("skipping comment without text");
            return;
        }
        let Some((first, rest)) = lines.split_first() else {
            return;
        };

        self.sink.write(&format!("\n.. {}\n", first));
        for line in rest {
            self.sink.write(&format!("{}{}\n", BLOCK_INDENT, line));
        }
        self.sink.write("\n");
    }

    fn table(&mut self, node: &Node) -> Result<()> {
        // cell images only reach the trailer once the table renders
        let mut images = self.sink.images().clone();
        let table = self.build_table(node, &mut images);
        if table.rows.is_empty() {
            return Ok(());
        }

        match render_table(&table) {
            Ok(rendered) => {
                *self.sink.images_mut() = images;
                self.sink.write("\n");
                self.sink.write(&rendered);
                Ok(())
            }
            Err(e) if self.options.is_lenient() => {
                log::warn!("skipping table: {}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn build_table(&self, node: &Node, images: &mut ImageRegistry) -> Table {
        let mut table = Table::new();

        for child in &node.children {
            match child.kind {
                NodeKind::TableRow => {
                    let row = self.build_row(child, false, images);
                    table.rows.push(row);
                }
                NodeKind::TableHeaderRows => {
                    for row_node in &child.children {
                        if matches!(row_node.kind, NodeKind::TableRow) {
                            let row = self.build_row(row_node, true, images);
                            table.rows.push(row);
                        }
                    }
                }
                _ => {}
            }
        }

        table
    }

    fn build_row(&self, node: &Node, is_header: bool, images: &mut ImageRegistry) -> TableRow {
        let mut row = TableRow {
            cells: Vec::new(),
            is_header,
        };

        for cell_node in &node.children {
            let NodeKind::TableCell {
                columns_spanned,
                rows_spanned,
            } = cell_node.kind
            else {
                continue;
            };

            let text = cell_node
                .children
                .iter()
                .filter(|c| matches!(c.kind, NodeKind::Paragraph { .. } | NodeKind::Heading { .. }))
                .map(|p| self.inline.render(p, images))
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");

            row.cells.push(TableCell::merged(
                escape_cell_text(&text),
                columns_spanned,
                rows_spanned,
            ));
        }

        row
    }

    fn split_lines(&self, text: &str) -> Vec<String> {
        if self.options.split_sentences {
            SENTENCE_END
                .replace_all(text, "${1}.\n")
                .split('\n')
                .map(str::to_string)
                .collect()
        } else {
            vec![text.to_string()]
        }
    }
}

fn push_children<'d>(stack: &mut Vec<Work<'d>>, node: &'d Node) {
    stack.extend(node.children.iter().rev().map(Work::Visit));
}

/// Follows an outline item's first children to the element holding the heading.
fn outline_target(item: &Node) -> Option<&Node> {
    let mut current = item;
    loop {
        let first = current.first_child()?;
        if first.is_heading() {
            return Some(current);
        }
        current = first;
    }
}

/// Returns the paragraph-anchored frame of a paragraph, if it has content.
fn block_frame(node: &Node) -> Option<&Node> {
    node.find(|k| matches!(k, NodeKind::Frame { .. }))
        .filter(|frame| !frame.children.is_empty())
        .filter(|frame| matches!(&frame.kind, NodeKind::Frame { anchor } if anchor.as_deref() == Some("paragraph")))
}

/// Returns the review comment attached to a paragraph, if it has content.
fn annotation(node: &Node) -> Option<&Node> {
    node.find(|k| matches!(k, NodeKind::Annotation))
        .filter(|a| !a.children.is_empty())
}

/// Extracts the image path and caption of a `frame/text-box/p/frame/image` figure.
fn figure_parts(frame: &Node) -> Option<(&str, &str)> {
    let inner = frame.first_child()?.first_child()?.first_child()?;
    match &inner.first_child()?.kind {
        NodeKind::Image { href } if matches!(inner.kind, NodeKind::Frame { .. }) => {
            Some((href.as_str(), inner.tail.as_str()))
        }
        _ => None,
    }
}

/// Removes strong and emphasis markers around a definition term.
fn strip_term_markup(term: &str) -> String {
    let term = term.replace("**", "");
    let start = term.len() - term.trim_start().len();
    let (prefix, body) = term.split_at(start);

    if body.len() >= 2 && body.starts_with('*') && body.ends_with('*') {
        format!("{}{}", prefix, &body[1..body.len() - 1])
    } else {
        term
    }
}

fn indent_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| format!("{}{}", BLOCK_INDENT, line.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
