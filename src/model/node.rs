//! Styled node tree read from an ODT body.

use serde::Serialize;

/// One element of the document body.
///
/// Character data follows the XML mixed-content layout: `text` is the data
/// before the first child element, `tail` the data after this element's end
/// tag and before the parent's next child.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Node {
    /// Element kind with the attributes relevant to that kind
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Character data before the first child
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Character data after the end tag
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tail: String,
    /// Child elements in document order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

/// Closed set of element kinds understood by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// `text:p`
    Paragraph { style: Option<String> },
    /// `text:h`
    Heading { level: u8, style: Option<String> },
    /// `text:section`
    Section,
    /// `text:list`
    List { style: Option<String> },
    /// `text:list-item`
    ListItem,
    /// `text:span`
    Span { style: Option<String> },
    /// `text:a`
    Link { href: String },
    /// `text:line-break`
    LineBreak,
    /// `text:s`
    Space { count: usize },
    /// `text:tab`
    Tab,
    /// `table:table`
    Table,
    /// `table:table-header-rows`
    TableHeaderRows,
    /// `table:table-row`
    TableRow,
    /// `table:table-cell`
    TableCell {
        columns_spanned: usize,
        rows_spanned: usize,
    },
    /// `draw:frame`
    Frame { anchor: Option<String> },
    /// `draw:image`
    Image { href: String },
    /// `draw:text-box`
    TextBox,
    /// `office:annotation`
    Annotation,
    /// Any element without dedicated handling, by local name.
    Other { name: String },
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Other {
            name: String::new(),
        }
    }
}

impl Node {
    /// Creates a node of the given kind with no content.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Creates a node holding only direct text.
    pub fn with_text(kind: NodeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Creates a paragraph with the given style and text.
    pub fn paragraph(style: &str, text: impl Into<String>) -> Self {
        Self::with_text(
            NodeKind::Paragraph {
                style: Some(style.to_string()),
            },
            text,
        )
    }

    /// Creates a span with the given style and text.
    pub fn span(style: &str, text: impl Into<String>) -> Self {
        Self::with_text(
            NodeKind::Span {
                style: Some(style.to_string()),
            },
            text,
        )
    }

    /// Appends a child and returns self, for building trees in place.
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the tail text and returns self.
    pub fn tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    /// Returns the style name of paragraphs, headings, lists and spans.
    pub fn style(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Paragraph { style }
            | NodeKind::Heading { style, .. }
            | NodeKind::List { style }
            | NodeKind::Span { style } => style.as_deref(),
            _ => None,
        }
    }

    /// Returns the element's local name for `Other` nodes.
    pub fn other_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Other { name } => Some(name),
            _ => None,
        }
    }

    /// Returns the first direct child matching the predicate.
    pub fn find(&self, predicate: impl Fn(&NodeKind) -> bool) -> Option<&Node> {
        self.children.iter().find(|c| predicate(&c.kind))
    }

    /// Returns the first child, if any.
    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Returns true if this node is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self.kind, NodeKind::Heading { .. })
    }

    /// Counts nodes in this subtree matching the predicate, this node included.
    pub fn count(&self, predicate: &impl Fn(&NodeKind) -> bool) -> usize {
        let own = usize::from(predicate(&self.kind));
        own + self
            .children
            .iter()
            .map(|c| c.count(predicate))
            .sum::<usize>()
    }
}
