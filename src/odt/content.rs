//! Node tree builder for content.xml.

use crate::error::{Error, Result};
use crate::model::{Node, NodeKind};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parses content.xml (or a flat .fodt document) and returns the children of
/// `office:body/office:text`.
pub fn parse_content(xml: &str) -> Result<Vec<Node>> {
    let root = build_tree(xml)?;

    let document = root
        .children
        .into_iter()
        .find(|n| matches!(n.other_name(), Some("document-content") | Some("document")))
        .ok_or_else(|| Error::MissingComponent("office:document-content".into()))?;

    let body = document
        .children
        .into_iter()
        .find(|n| n.other_name() == Some("body"))
        .ok_or_else(|| Error::MissingComponent("office:body".into()))?;

    let text = body
        .children
        .into_iter()
        .find(|n| n.other_name() == Some("text"))
        .ok_or_else(|| Error::MissingComponent("office:text".into()))?;

    Ok(text.children)
}

/// Builds the full element tree under a synthetic root.
pub fn build_tree(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack = vec![Node::new(NodeKind::Other {
        name: String::new(),
    })];
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                stack.push(Node::new(classify(&e)?));
            }
            Ok(Event::Empty(e)) => {
                let node = Node::new(classify(&e)?);
                attach(&mut stack, node);
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(Error::XmlParse("unbalanced end tag".into()));
                }
                if let Some(node) = stack.pop() {
                    attach(&mut stack, node);
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape()?;
                push_text(&mut stack, &text);
            }
            Ok(Event::CData(t)) => {
                let text = std::str::from_utf8(&t)?;
                push_text(&mut stack, text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if stack.len() != 1 {
        return Err(Error::XmlParse("unexpected end of document".into()));
    }

    stack
        .pop()
        .ok_or_else(|| Error::XmlParse("empty document".into()))
}

/// Appends a finished node to the element on top of the stack.
fn attach(stack: &mut [Node], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Routes character data to the open element's text or its last child's tail.
fn push_text(stack: &mut [Node], text: &str) {
    if let Some(open) = stack.last_mut() {
        match open.children.last_mut() {
            Some(last) => last.tail.push_str(text),
            None => open.text.push_str(text),
        }
    }
}

/// Maps an element to its node kind.
fn classify(e: &BytesStart) -> Result<NodeKind> {
    let name = get_local_name(e);

    let kind = match name.as_str() {
        "p" => NodeKind::Paragraph {
            style: get_attr_string(e, "style-name")?,
        },
        "h" => NodeKind::Heading {
            level: get_attr_parsed(e, "outline-level")?.unwrap_or(1),
            style: get_attr_string(e, "style-name")?,
        },
        "section" => NodeKind::Section,
        "list" => NodeKind::List {
            style: get_attr_string(e, "style-name")?,
        },
        "list-item" => NodeKind::ListItem,
        "span" => NodeKind::Span {
            style: get_attr_string(e, "style-name")?,
        },
        "a" => NodeKind::Link {
            href: get_attr_string(e, "href")?.unwrap_or_default(),
        },
        "line-break" => NodeKind::LineBreak,
        "s" => NodeKind::Space {
            count: get_attr_parsed(e, "c")?.unwrap_or(1),
        },
        "tab" => NodeKind::Tab,
        "table" => NodeKind::Table,
        "table-header-rows" => NodeKind::TableHeaderRows,
        "table-row" => NodeKind::TableRow,
        "table-cell" => NodeKind::TableCell {
            columns_spanned: get_attr_parsed(e, "number-columns-spanned")?.unwrap_or(1),
            rows_spanned: get_attr_parsed(e, "number-rows-spanned")?.unwrap_or(1),
        },
        "frame" => NodeKind::Frame {
            anchor: get_attr_string(e, "anchor-type")?,
        },
        "image" => NodeKind::Image {
            href: get_attr_string(e, "href")?.unwrap_or_default(),
        },
        "text-box" => NodeKind::TextBox,
        "annotation" => NodeKind::Annotation,
        _ => NodeKind::Other { name },
    };

    Ok(kind)
}

/// Gets the local name of an element (without namespace prefix).
fn get_local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Gets an attribute value by local name.
fn get_attr_string(e: &BytesStart, name: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name.as_bytes() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Gets a numeric attribute value by local name.
fn get_attr_parsed<T: std::str::FromStr>(e: &BytesStart, name: &str) -> Result<Option<T>> {
    match get_attr_string(e, name)? {
        Some(value) => value.trim().parse().map(Some).map_err(|_| {
            Error::InvalidData(format!(
                "attribute {} has non-numeric value {:?}",
                name, value
            ))
        }),
        None => Ok(None),
    }
}
