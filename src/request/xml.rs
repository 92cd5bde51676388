//! XML to JSON-like tree conversion for response bodies.
//!
//! Conversion rules:
//! - the document becomes `{ <root name>: <root value> }`;
//! - attributes and child elements land in the same object, attributes first;
//! - a child name seen once is stored as-is, a repeated name becomes a list;
//! - an element with no attributes and no children is its trimmed text;
//! - text next to attributes or children is kept under [`TEXT_KEY`].

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

/// Key holding character data of elements that also have attributes/children.
pub const TEXT_KEY: &str = "_";

#[derive(Debug, Default)]
struct Node {
    name: String,
    fields: Map<String, Value>,
    has_fields: bool,
    text: String,
}

impl Node {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, String> {
        let mut node = Node {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Node::default()
        };
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| format!("invalid attribute: {e}"))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| format!("invalid attribute value: {e}"))?
                .into_owned();
            node.push_field(key, Value::String(value));
        }
        Ok(node)
    }

    fn push_field(&mut self, key: String, value: Value) {
        self.has_fields = true;
        match self.fields.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.fields.insert(key, value);
            }
        }
    }

    fn into_value(mut self) -> (String, Value) {
        let text = self.text.trim().to_string();
        if !self.has_fields {
            return (self.name, Value::String(text));
        }
        if !text.is_empty() {
            self.fields.insert(TEXT_KEY.to_string(), Value::String(text));
        }
        (self.name, Value::Object(self.fields))
    }
}

/// Parses an XML document into a JSON-like tree.
///
/// # Errors
///
/// Returns a description of the problem when the input is not a single
/// well-formed XML element (syntax errors, text outside the root, unclosed or
/// mismatched tags, no root at all).
pub fn parse_xml(raw: &str) -> Result<Map<String, Value>, String> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("XML syntax error at byte {}: {e}", reader.buffer_position()))?;
        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err("multiple root elements".to_string());
                }
                stack.push(Node::from_start(&start)?);
            }
            Event::Empty(start) => {
                if root.is_some() {
                    return Err("multiple root elements".to_string());
                }
                let (name, value) = Node::from_start(&start)?.into_value();
                attach(&mut stack, &mut root, name, value);
            }
            Event::End(end) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| "closing tag without opening tag".to_string())?;
                if end.name().as_ref() != node.name.as_bytes() {
                    return Err(format!("mismatched closing tag for <{}>", node.name));
                }
                let (name, value) = node.into_value();
                attach(&mut stack, &mut root, name, value);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| format!("invalid text content: {e}"))?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                append_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name));
    }
    let (name, value) = root.ok_or_else(|| "document has no root element".to_string())?;
    let mut document = Map::new();
    document.insert(name, value);
    Ok(document)
}

fn attach(stack: &mut [Node], root: &mut Option<(String, Value)>, name: String, value: Value) {
    match stack.last_mut() {
        Some(parent) => parent.push_field(name, value),
        None => *root = Some((name, value)),
    }
}

fn append_text(stack: &mut [Node], text: &str) -> Result<(), String> {
    match stack.last_mut() {
        Some(node) => {
            node.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err("text outside of the root element".to_string()),
    }
}
