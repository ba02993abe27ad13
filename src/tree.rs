//! The Raw Feed Tree: an Atom document turned into nested JSON values.
//!
//! The shape follows the usual XML-to-dictionary conventions:
//!
//! * an element with neither attributes nor children becomes its trimmed
//!   text, or `null` when empty;
//! * otherwise it becomes an object holding attributes as `@name`, child
//!   elements under their qualified name and any text as `#text`;
//! * namespace declarations appear as `@xmlns` / `@xmlns:prefix`;
//! * a child element that repeats becomes a list, which is why a field may
//!   be a lone object or a list depending on cardinality (see [`as_list`]).

use serde_json::{Map, Value};
use xml::name::OwnedName;
use xml::namespace::Namespace;
use xml::reader::{ParserConfig, XmlEvent};

use crate::error::FetchError;

const ATTR_PREFIX: char = '@';
const TEXT_KEY: &str = "#text";

// Bound to every element implicitly; never declared by a document.
const BUILTIN_PREFIXES: [&str; 2] = ["xml", "xmlns"];

struct Frame {
    name: String,
    namespace: Namespace,
    fields: Map<String, Value>,
    has_children: bool,
    text: String,
}

/// Decode `bytes` into a tree keyed by the root element's name.
pub fn from_bytes(bytes: &[u8]) -> Result<Value, FetchError> {
    let reader = ParserConfig::new()
        .cdata_to_characters(true)
        .whitespace_to_characters(true)
        .create_reader(bytes);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    for event in reader {
        match event? {
            XmlEvent::StartElement {
                name,
                attributes,
                namespace,
            } => {
                let mut fields = Map::new();
                let parent = stack.last().map(|frame| &frame.namespace);
                declared_namespaces(&namespace, parent, &mut fields);
                for attr in attributes {
                    fields.insert(
                        format!("{ATTR_PREFIX}{}", qualified(&attr.name)),
                        Value::String(attr.value),
                    );
                }
                if let Some(parent) = stack.last_mut() {
                    parent.has_children = true;
                }
                stack.push(Frame {
                    name: qualified(&name),
                    namespace,
                    fields,
                    has_children: false,
                    text: String::new(),
                });
            }
            XmlEvent::Characters(text) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            XmlEvent::EndElement { .. } => {
                let Some(frame) = stack.pop() else {
                    return Err(FetchError::Xml("unbalanced end element".into()));
                };
                let (name, value) = frame.finish();
                match stack.last_mut() {
                    Some(parent) => push_child(&mut parent.fields, name, value),
                    None => root = Some((name, value)),
                }
            }
            _ => {}
        }
    }

    let (name, value) = root.ok_or_else(|| FetchError::Xml("no root element".into()))?;
    let mut tree = Map::new();
    tree.insert(name, value);
    Ok(Value::Object(tree))
}

impl Frame {
    fn finish(self) -> (String, Value) {
        let text = self.text.trim();
        if self.fields.is_empty() && !self.has_children {
            let value = if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            };
            return (self.name, value);
        }
        let mut fields = self.fields;
        if !text.is_empty() {
            fields.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
        }
        (self.name, Value::Object(fields))
    }
}

fn qualified(name: &OwnedName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{prefix}:{}", name.local_name),
        None => name.local_name.clone(),
    }
}

/// Emit the namespace bindings introduced by this element, i.e. those that
/// differ from what the parent already had in scope.
fn declared_namespaces(
    namespace: &Namespace,
    parent: Option<&Namespace>,
    fields: &mut Map<String, Value>,
) {
    for (prefix, uri) in namespace {
        if BUILTIN_PREFIXES.iter().any(|p| *p == prefix) || uri.is_empty() {
            continue;
        }
        if parent.and_then(|p| p.get(prefix)) == Some(uri) {
            continue;
        }
        let key = if prefix.is_empty() {
            "@xmlns".to_string()
        } else {
            format!("@xmlns:{prefix}")
        };
        fields.insert(key, Value::String(uri.to_string()));
    }
}

fn push_child(fields: &mut Map<String, Value>, name: String, value: Value) {
    match fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(name, value);
        }
    }
}

/// View a field that may be a lone value, a list or absent as a list.
///
/// `null` and missing both yield an empty slice.
pub fn as_list(value: Option<&Value>) -> &[Value] {
    match value {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(single) => std::slice::from_ref(single),
    }
}
