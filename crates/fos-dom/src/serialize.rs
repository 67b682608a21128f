//! HTML Serialization (innerHTML/outerHTML)
//!
//! Escaped text and attribute values; void elements get no end tag;
//! `script`/`style` content is written raw.

use crate::node::NodeData;
use crate::{Document, DomTree, NodeId};

/// Raw text elements (no escaping for content)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl DomTree {
    /// outerHTML of a node. For the document node, its children.
    pub fn serialize(&self, id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(id, &mut output);
        output
    }

    /// innerHTML: the children only
    pub fn serialize_inner(&self, id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(id, &mut output);
        output
    }

    fn serialize_node(&self, id: NodeId, output: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };

        match &node.data {
            NodeData::Document | NodeData::DocumentFragment => self.serialize_children(id, output),
            NodeData::Element(elem) => {
                let tag = elem.name.qualified();
                output.push('<');
                output.push_str(&tag);
                for attr in elem.attributes.items().filter_map(|a| self.attr(a)) {
                    output.push(' ');
                    output.push_str(&attr.name.qualified());
                    output.push_str("=\"");
                    escape_attribute(&attr.value, output);
                    output.push('"');
                }
                output.push('>');
                if elem.self_closing {
                    return;
                }
                if RAW_TEXT_ELEMENTS.contains(&elem.local_name()) {
                    for (_, child) in self.children(id) {
                        if let Some(text) = child.as_text() {
                            output.push_str(text);
                        }
                    }
                } else {
                    self.serialize_children(id, output);
                }
                output.push_str("</");
                output.push_str(&tag);
                output.push('>');
            }
            NodeData::Text(text) => escape_text(&text.content, output),
            NodeData::Comment(text) => {
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            NodeData::Doctype { name, .. } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(name);
                output.push('>');
            }
            NodeData::ProcessingInstruction { target, data } => {
                output.push_str("<?");
                output.push_str(target);
                if !data.is_empty() {
                    output.push(' ');
                    output.push_str(data);
                }
                output.push('>');
            }
            NodeData::Attribute(attr) => escape_text(&attr.value, output),
        }
    }

    fn serialize_children(&self, id: NodeId, output: &mut String) {
        for (child, _) in self.children(id) {
            self.serialize_node(child, output);
        }
    }
}

impl Document {
    /// Markup for the whole document
    pub fn to_markup(&self) -> String {
        self.tree.serialize(self.tree.root())
    }
}

fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}
