//! DOM Node - Compact representation
//!
//! Nodes live in a per-document arena and link to each other through
//! 4-byte `NodeId`s instead of pointers. Sibling links keep append O(1).

use crate::{DocumentId, NamedNodeMap, NodeId};

/// DOM node type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
}

/// Namespaced name of an element or attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualName {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
}

impl QualName {
    pub fn new(namespace: Option<&str>, prefix: Option<&str>, local: &str) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
            namespace: namespace.map(str::to_string),
        }
    }

    /// Name without namespace or prefix
    pub fn local(local: &str) -> Self {
        Self::new(None, None, local)
    }

    /// `prefix:local`, or just `local`
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local),
            None => self.local.clone(),
        }
    }

    /// Does the qualified form equal `name`? Avoids allocating.
    pub fn is_qualified(&self, name: &str) -> bool {
        match &self.prefix {
            Some(prefix) => name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|rest| rest == self.local),
            None => name == self.local,
        }
    }

    #[inline]
    pub fn is(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local == local
    }
}

/// DOM Node - Core structure
#[derive(Debug, Clone)]
pub struct Node {
    /// Owning document
    pub(crate) owner: DocumentId,
    /// Parent node (NONE if detached or root)
    pub(crate) parent: NodeId,
    /// First child
    pub(crate) first_child: NodeId,
    /// Last child (for O(1) append)
    pub(crate) last_child: NodeId,
    /// Previous sibling
    pub(crate) prev_sibling: NodeId,
    /// Next sibling
    pub(crate) next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(owner: DocumentId, data: NodeData) -> Self {
        Self {
            owner,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Owning document
    #[inline]
    pub fn owner_document(&self) -> DocumentId {
        self.owner
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent.to_option()
    }

    #[inline]
    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child.to_option()
    }

    #[inline]
    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child.to_option()
    }

    #[inline]
    pub fn previous_sibling(&self) -> Option<NodeId> {
        self.prev_sibling.to_option()
    }

    #[inline]
    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling.to_option()
    }

    pub fn node_type(&self) -> NodeType {
        match &self.data {
            NodeData::Document => NodeType::Document,
            NodeData::Doctype { .. } => NodeType::DocumentType,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Attribute(_) => NodeType::Attribute,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::ProcessingInstruction { .. } => NodeType::ProcessingInstruction,
            NodeData::DocumentFragment => NodeType::DocumentFragment,
        }
    }

    /// DOM `nodeName`
    pub fn node_name(&self) -> String {
        match &self.data {
            NodeData::Document => "#document".into(),
            NodeData::Doctype { name, .. } => name.clone(),
            NodeData::Element(e) => e.tag_name(),
            NodeData::Attribute(a) => a.name.qualified(),
            NodeData::Text(_) => "#text".into(),
            NodeData::Comment(_) => "#comment".into(),
            NodeData::ProcessingInstruction { target, .. } => target.clone(),
            NodeData::DocumentFragment => "#document-fragment".into(),
        }
    }

    /// Can this node hold children?
    pub fn is_container(&self) -> bool {
        matches!(
            self.data,
            NodeData::Document | NodeData::Element(_) | NodeData::DocumentFragment
        )
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub fn as_attr(&self) -> Option<&AttrData> {
        match &self.data {
            NodeData::Attribute(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub fn as_attr_mut(&mut self) -> Option<&mut AttrData> {
        match &mut self.data {
            NodeData::Attribute(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root
    Document,
    /// DOCTYPE
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    /// Element
    Element(ElementData),
    /// Attribute
    Attribute(AttrData),
    /// Text content
    Text(TextData),
    /// Comment
    Comment(String),
    /// Processing instruction
    ProcessingInstruction {
        target: String,
        data: String,
    },
    /// Document fragment
    DocumentFragment,
}

/// Element-specific data
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Tag name (qualified)
    pub name: QualName,
    /// Attribute map, owned exclusively by this element
    pub attributes: NamedNodeMap,
    /// Void element, closed as soon as it is created
    pub self_closing: bool,
    /// Factory setup has run
    pub finalized: bool,
}

impl ElementData {
    pub fn new(name: QualName, owner: NodeId) -> Self {
        Self {
            name,
            attributes: NamedNodeMap::new(owner),
            self_closing: false,
            finalized: false,
        }
    }

    /// DOM `tagName`: qualified name, upper-cased for HTML elements
    pub fn tag_name(&self) -> String {
        let qualified = self.name.qualified();
        if self.name.namespace.as_deref() == Some(crate::names::HTML_NAMESPACE) {
            qualified.to_ascii_uppercase()
        } else {
            qualified
        }
    }

    #[inline]
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    #[inline]
    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace.as_deref()
    }

    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        self.name.prefix.as_deref()
    }
}

/// Attribute node data
#[derive(Debug, Clone)]
pub struct AttrData {
    pub name: QualName,
    pub value: String,
    /// Element whose map holds this attribute
    pub(crate) owner_element: NodeId,
}

impl AttrData {
    pub fn new(name: QualName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
            owner_element: NodeId::NONE,
        }
    }

    /// Element currently owning this attribute
    #[inline]
    pub fn owner_element(&self) -> Option<NodeId> {
        self.owner_element.to_option()
    }

    #[inline]
    pub fn local_name(&self) -> &str {
        &self.name.local
    }

    #[inline]
    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace.as_deref()
    }

    pub fn is_id(&self) -> bool {
        self.name.namespace.is_none() && self.name.local == "id"
    }
}

/// Text node data
#[derive(Debug, Clone)]
pub struct TextData {
    pub content: String,
}
