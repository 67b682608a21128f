//! DOM Tree (arena-based allocation)
//!
//! One arena per document. Slots are never reused: a node adopted into
//! another document leaves a vacant slot behind.

use crate::factory;
use crate::node::{AttrData, ElementData, NodeData, TextData};
use crate::observer::{MutationLog, MutationRecord};
use crate::{DocumentId, DomError, DomResult, NamedNodeMap, Node, NodeId, NodeType, QualName};

/// Arena-based DOM tree for memory efficiency
#[derive(Debug, Clone)]
pub struct DomTree {
    document: DocumentId,
    nodes: Vec<Option<Node>>,
    live: usize,
    pub(crate) mutations: MutationLog,
}

/// Owned copy of a subtree, used to move or clone nodes between arenas
#[derive(Debug)]
pub(crate) struct Detached {
    data: NodeData,
    attributes: Vec<AttrData>,
    children: Vec<Detached>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new(document: DocumentId) -> Self {
        let mut tree = Self {
            document,
            nodes: Vec::with_capacity(64),
            live: 0,
            mutations: MutationLog::new(),
        };
        tree.alloc(NodeData::Document);
        tree
    }

    /// Document this arena belongs to
    #[inline]
    pub fn document_id(&self) -> DocumentId {
        self.document
    }

    /// The document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    /// Get a mutable node by ID
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Number of live nodes, attributes included
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let data = match data {
            NodeData::Element(mut element) => {
                element.attributes.set_owner(id);
                NodeData::Element(element)
            }
            other => other,
        };
        self.nodes.push(Some(Node::new(self.document, data)));
        self.live += 1;
        id
    }

    // ------------------------------------------------------------------
    // Construction primitives (no validation, used by parsers)
    // ------------------------------------------------------------------

    /// Create a detached element through the factory for its namespace
    pub fn create_element(&mut self, name: QualName) -> NodeId {
        let data = factory::create_element_data(name.namespace.as_deref(), name.prefix.as_deref(), &name.local);
        self.alloc(NodeData::Element(data))
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(NodeData::Text(TextData { content: content.to_string() }))
    }

    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.alloc(NodeData::Comment(content.to_string()))
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        self.alloc(NodeData::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        })
    }

    pub fn create_doctype(&mut self, name: &str, public_id: &str, system_id: &str) -> NodeId {
        self.alloc(NodeData::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        })
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeData::DocumentFragment)
    }

    /// Create an attribute that no element owns yet
    pub fn create_attribute(&mut self, name: QualName, value: &str) -> NodeId {
        self.alloc(NodeData::Attribute(AttrData::new(name, value)))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    #[inline]
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    #[inline]
    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    #[inline]
    pub fn attr(&self, id: NodeId) -> Option<&AttrData> {
        self.get(id).and_then(Node::as_attr)
    }

    /// Is `id` an element with this namespace and local name?
    pub fn is_element_named(&self, id: NodeId, namespace: Option<&str>, local: &str) -> bool {
        self.element(id).is_some_and(|e| e.name.is(namespace, local))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Iterate over the children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// Element children only
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &ElementData)> + '_ {
        self.children(id)
            .filter_map(|(child, node)| node.as_element().map(|e| (child, e)))
    }

    /// Child at `index`, in document order
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).nth(index).map(|(child, _)| child)
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Position of a node among its siblings
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).position(|(child, _)| child == id)
    }

    /// Pre-order traversal of the descendants of `id` (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: self.get(id).map_or(NodeId::NONE, |n| n.first_child),
        }
    }

    /// First descendant satisfying `predicate`, in tree order
    pub fn find_descendant<F>(&self, id: NodeId, mut predicate: F) -> Option<NodeId>
    where
        F: FnMut(NodeId, &Node) -> bool,
    {
        self.descendants(id)
            .find(|&(node_id, node)| predicate(node_id, node))
            .map(|(node_id, _)| node_id)
    }

    /// Is `ancestor` equal to `node` or one of its ancestors?
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while current.is_valid() {
            if current == ancestor {
                return true;
            }
            current = self.get(current).map_or(NodeId::NONE, |n| n.parent);
        }
        false
    }

    /// DOM `textContent`
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        match &node.data {
            NodeData::Text(text) => text.content.clone(),
            NodeData::Comment(data) => data.clone(),
            NodeData::ProcessingInstruction { data, .. } => data.clone(),
            NodeData::Attribute(attr) => attr.value.clone(),
            NodeData::Element(_) | NodeData::DocumentFragment => self
                .descendants(id)
                .filter_map(|(_, n)| n.as_text())
                .collect(),
            NodeData::Document | NodeData::Doctype { .. } => String::new(),
        }
    }

    /// Replace the children of a container with a single text node, or set
    /// the data of a character node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        let node_type = self.get(id).ok_or(DomError::NotFound)?.node_type();
        match node_type {
            NodeType::Element | NodeType::DocumentFragment => {
                let text_node = (!text.is_empty()).then(|| self.create_text(text));
                self.replace_all(id, text_node)
            }
            NodeType::Attribute => self.set_attr_value(id, text),
            NodeType::Text | NodeType::Comment | NodeType::ProcessingInstruction => {
                let old = self.replace_character_data(id, text);
                self.mutations.push(MutationRecord::character_data(id, old));
                Ok(())
            }
            NodeType::Document | NodeType::DocumentType => Ok(()),
        }
    }

    fn replace_character_data(&mut self, id: NodeId, text: &str) -> String {
        let Some(node) = self.get_mut(id) else {
            return String::new();
        };
        let slot = match &mut node.data {
            NodeData::Text(t) => &mut t.content,
            NodeData::Comment(data) => data,
            NodeData::ProcessingInstruction { data, .. } => data,
            _ => return String::new(),
        };
        std::mem::replace(slot, text.to_string())
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Append a child node
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    /// Insert `node` before `reference` (or at the end)
    pub fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) -> DomResult<NodeId> {
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotFound);
            }
        }
        self.ensure_pre_insert_validity(parent, node, None)?;

        let mut before = reference.unwrap_or(NodeId::NONE);
        if before == node {
            before = self.get(node).map_or(NodeId::NONE, |n| n.next_sibling);
        }

        let inserted = self.take_for_insertion(node);
        let previous = if before.is_valid() {
            self.get(before).and_then(Node::previous_sibling)
        } else {
            self.get(parent).and_then(Node::last_child)
        };
        for &child in &inserted {
            self.link(parent, child, before);
        }
        self.mutations.push(MutationRecord::child_list(
            parent,
            inserted,
            Vec::new(),
            previous,
            before.to_option(),
        ));
        Ok(node)
    }

    /// Remove a child node
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound);
        }
        self.remove_from_parent(child);
        Ok(child)
    }

    /// Replace `old` with `node`, returning `old`
    pub fn replace_child(&mut self, parent: NodeId, node: NodeId, old: NodeId) -> DomResult<NodeId> {
        if self.parent(old) != Some(parent) {
            return Err(DomError::NotFound);
        }
        self.ensure_pre_insert_validity(parent, node, Some(old))?;
        if node == old {
            return Ok(old);
        }

        let mut before = self.get(old).map_or(NodeId::NONE, |n| n.next_sibling);
        if before == node {
            before = self.get(node).map_or(NodeId::NONE, |n| n.next_sibling);
        }
        let inserted = self.take_for_insertion(node);
        let previous = self.get(old).and_then(Node::previous_sibling);
        self.unlink(old);
        for &child in &inserted {
            self.link(parent, child, before);
        }
        self.mutations.push(MutationRecord::child_list(
            parent,
            inserted,
            vec![old],
            previous,
            before.to_option(),
        ));
        Ok(old)
    }

    /// Detach a node from its parent, if any
    pub fn detach(&mut self, id: NodeId) {
        if self.parent(id).is_some() {
            self.remove_from_parent(id);
        }
    }

    /// Remove every child of `parent`, then insert `node` if given
    pub fn replace_all(&mut self, parent: NodeId, node: Option<NodeId>) -> DomResult<()> {
        if let Some(node) = node {
            self.ensure_pre_insert_validity(parent, node, None)?;
        }
        let removed: Vec<NodeId> = self.children(parent).map(|(id, _)| id).collect();
        for &child in &removed {
            self.unlink(child);
        }
        let added = match node {
            Some(node) => {
                let added = self.take_for_insertion(node);
                for &child in &added {
                    self.link(parent, child, NodeId::NONE);
                }
                added
            }
            None => Vec::new(),
        };
        if !removed.is_empty() || !added.is_empty() {
            self.mutations
                .push(MutationRecord::child_list(parent, added, removed, None, None));
        }
        Ok(())
    }

    /// Drain pending mutation records
    pub fn take_mutation_records(&mut self) -> Vec<MutationRecord> {
        self.mutations.take_records()
    }

    /// Turn mutation recording on or off. Off until a consumer enables it.
    pub fn set_mutation_recording(&mut self, enabled: bool) {
        self.mutations.set_enabled(enabled);
    }

    pub fn is_mutation_recording(&self) -> bool {
        self.mutations.is_enabled()
    }

    fn remove_from_parent(&mut self, child: NodeId) {
        let Some(node) = self.get(child) else { return };
        let parent = node.parent;
        let previous = node.previous_sibling();
        let next = node.next_sibling();
        self.unlink(child);
        self.mutations.push(MutationRecord::child_list(
            parent,
            Vec::new(),
            vec![child],
            previous,
            next,
        ));
    }

    /// Nodes to insert for `node`: the children of a fragment (emptying
    /// it), or the node itself detached from its old parent.
    fn take_for_insertion(&mut self, node: NodeId) -> Vec<NodeId> {
        let is_fragment = self
            .get(node)
            .is_some_and(|n| matches!(n.data, NodeData::DocumentFragment));
        if is_fragment {
            let children: Vec<NodeId> = self.children(node).map(|(id, _)| id).collect();
            for &child in &children {
                self.unlink(child);
            }
            if !children.is_empty() {
                self.mutations.push(MutationRecord::child_list(
                    node,
                    Vec::new(),
                    children.clone(),
                    None,
                    None,
                ));
            }
            children
        } else {
            self.detach(node);
            vec![node]
        }
    }

    fn ensure_pre_insert_validity(&self, parent: NodeId, node: NodeId, replacing: Option<NodeId>) -> DomResult<()> {
        let parent_node = self.get(parent).ok_or(DomError::NotFound)?;
        let child = self.get(node).ok_or(DomError::NotFound)?;

        if !parent_node.is_container() || self.is_inclusive_ancestor(node, parent) {
            return Err(DomError::HierarchyRequest);
        }

        let incoming: Vec<&Node> = match child.data {
            NodeData::Document | NodeData::Attribute(_) => return Err(DomError::HierarchyRequest),
            NodeData::DocumentFragment => self.children(node).map(|(_, n)| n).collect(),
            _ => vec![child],
        };

        let parent_is_document = matches!(parent_node.data, NodeData::Document);
        for n in &incoming {
            match n.data {
                NodeData::Text(_) if parent_is_document => return Err(DomError::HierarchyRequest),
                NodeData::Doctype { .. } if !parent_is_document => return Err(DomError::HierarchyRequest),
                _ => {}
            }
        }

        if parent_is_document {
            let incoming_elements = incoming.iter().filter(|n| n.is_element()).count();
            let existing_elements = self
                .children(parent)
                .filter(|&(id, n)| n.is_element() && Some(id) != replacing && id != node)
                .count();
            if incoming_elements + existing_elements > 1 {
                return Err(DomError::HierarchyRequest);
            }
        }
        Ok(())
    }

    fn link(&mut self, parent: NodeId, node: NodeId, before: NodeId) {
        let previous = if before.is_valid() {
            self.get(before).map_or(NodeId::NONE, |n| n.prev_sibling)
        } else {
            self.get(parent).map_or(NodeId::NONE, |n| n.last_child)
        };

        if let Some(n) = self.get_mut(node) {
            n.parent = parent;
            n.prev_sibling = previous;
            n.next_sibling = before;
        }
        match self.get_mut(previous) {
            Some(prev) => prev.next_sibling = node,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = node;
                }
            }
        }
        match self.get_mut(before) {
            Some(next) => next.prev_sibling = node,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = node;
                }
            }
        }
    }

    fn unlink(&mut self, node: NodeId) {
        let Some(n) = self.get_mut(node) else { return };
        let parent = std::mem::replace(&mut n.parent, NodeId::NONE);
        let previous = std::mem::replace(&mut n.prev_sibling, NodeId::NONE);
        let next = std::mem::replace(&mut n.next_sibling, NodeId::NONE);
        if !parent.is_valid() {
            return;
        }

        match self.get_mut(previous) {
            Some(prev) => prev.next_sibling = next,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.first_child = next;
                }
            }
        }
        match self.get_mut(next) {
            Some(after) => after.prev_sibling = previous,
            None => {
                if let Some(p) = self.get_mut(parent) {
                    p.last_child = previous;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Cloning, import and adoption
    // ------------------------------------------------------------------

    /// Clone a node within this tree. The copy is detached.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let snapshot = self.snapshot(id, deep)?;
        Ok(self.instantiate(snapshot))
    }

    /// Copy a node from another tree into this one, detached.
    pub fn import_from(&mut self, source: &DomTree, id: NodeId, deep: bool) -> DomResult<NodeId> {
        let snapshot = source.snapshot(id, deep)?;
        Ok(self.instantiate(snapshot))
    }

    /// Move a node and its descendants out of `source` into this tree.
    /// The old slots in `source` are vacated.
    pub fn adopt_from(&mut self, source: &mut DomTree, id: NodeId) -> DomResult<NodeId> {
        let node = source.get(id).ok_or(DomError::NotFound)?;
        match &node.data {
            NodeData::Document => return Err(DomError::NotSupported),
            NodeData::Attribute(attr) => {
                if let Some(owner) = attr.owner_element() {
                    source.remove_attribute_node(owner, id)?;
                }
            }
            _ => source.detach(id),
        }
        let detached = source.take_subtree(id);
        Ok(self.instantiate(detached))
    }

    pub(crate) fn snapshot(&self, id: NodeId, deep: bool) -> DomResult<Detached> {
        let node = self.get(id).ok_or(DomError::NotFound)?;
        let (data, attributes) = match &node.data {
            NodeData::Document => return Err(DomError::NotSupported),
            NodeData::Element(element) => {
                let attributes = element
                    .attributes
                    .items()
                    .filter_map(|attr| self.attr(attr).cloned())
                    .collect();
                // Copies start with an empty handler registry
                let mut element = element.clone();
                element.attributes = NamedNodeMap::new(NodeId::NONE);
                (NodeData::Element(element), attributes)
            }
            NodeData::Attribute(attr) => {
                let mut attr = attr.clone();
                attr.owner_element = NodeId::NONE;
                (NodeData::Attribute(attr), Vec::new())
            }
            other => (other.clone(), Vec::new()),
        };
        let children = if deep {
            self.children(id)
                .map(|(child, _)| self.snapshot(child, true))
                .collect::<DomResult<Vec<_>>>()?
        } else {
            Vec::new()
        };
        Ok(Detached { data, attributes, children })
    }

    /// Remove a detached subtree from the arena, returning its contents
    fn take_subtree(&mut self, id: NodeId) -> Detached {
        let children: Vec<NodeId> = self.children(id).map(|(child, _)| child).collect();
        let Some(node) = self.nodes.get_mut(id.index()).and_then(Option::take) else {
            return Detached {
                data: NodeData::DocumentFragment,
                attributes: Vec::new(),
                children: Vec::new(),
            };
        };
        self.live -= 1;

        let (data, attributes) = match node.data {
            NodeData::Element(mut element) => {
                let attr_ids: Vec<NodeId> = element.attributes.items().collect();
                element.attributes.clear_items();
                let attributes = attr_ids
                    .into_iter()
                    .filter_map(|attr| {
                        let slot = self.nodes.get_mut(attr.index()).and_then(Option::take)?;
                        self.live -= 1;
                        match slot.data {
                            NodeData::Attribute(data) => Some(data),
                            _ => None,
                        }
                    })
                    .collect();
                (NodeData::Element(element), attributes)
            }
            NodeData::Attribute(mut attr) => {
                attr.owner_element = NodeId::NONE;
                (NodeData::Attribute(attr), Vec::new())
            }
            other => (other, Vec::new()),
        };
        let children = children.into_iter().map(|child| self.take_subtree(child)).collect();
        Detached { data, attributes, children }
    }

    fn instantiate(&mut self, detached: Detached) -> NodeId {
        let id = self.alloc(detached.data);
        for mut attr in detached.attributes {
            attr.owner_element = id;
            let attr_id = self.alloc(NodeData::Attribute(attr));
            if let Some(element) = self.element_mut(id) {
                element.attributes.push_item(attr_id);
            }
        }
        for child in detached.children {
            let child_id = self.instantiate(child);
            self.link(id, child_id, NodeId::NONE);
        }
        id
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over a subtree
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut current = id;
            loop {
                if current == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(current) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                current = n.parent;
                if !current.is_valid() {
                    break NodeId::NONE;
                }
            }
        };
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::HTML_NAMESPACE;

    fn html(local: &str) -> QualName {
        QualName::new(Some(HTML_NAMESPACE), None, local)
    }

    fn tree() -> DomTree {
        DomTree::new(DocumentId::next())
    }

    #[test]
    fn test_dom_tree_creation() {
        let mut tree = tree();
        let div = tree.create_element(html("div"));
        let span = tree.create_element(html("span"));
        let text = tree.create_text("Hello, World!");

        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, span).unwrap();
        tree.append_child(span, text).unwrap();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.parent(div), Some(tree.root()));
        assert_eq!(tree.get(div).unwrap().first_child(), Some(span));
        assert_eq!(tree.text_content(div), "Hello, World!");
    }

    #[test]
    fn test_sibling_chain_and_index() {
        let mut tree = tree();
        let ul = tree.create_element(html("ul"));
        let items: Vec<NodeId> = (0..3).map(|_| tree.create_element(html("li"))).collect();
        for &li in &items {
            tree.append_child(ul, li).unwrap();
        }

        assert_eq!(tree.child_count(ul), 3);
        assert_eq!(tree.child_at(ul, 1), Some(items[1]));
        assert_eq!(tree.index_of(items[2]), Some(2));
        assert_eq!(tree.get(items[1]).unwrap().previous_sibling(), Some(items[0]));

        tree.remove_child(ul, items[1]).unwrap();
        assert_eq!(tree.get(items[0]).unwrap().next_sibling(), Some(items[2]));
        assert_eq!(tree.get(items[2]).unwrap().previous_sibling(), Some(items[0]));
        assert_eq!(tree.parent(items[1]), None);
    }

    #[test]
    fn test_insert_before_and_replace() {
        let mut tree = tree();
        let div = tree.create_element(html("div"));
        let a = tree.create_element(html("a"));
        let b = tree.create_element(html("b"));
        let c = tree.create_element(html("i"));
        tree.append_child(div, b).unwrap();
        tree.insert_before(div, a, Some(b)).unwrap();
        let order: Vec<NodeId> = tree.children(div).map(|(id, _)| id).collect();
        assert_eq!(order, vec![a, b]);

        assert_eq!(tree.replace_child(div, c, a), Ok(a));
        let order: Vec<NodeId> = tree.children(div).map(|(id, _)| id).collect();
        assert_eq!(order, vec![c, b]);
        assert_eq!(tree.parent(a), None);
    }

    #[test]
    fn test_cycle_rejected() {
        let mut tree = tree();
        let outer = tree.create_element(html("div"));
        let inner = tree.create_element(html("div"));
        tree.append_child(outer, inner).unwrap();

        assert_eq!(tree.append_child(inner, outer), Err(DomError::HierarchyRequest));
        assert_eq!(tree.append_child(outer, outer), Err(DomError::HierarchyRequest));
    }

    #[test]
    fn test_document_constraints() {
        let mut tree = tree();
        let text = tree.create_text("loose");
        assert_eq!(tree.append_child(tree.root(), text), Err(DomError::HierarchyRequest));

        let first = tree.create_element(html("html"));
        let second = tree.create_element(html("html"));
        tree.append_child(tree.root(), first).unwrap();
        assert_eq!(tree.append_child(tree.root(), second), Err(DomError::HierarchyRequest));
        assert_eq!(tree.replace_child(tree.root(), second, first), Ok(first));
    }

    #[test]
    fn test_fragment_insertion_moves_children() {
        let mut tree = tree();
        let div = tree.create_element(html("div"));
        let fragment = tree.create_fragment();
        let p1 = tree.create_element(html("p"));
        let p2 = tree.create_element(html("p"));
        tree.append_child(fragment, p1).unwrap();
        tree.append_child(fragment, p2).unwrap();

        tree.append_child(div, fragment).unwrap();
        assert_eq!(tree.child_count(fragment), 0);
        let order: Vec<NodeId> = tree.children(div).map(|(id, _)| id).collect();
        assert_eq!(order, vec![p1, p2]);
    }

    #[test]
    fn test_remove_non_child() {
        let mut tree = tree();
        let div = tree.create_element(html("div"));
        let span = tree.create_element(html("span"));
        assert_eq!(tree.remove_child(div, span), Err(DomError::NotFound));
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = tree();
        let root = tree.create_element(html("div"));
        let a = tree.create_element(html("a"));
        let a1 = tree.create_text("1");
        let b = tree.create_element(html("b"));
        tree.append_child(root, a).unwrap();
        tree.append_child(a, a1).unwrap();
        tree.append_child(root, b).unwrap();

        let order: Vec<NodeId> = tree.descendants(root).map(|(id, _)| id).collect();
        assert_eq!(order, vec![a, a1, b]);
        assert_eq!(tree.descendants(b).count(), 0);
    }

    #[test]
    fn test_clone_shallow_and_deep() {
        let mut tree = tree();
        let div = tree.create_element(html("div"));
        let text = tree.create_text("x");
        tree.append_child(div, text).unwrap();

        let shallow = tree.clone_node(div, false).unwrap();
        assert_eq!(tree.child_count(shallow), 0);
        assert!(tree.is_element_named(shallow, Some(HTML_NAMESPACE), "div"));

        let deep = tree.clone_node(div, true).unwrap();
        assert_eq!(tree.text_content(deep), "x");
        assert_ne!(tree.child_at(deep, 0), Some(text));
        assert_eq!(tree.parent(deep), None);
    }

    #[test]
    fn test_adopt_moves_subtree() {
        let mut source = tree();
        let mut target = tree();
        let div = source.create_element(html("div"));
        let span = source.create_element(html("span"));
        source.append_child(source.root(), div).unwrap();
        source.append_child(div, span).unwrap();

        let adopted = target.adopt_from(&mut source, div).unwrap();
        assert!(source.get(div).is_none());
        assert!(source.get(span).is_none());
        assert_eq!(source.child_count(source.root()), 0);

        let child = target.child_at(adopted, 0).unwrap();
        assert_eq!(target.get(adopted).unwrap().owner_document(), target.document_id());
        assert_eq!(target.get(child).unwrap().owner_document(), target.document_id());
    }

    #[test]
    fn test_text_content_replacement() {
        let mut tree = tree();
        let div = tree.create_element(html("div"));
        let a = tree.create_element(html("a"));
        tree.append_child(div, a).unwrap();

        tree.set_text_content(div, "plain").unwrap();
        assert_eq!(tree.child_count(div), 1);
        assert_eq!(tree.text_content(div), "plain");

        tree.set_text_content(div, "").unwrap();
        assert_eq!(tree.child_count(div), 0);
    }

    #[test]
    fn test_mutation_records() {
        let mut tree = tree();
        tree.set_mutation_recording(true);
        let div = tree.create_element(html("div"));
        let p = tree.create_element(html("p"));
        tree.append_child(div, p).unwrap();
        tree.remove_child(div, p).unwrap();

        let records = tree.take_mutation_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].added_nodes, vec![p]);
        assert_eq!(records[1].removed_nodes, vec![p]);
        assert!(tree.take_mutation_records().is_empty());
    }
}
