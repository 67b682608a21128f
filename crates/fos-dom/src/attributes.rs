//! Element Attributes
//!
//! `NamedNodeMap` holds an element's attribute nodes in insertion order
//! together with the reflection handlers registered per attribute name.
//! Operations that need the attribute nodes themselves live on `DomTree`,
//! since the nodes are stored in the arena.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::names::{self, HTML_NAMESPACE};
use crate::node::NodeData;
use crate::observer::MutationRecord;
use crate::{DomError, DomResult, DomTree, NodeId, QualName};

/// Reflection handler: `(tree, element, new_value)`. `None` means removed.
pub type AttrHandler = Rc<dyn Fn(&mut DomTree, NodeId, Option<&str>)>;

/// Named node map (attribute collection)
#[derive(Clone)]
pub struct NamedNodeMap {
    /// Owning element. Not an owning reference: the element owns the map.
    owner: NodeId,
    items: Vec<NodeId>,
    handlers: HashMap<String, Vec<AttrHandler>>,
}

impl NamedNodeMap {
    pub fn new(owner: NodeId) -> Self {
        Self {
            owner,
            items: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Element this map belongs to
    #[inline]
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: NodeId) {
        self.owner = owner;
    }

    /// Get number of attributes
    #[inline]
    pub fn length(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get attribute by index
    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.items.get(index).copied()
    }

    /// Attribute nodes in insertion order
    pub fn items(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items.iter().copied()
    }

    pub(crate) fn push_item(&mut self, attr: NodeId) {
        self.items.push(attr);
    }

    pub(crate) fn clear_items(&mut self) {
        self.items.clear();
    }

    /// Install `handler` as the only handler for `name`
    pub fn set_handler<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut DomTree, NodeId, Option<&str>) + 'static,
    {
        self.handlers.insert(name.to_string(), vec![Rc::new(handler)]);
    }

    /// Add `handler` after the ones already registered for `name`
    pub fn add_handler<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut DomTree, NodeId, Option<&str>) + 'static,
    {
        self.handlers
            .entry(name.to_string())
            .or_default()
            .push(Rc::new(handler));
    }

    /// Detach and return every handler registered for `name`
    pub fn remove_handler(&mut self, name: &str) -> Vec<AttrHandler> {
        self.handlers.remove(name).unwrap_or_default()
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.get(name).is_some_and(|h| !h.is_empty())
    }

    /// Snapshot of the handlers for `name`, safe to call while the map changes
    pub(crate) fn handlers_for(&self, name: &str) -> Vec<AttrHandler> {
        self.handlers.get(name).cloned().unwrap_or_default()
    }
}

impl fmt::Debug for NamedNodeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<(&str, usize)> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        handlers.sort_unstable();
        f.debug_struct("NamedNodeMap")
            .field("owner", &self.owner)
            .field("items", &self.items)
            .field("handlers", &handlers)
            .finish()
    }
}

impl DomTree {
    /// Attribute map of an element
    pub fn attributes(&self, element: NodeId) -> Option<&NamedNodeMap> {
        self.element(element).map(|e| &e.attributes)
    }

    /// Mutable attribute map of an element (handler registry access)
    pub fn attributes_mut(&mut self, element: NodeId) -> Option<&mut NamedNodeMap> {
        self.element_mut(element).map(|e| &mut e.attributes)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Attribute whose qualified name is exactly `name`
    pub fn get_named_item(&self, element: NodeId, name: &str) -> Option<NodeId> {
        self.attributes(element)?
            .items()
            .find(|&attr| self.attr(attr).is_some_and(|a| a.name.is_qualified(name)))
    }

    /// Attribute with this namespace and local name
    pub fn get_named_item_ns(&self, element: NodeId, namespace: Option<&str>, local: &str) -> Option<NodeId> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        self.attributes(element)?
            .items()
            .find(|&attr| self.attr(attr).is_some_and(|a| a.name.is(namespace, local)))
    }

    pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        let attr = self.get_named_item(element, name)?;
        self.attr(attr).map(|a| a.value.as_str())
    }

    pub fn get_attribute_ns(&self, element: NodeId, namespace: Option<&str>, local: &str) -> Option<&str> {
        let attr = self.get_named_item_ns(element, namespace, local)?;
        self.attr(attr).map(|a| a.value.as_str())
    }

    pub fn has_attribute(&self, element: NodeId, name: &str) -> bool {
        self.get_named_item(element, name).is_some()
    }

    /// Qualified names in insertion order
    pub fn attribute_names(&self, element: NodeId) -> Vec<String> {
        self.attributes(element)
            .map(|map| {
                map.items()
                    .filter_map(|attr| self.attr(attr).map(|a| a.name.qualified()))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Add `attr` keyed by its qualified name, returning the attribute it
    /// displaced. Already in this map: no-op returning `None`.
    ///
    /// An entry with the same namespace and local name is replaced even when
    /// its prefix differs, so each (namespace, local name) pair stays unique.
    pub fn set_named_item(&mut self, element: NodeId, attr: NodeId) -> DomResult<Option<NodeId>> {
        if !self.prepare_item(element, attr)? {
            return Ok(None);
        }
        let name = self.attr(attr).map(|a| a.name.clone()).ok_or(DomError::NotFound)?;
        let existing = self
            .get_named_item_ns(element, name.namespace.as_deref(), &name.local)
            .or_else(|| self.get_named_item(element, &name.qualified()));
        Ok(self.replace_or_append(element, attr, existing))
    }

    /// Add `attr` keyed by namespace and local name
    pub fn set_named_item_ns(&mut self, element: NodeId, attr: NodeId) -> DomResult<Option<NodeId>> {
        if !self.prepare_item(element, attr)? {
            return Ok(None);
        }
        let (namespace, local) = self
            .attr(attr)
            .map(|a| (a.name.namespace.clone(), a.name.local.clone()))
            .ok_or(DomError::NotFound)?;
        let existing = self.get_named_item_ns(element, namespace.as_deref(), &local);
        Ok(self.replace_or_append(element, attr, existing))
    }

    /// Insert an attribute while building the tree. Only reflection
    /// handlers run: there is no previous value to report.
    pub fn fast_add_attribute(&mut self, element: NodeId, name: QualName, value: &str) -> NodeId {
        let has_namespace = name.namespace.is_some();
        let local = name.local.clone();
        let attr = self.create_attribute(name, value);
        if let Some(a) = self.get_mut(attr).and_then(|n| n.as_attr_mut()) {
            a.owner_element = element;
        }
        let handlers = match self.attributes_mut(element) {
            Some(map) => {
                map.push_item(attr);
                if has_namespace { Vec::new() } else { map.handlers_for(&local) }
            }
            None => Vec::new(),
        };
        for handler in handlers {
            handler(self, element, Some(value));
        }
        attr
    }

    /// Set (or create) the attribute named `name`
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> DomResult<()> {
        if !names::is_valid_name(name) {
            return Err(DomError::InvalidCharacter);
        }
        let is_html = self
            .element(element)
            .ok_or(DomError::NotFound)?
            .namespace()
            == Some(HTML_NAMESPACE);
        let name = if is_html { name.to_ascii_lowercase() } else { name.to_string() };

        match self.get_named_item(element, &name) {
            Some(attr) => self.set_attr_value(attr, value),
            None => {
                let attr = self.create_attribute(QualName::local(&name), value);
                self.prepare_item(element, attr)?;
                self.replace_or_append(element, attr, None);
                Ok(())
            }
        }
    }

    /// Set (or create) a namespaced attribute
    pub fn set_attribute_ns(
        &mut self,
        element: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> DomResult<()> {
        let name = names::validate_and_extract(namespace, qualified_name)?;
        if self.element(element).is_none() {
            return Err(DomError::NotFound);
        }
        match self.get_named_item_ns(element, name.namespace.as_deref(), &name.local_name) {
            Some(attr) => self.set_attr_value(attr, value),
            None => {
                let qual = QualName::new(name.namespace.as_deref(), name.prefix.as_deref(), &name.local_name);
                let attr = self.create_attribute(qual, value);
                self.prepare_item(element, attr)?;
                self.replace_or_append(element, attr, None);
                Ok(())
            }
        }
    }

    /// Change the value of an attribute node, notifying its owner
    pub fn set_attr_value(&mut self, attr: NodeId, value: &str) -> DomResult<()> {
        let data = self
            .get_mut(attr)
            .and_then(|n| n.as_attr_mut())
            .ok_or(DomError::NotFound)?;
        let old = std::mem::replace(&mut data.value, value.to_string());
        let owner = data.owner_element;
        let (local, namespace) = (data.name.local.clone(), data.name.namespace.clone());
        if owner.is_valid() {
            self.attribute_changed(owner, &local, namespace.as_deref(), Some(old), Some(value));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove by qualified name, failing when absent
    pub fn remove_named_item(&mut self, element: NodeId, name: &str) -> DomResult<NodeId> {
        self.try_remove_named_item(element, name).ok_or(DomError::NotFound)
    }

    /// Remove by qualified name, `None` when absent
    pub fn try_remove_named_item(&mut self, element: NodeId, name: &str) -> Option<NodeId> {
        let attr = self.get_named_item(element, name)?;
        Some(self.detach_attribute(element, attr))
    }

    /// Remove by namespace and local name, failing when absent
    pub fn remove_named_item_ns(&mut self, element: NodeId, namespace: Option<&str>, local: &str) -> DomResult<NodeId> {
        self.try_remove_named_item_ns(element, namespace, local)
            .ok_or(DomError::NotFound)
    }

    /// Remove by namespace and local name, `None` when absent
    pub fn try_remove_named_item_ns(&mut self, element: NodeId, namespace: Option<&str>, local: &str) -> Option<NodeId> {
        let attr = self.get_named_item_ns(element, namespace, local)?;
        Some(self.detach_attribute(element, attr))
    }

    /// DOM `removeAttribute`: silently ignores missing names
    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> Option<NodeId> {
        self.try_remove_named_item(element, name)
    }

    /// Remove a specific attribute node from `element`
    pub fn remove_attribute_node(&mut self, element: NodeId, attr: NodeId) -> DomResult<NodeId> {
        match self.attr(attr).and_then(|a| a.owner_element()) {
            Some(owner) if owner == element => Ok(self.detach_attribute(element, attr)),
            _ => Err(DomError::NotFound),
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Take ownership of `attr` for `element`. `Ok(false)` when it already
    /// belongs to this map.
    fn prepare_item(&mut self, element: NodeId, attr: NodeId) -> DomResult<bool> {
        if self.element(element).is_none() {
            return Err(DomError::NotFound);
        }
        let node = self.get_mut(attr).ok_or(DomError::NotFound)?;
        let NodeData::Attribute(data) = &mut node.data else {
            return Err(DomError::HierarchyRequest);
        };
        match data.owner_element() {
            Some(owner) if owner == element => Ok(false),
            Some(_) => Err(DomError::InUseAttribute),
            None => {
                data.owner_element = element;
                Ok(true)
            }
        }
    }

    fn replace_or_append(&mut self, element: NodeId, attr: NodeId, existing: Option<NodeId>) -> Option<NodeId> {
        let (local, namespace, value) = match self.attr(attr) {
            Some(a) => (a.name.local.clone(), a.name.namespace.clone(), a.value.clone()),
            None => return None,
        };

        let old_value = match existing {
            Some(old) => {
                if let Some(map) = self.attributes_mut(element) {
                    if let Some(slot) = map.items.iter_mut().find(|item| **item == old) {
                        *slot = attr;
                    }
                }
                self.get_mut(old).and_then(|n| n.as_attr_mut()).map(|a| {
                    a.owner_element = NodeId::NONE;
                    a.value.clone()
                })
            }
            None => {
                if let Some(map) = self.attributes_mut(element) {
                    map.push_item(attr);
                }
                None
            }
        };

        self.attribute_changed(element, &local, namespace.as_deref(), old_value, Some(&value));
        existing
    }

    fn detach_attribute(&mut self, element: NodeId, attr: NodeId) -> NodeId {
        if let Some(map) = self.attributes_mut(element) {
            map.items.retain(|&item| item != attr);
        }
        let detached = self.get_mut(attr).and_then(|n| n.as_attr_mut()).map(|a| {
            a.owner_element = NodeId::NONE;
            (a.name.local.clone(), a.name.namespace.clone(), a.value.clone())
        });
        if let Some((local, namespace, old)) = detached {
            self.attribute_changed(element, &local, namespace.as_deref(), Some(old), None);
        }
        attr
    }

    /// Change notification pipeline: reflection handlers for attributes
    /// without a namespace, then the generic element notification.
    fn attribute_changed(
        &mut self,
        element: NodeId,
        local: &str,
        namespace: Option<&str>,
        old_value: Option<String>,
        new_value: Option<&str>,
    ) {
        tracing::trace!(?element, name = local, ?namespace, "attribute changed");
        if namespace.is_none() {
            let handlers = self
                .attributes(element)
                .map(|map| map.handlers_for(local))
                .unwrap_or_default();
            for handler in handlers {
                handler(self, element, new_value);
            }
        }
        self.mutations
            .push(MutationRecord::attributes(element, local, namespace, old_value));
    }

    /// Mark a freshly created element as set up and run reflection handlers
    /// for the attributes it already carries. Parsers call this before
    /// adding attributes through the fast path.
    pub fn finalize_element(&mut self, element: NodeId) {
        if let Some(data) = self.element_mut(element) {
            data.finalized = true;
        }
        self.reflect_existing_attributes(element);
    }

    /// Run reflection handlers for every attribute already present
    fn reflect_existing_attributes(&mut self, element: NodeId) {
        let present: Vec<(String, String)> = self
            .attributes(element)
            .map(|map| {
                map.items()
                    .filter_map(|attr| self.attr(attr))
                    .filter(|a| a.name.namespace.is_none())
                    .map(|a| (a.name.local.clone(), a.value.clone()))
                    .collect()
            })
            .unwrap_or_default();
        for (local, value) in present {
            let handlers = self
                .attributes(element)
                .map(|map| map.handlers_for(&local))
                .unwrap_or_default();
            for handler in handlers {
                handler(self, element, Some(&value));
            }
        }
    }
}
