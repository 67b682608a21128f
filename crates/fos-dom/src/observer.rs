//! Mutation records
//!
//! Child-list and attribute changes are logged on the tree so observers
//! (and the element-level attribute notification) can consume them later.

use crate::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
    CharacterData,
    ChildList,
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
    pub previous_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub attribute_name: Option<String>,
    pub attribute_namespace: Option<String>,
    pub old_value: Option<String>,
}

impl MutationRecord {
    pub fn child_list(
        target: NodeId,
        added_nodes: Vec<NodeId>,
        removed_nodes: Vec<NodeId>,
        previous_sibling: Option<NodeId>,
        next_sibling: Option<NodeId>,
    ) -> Self {
        Self {
            mutation_type: MutationType::ChildList,
            target,
            added_nodes,
            removed_nodes,
            previous_sibling,
            next_sibling,
            attribute_name: None,
            attribute_namespace: None,
            old_value: None,
        }
    }

    pub fn attributes(target: NodeId, name: &str, namespace: Option<&str>, old_value: Option<String>) -> Self {
        Self {
            mutation_type: MutationType::Attributes,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: Some(name.to_string()),
            attribute_namespace: namespace.map(str::to_string),
            old_value,
        }
    }

    pub fn character_data(target: NodeId, old_value: String) -> Self {
        Self {
            mutation_type: MutationType::CharacterData,
            target,
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            previous_sibling: None,
            next_sibling: None,
            attribute_name: None,
            attribute_namespace: None,
            old_value: Some(old_value),
        }
    }
}

/// Pending records, drained by `take_records`. Starts disabled so a
/// document nobody observes keeps no history.
#[derive(Debug, Clone)]
pub struct MutationLog {
    records: Vec<MutationRecord>,
    enabled: bool,
}

impl MutationLog {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            enabled: false,
        }
    }

    #[inline]
    pub fn push(&mut self, record: MutationRecord) {
        if self.enabled {
            self.records.push(record);
        }
    }

    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for MutationLog {
    fn default() -> Self {
        Self::new()
    }
}
