//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM core: the document aggregate with its readiness state
//! machine and task queue, qualified-name validation, and `NamedNodeMap`
//! attribute storage with change notification.

use std::sync::atomic::{AtomicU64, Ordering};

mod attributes;
mod config;
mod document;
mod dom_events;
mod error;
pub mod factory;
mod loader;
pub mod names;
mod node;
mod observer;
mod serialize;
mod source;
mod stylesheets;
mod task_queue;
mod tree;

pub use attributes::{AttrHandler, NamedNodeMap};
pub use config::{DocumentConfig, DocumentConfigBuilder};
pub use document::{Document, PendingScript, QuirksMode, ReadyState};
pub use dom_events::{DomEvent, DomEventType, EventDispatcher, EventInterface};
pub use error::{DomError, DomResult};
pub use loader::{CancelHandle, CancelToken, DocumentParser, DocumentResponse, Fetcher, LoadError};
pub use node::{AttrData, ElementData, Node, NodeData, NodeType, QualName, TextData};
pub use observer::{MutationLog, MutationRecord, MutationType};
pub use source::{EncodingConfidence, TextSource};
pub use stylesheets::{StyleSheet, StyleSheetList};
pub use task_queue::{Task, TaskQueue};
pub use tree::{Children, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Invalid/null node ID
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// `None` for the null id
    #[inline]
    pub fn to_option(self) -> Option<NodeId> {
        self.is_valid().then_some(self)
    }
}

/// Identity of a document, recorded on every node it owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Fresh id, unique within the process
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        DocumentId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}
