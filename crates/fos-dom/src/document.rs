//! Document - High-level document API
//!
//! Readiness state machine, node factory, title/body rules and loading.

use std::collections::VecDeque;
use std::fmt;

use crate::config::DocumentConfig;
use crate::dom_events::{DomEvent, EventDispatcher};
use crate::loader::{CancelToken, DocumentParser, DocumentResponse, Fetcher, LoadError};
use crate::names::{self, HTML_NAMESPACE, SVG_NAMESPACE};
use crate::source::TextSource;
use crate::stylesheets::StyleSheetList;
use crate::task_queue::TaskQueue;
use crate::{DocumentId, DomError, DomResult, DomTree, NodeId, QualName};

/// Script run when the document becomes interactive
pub type PendingScript = Box<dyn FnOnce(&mut Document)>;

/// Document readiness. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReadyState {
    #[default]
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadyState::Loading => "loading",
            ReadyState::Interactive => "interactive",
            ReadyState::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuirksMode {
    #[default]
    NoQuirks,
    LimitedQuirks,
    Quirks,
}

/// HTML or XML document
pub struct Document {
    id: DocumentId,
    /// The DOM tree
    pub(crate) tree: DomTree,
    ready_state: ReadyState,
    pub(crate) tasks: TaskQueue,
    pub(crate) style_sheets: StyleSheetList,
    pub(crate) last_style_sheet_set: Option<String>,
    pub(crate) preferred_style_sheet_set: Option<String>,
    pub(crate) selected_style_sheet_set: Option<String>,
    quirks_mode: QuirksMode,
    design_mode: bool,
    content_type: String,
    cookie: String,
    referrer: String,
    location: String,
    source: TextSource,
    stream_open: bool,
    pending_scripts: VecDeque<PendingScript>,
    pending_resources: Vec<String>,
    finished_loading: bool,
    config: DocumentConfig,
    pub(crate) dispatcher: Option<Box<dyn EventDispatcher>>,
}

impl Document {
    /// Create an empty HTML document
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        let id = DocumentId::next();
        Self {
            id,
            tree: DomTree::new(id),
            ready_state: ReadyState::Loading,
            tasks: TaskQueue::new(),
            style_sheets: StyleSheetList::new(),
            last_style_sheet_set: None,
            preferred_style_sheet_set: None,
            selected_style_sheet_set: None,
            quirks_mode: QuirksMode::NoQuirks,
            design_mode: false,
            content_type: "text/html".into(),
            cookie: String::new(),
            referrer: String::new(),
            location: "about:blank".into(),
            source: TextSource::default(),
            stream_open: false,
            pending_scripts: VecDeque::new(),
            pending_resources: Vec::new(),
            finished_loading: false,
            config,
            dispatcher: None,
        }
    }

    /// Create an empty XML document
    pub fn new_xml() -> Self {
        let mut doc = Self::new();
        doc.content_type = "application/xml".into();
        doc
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    pub fn is_html(&self) -> bool {
        self.content_type == "text/html"
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn set_content_type(&mut self, content_type: &str) {
        self.content_type = content_type.to_ascii_lowercase();
    }

    pub fn cookie(&self) -> &str {
        &self.cookie
    }

    pub fn set_cookie(&mut self, cookie: &str) {
        self.cookie = cookie.to_string();
    }

    pub fn referrer(&self) -> &str {
        &self.referrer
    }

    pub fn set_referrer(&mut self, referrer: &str) {
        self.referrer = referrer.to_string();
    }

    /// Document URL
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: &str) {
        self.location = location.to_string();
    }

    pub fn quirks_mode(&self) -> QuirksMode {
        self.quirks_mode
    }

    pub fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }

    /// Character source the parser reads from
    pub fn source(&self) -> &TextSource {
        &self.source
    }

    /// `"on"` or `"off"`
    pub fn design_mode(&self) -> &'static str {
        if self.design_mode { "on" } else { "off" }
    }

    /// Accepts `on`/`off` in any case; anything else is ignored
    pub fn set_design_mode(&mut self, value: &str) {
        if value.eq_ignore_ascii_case("on") {
            self.design_mode = true;
        } else if value.eq_ignore_ascii_case("off") {
            self.design_mode = false;
        }
    }

    // ------------------------------------------------------------------
    // Readiness
    // ------------------------------------------------------------------

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Advance readiness and fire `readystatechange`. Never moves back.
    fn set_ready_state(&mut self, state: ReadyState) {
        if state <= self.ready_state {
            return;
        }
        tracing::debug!(from = self.ready_state.as_str(), to = state.as_str(), "ready state change");
        self.ready_state = state;
        self.dispatch_event(&DomEvent::ready_state_change());
    }

    /// Register a script to run once parsing finishes
    pub fn add_pending_script<F>(&mut self, script: F)
    where
        F: FnOnce(&mut Document) + 'static,
    {
        self.pending_scripts.push_back(Box::new(script));
    }

    pub fn pending_script_count(&self) -> usize {
        self.pending_scripts.len()
    }

    /// Record a subresource whose cache entry is settled after `load`
    pub fn add_pending_resource(&mut self, url: &str) {
        self.pending_resources.push(url.to_string());
    }

    pub fn pending_resources(&self) -> &[String] {
        &self.pending_resources
    }

    /// Has the terminal lifecycle task run?
    pub fn is_finished_loading(&self) -> bool {
        self.finished_loading
    }

    /// Parsing input is exhausted: become interactive, run pending scripts
    /// and queue the remaining lifecycle steps. No-op past Loading.
    pub fn close(&mut self) {
        if self.ready_state != ReadyState::Loading {
            return;
        }
        self.stream_open = false;
        self.set_ready_state(ReadyState::Interactive);

        while let Some(script) = self.pending_scripts.pop_front() {
            script(self);
        }

        self.queue_task(|doc| {
            doc.dispatch_event(&DomEvent::content_loaded());
        });
        self.queue_task(|doc| {
            doc.set_ready_state(ReadyState::Complete);
            doc.dispatch_event(&DomEvent::load());
        });
        self.queue_task(|doc| {
            if doc.config.browsing_context {
                doc.dispatch_event(&DomEvent::page_show(false));
            }
        });
        self.queue_task(|doc| {
            let flushed = std::mem::take(&mut doc.pending_resources);
            tracing::trace!(count = flushed.len(), "pending resources settled");
        });
        self.queue_task(|doc| {
            doc.finished_loading = true;
            tracing::info!("Finished loading document: {}", doc.location);
        });

        self.run_tasks();
    }

    // ------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------

    /// Namespace of elements created by `create_element`
    fn default_element_namespace(&self) -> Option<&'static str> {
        (self.is_html() || self.content_type == "application/xhtml+xml").then_some(HTML_NAMESPACE)
    }

    pub fn create_element(&mut self, local_name: &str) -> DomResult<NodeId> {
        if !names::is_valid_name(local_name) {
            return Err(DomError::InvalidCharacter);
        }
        let local = if self.is_html() {
            local_name.to_ascii_lowercase()
        } else {
            local_name.to_string()
        };
        let name = QualName::new(self.default_element_namespace(), None, &local);
        let id = self.tree.create_element(name);
        self.tree.finalize_element(id);
        Ok(id)
    }

    pub fn create_element_ns(&mut self, namespace: Option<&str>, qualified_name: &str) -> DomResult<NodeId> {
        let name = names::validate_and_extract(namespace, qualified_name)?;
        let id = self.tree.create_element(QualName::new(
            name.namespace.as_deref(),
            name.prefix.as_deref(),
            &name.local_name,
        ));
        self.tree.finalize_element(id);
        Ok(id)
    }

    pub fn create_text_node(&mut self, data: &str) -> NodeId {
        self.tree.create_text(data)
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.tree.create_comment(data)
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.tree.create_fragment()
    }

    pub fn create_processing_instruction(&mut self, target: &str, data: &str) -> DomResult<NodeId> {
        if !names::is_valid_name(target) || data.contains("?>") {
            return Err(DomError::InvalidCharacter);
        }
        Ok(self.tree.create_processing_instruction(target, data))
    }

    pub fn create_attribute(&mut self, local_name: &str) -> DomResult<NodeId> {
        if !names::is_valid_name(local_name) {
            return Err(DomError::InvalidCharacter);
        }
        let local = if self.is_html() {
            local_name.to_ascii_lowercase()
        } else {
            local_name.to_string()
        };
        Ok(self.tree.create_attribute(QualName::local(&local), ""))
    }

    pub fn create_attribute_ns(&mut self, namespace: Option<&str>, qualified_name: &str) -> DomResult<NodeId> {
        let name = names::validate_and_extract(namespace, qualified_name)?;
        let qual = QualName::new(name.namespace.as_deref(), name.prefix.as_deref(), &name.local_name);
        Ok(self.tree.create_attribute(qual, ""))
    }

    pub fn create_document_type(&mut self, name: &str, public_id: &str, system_id: &str) -> DomResult<NodeId> {
        if !names::is_valid_name(name) {
            return Err(DomError::InvalidCharacter);
        }
        if !names::is_valid_qualified_name(name) {
            return Err(DomError::Namespace);
        }
        Ok(self.tree.create_doctype(name, public_id, system_id))
    }

    // ------------------------------------------------------------------
    // Structure accessors
    // ------------------------------------------------------------------

    /// The root element
    pub fn document_element(&self) -> Option<NodeId> {
        self.tree.child_elements(self.tree.root()).map(|(id, _)| id).next()
    }

    pub fn doctype(&self) -> Option<NodeId> {
        self.tree
            .children(self.tree.root())
            .find(|(_, node)| matches!(node.data, crate::NodeData::Doctype { .. }))
            .map(|(id, _)| id)
    }

    /// First `head` child of the `html` root
    pub fn head(&self) -> Option<NodeId> {
        let root = self.document_element()?;
        if !self.tree.is_element_named(root, Some(HTML_NAMESPACE), "html") {
            return None;
        }
        self.tree
            .child_elements(root)
            .find(|(_, e)| e.name.is(Some(HTML_NAMESPACE), "head"))
            .map(|(id, _)| id)
    }

    /// First `body` child of the root, else the first `frameset` child
    pub fn body(&self) -> Option<NodeId> {
        let root = self.document_element()?;
        let child_named = |local: &str| {
            self.tree
                .child_elements(root)
                .find(|(_, e)| e.name.is(Some(HTML_NAMESPACE), local))
                .map(|(id, _)| id)
        };
        child_named("body").or_else(|| child_named("frameset"))
    }

    /// Replace (or insert) the body element
    pub fn set_body(&mut self, body: NodeId) -> DomResult<()> {
        let is_body = self.tree.is_element_named(body, Some(HTML_NAMESPACE), "body")
            || self.tree.is_element_named(body, Some(HTML_NAMESPACE), "frameset");
        if !is_body {
            return Err(DomError::HierarchyRequest);
        }
        let current = self.body();
        if current == Some(body) {
            return Ok(());
        }
        let root = self.document_element().ok_or(DomError::HierarchyRequest)?;
        match current {
            Some(old) => self.tree.replace_child(root, body, old)?,
            None => self.tree.append_child(root, body)?,
        };
        Ok(())
    }

    /// Element whose `id` attribute equals `id`, in tree order
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        if id.is_empty() {
            return None;
        }
        let root = self.tree.root();
        self.tree.find_descendant(root, |node_id, node| {
            node.is_element() && self.tree.get_attribute(node_id, "id") == Some(id)
        })
    }

    /// Elements with the given qualified name (`*` matches all)
    pub fn get_elements_by_tag_name(&self, name: &str) -> Vec<NodeId> {
        let lowered = name.to_ascii_lowercase();
        self.tree
            .descendants(self.tree.root())
            .filter_map(|(id, node)| node.as_element().map(|e| (id, e)))
            .filter(|(_, e)| {
                if name == "*" {
                    return true;
                }
                let html = self.is_html() && e.namespace() == Some(HTML_NAMESPACE);
                let wanted = if html { lowered.as_str() } else { name };
                e.name.is_qualified(wanted)
            })
            .map(|(id, _)| id)
            .collect()
    }

    // ------------------------------------------------------------------
    // Title
    // ------------------------------------------------------------------

    fn title_element(&self) -> Option<NodeId> {
        let root = self.document_element()?;
        if self.tree.is_element_named(root, Some(SVG_NAMESPACE), "svg") {
            self.tree
                .child_elements(root)
                .find(|(_, e)| e.name.is(Some(SVG_NAMESPACE), "title"))
                .map(|(id, _)| id)
        } else {
            self.tree.find_descendant(root, |_, node| {
                node.as_element()
                    .is_some_and(|e| e.name.is(Some(HTML_NAMESPACE), "title"))
            })
        }
    }

    /// Title text with ASCII whitespace stripped and collapsed
    pub fn title(&self) -> String {
        self.title_element()
            .map(|title| {
                self.tree
                    .text_content(title)
                    .split_ascii_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    pub fn set_title(&mut self, value: &str) -> DomResult<()> {
        let Some(root) = self.document_element() else {
            return Ok(());
        };
        let title = if self.tree.is_element_named(root, Some(SVG_NAMESPACE), "svg") {
            match self.title_element() {
                Some(title) => title,
                None => {
                    let title = self.create_element_ns(Some(SVG_NAMESPACE), "title")?;
                    let first = self.tree.get(root).and_then(|n| n.first_child());
                    self.tree.insert_before(root, title, first)?
                }
            }
        } else if self.tree.element(root).is_some_and(|e| e.namespace() == Some(HTML_NAMESPACE)) {
            match self.title_element() {
                Some(title) => title,
                None => {
                    let Some(head) = self.head() else {
                        return Ok(());
                    };
                    let title = self.create_element_ns(Some(HTML_NAMESPACE), "title")?;
                    self.tree.append_child(head, title)?
                }
            }
        } else {
            return Ok(());
        };
        self.tree.set_text_content(title, value)
    }

    // ------------------------------------------------------------------
    // Import, adoption and cloning
    // ------------------------------------------------------------------

    /// Disconnected copy of a node from another document
    pub fn import_node(&mut self, source: &Document, node: NodeId, deep: bool) -> DomResult<NodeId> {
        self.tree.import_from(&source.tree, node, deep)
    }

    /// Move a node (and its subtree) out of `source` into this document.
    /// The returned id is the node's id in this document.
    pub fn adopt_node(&mut self, source: &mut Document, node: NodeId) -> DomResult<NodeId> {
        tracing::trace!(?node, from = ?source.id, to = ?self.id, "adopting node");
        self.tree.adopt_from(&mut source.tree, node)
    }

    /// Independent copy of this document. The parser is not re-run.
    pub fn clone_document(&self, deep: bool) -> DomResult<Document> {
        let mut clone = Document::with_config(self.config.clone());
        clone.ready_state = self.ready_state;
        clone.referrer = self.referrer.clone();
        clone.location = self.location.clone();
        clone.quirks_mode = self.quirks_mode;
        clone.content_type = self.content_type.clone();

        if deep {
            let root = clone.tree.root();
            for (child, _) in self.tree.children(self.tree.root()) {
                let copy = clone.tree.import_from(&self.tree, child, true)?;
                clone.tree.append_child(root, copy)?;
            }
        }
        Ok(clone)
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Discard the tree and start from `source`. Mutation recording
    /// carries over to the new tree.
    fn reset_for_load(&mut self, source: TextSource) {
        let recording = self.tree.is_mutation_recording();
        self.source = source;
        self.cookie.clear();
        self.tree = DomTree::new(self.id);
        self.tree.set_mutation_recording(recording);
    }

    /// Parse `source` into a fresh tree
    pub fn load(&mut self, source: TextSource, parser: &mut dyn DocumentParser) -> DomResult<()> {
        if self.ready_state != ReadyState::Loading {
            return Err(DomError::InvalidState);
        }
        tracing::debug!(encoding = source.encoding(), bytes = source.len(), "Loading document source");
        self.reset_for_load(source);
        parser.parse(self)
    }

    /// Load a fetched response: location, content type and cookie come
    /// from the response, the body is decoded into the source.
    pub fn load_response(&mut self, response: DocumentResponse, parser: &mut dyn DocumentParser) -> DomResult<()> {
        if self.ready_state != ReadyState::Loading {
            return Err(DomError::InvalidState);
        }
        let source = TextSource::from_bytes(&response.body, response.charset(), &self.config.default_encoding);
        self.reset_for_load(source);
        self.location = response.url.clone();
        if let Some(content_type) = response.content_type() {
            self.content_type = content_type;
        }
        self.cookie = response.cookie();
        tracing::debug!("Parsing HTML document: {}", self.location);
        parser.parse(self)
    }

    /// Fetch `url` and parse the response, blocking until both settle.
    ///
    /// Returns `false` on an invalid URL, a failed, cancelled or non-2xx
    /// fetch, or a document past Loading; the tree is untouched then.
    ///
    /// Calling this from inside a queued task blocks the task queue: the
    /// lifecycle tasks the load queues only run once the calling task
    /// returns.
    pub fn load_html<F, P>(&mut self, url: &str, fetcher: &F, parser: &mut P, cancel: CancelToken) -> bool
    where
        F: Fetcher,
        P: DocumentParser,
    {
        if self.tasks.is_draining() {
            tracing::warn!("load_html called from a running task; lifecycle tasks are deferred until it returns");
        }
        if self.ready_state != ReadyState::Loading {
            tracing::warn!(state = self.ready_state.as_str(), "load_html on a document past loading");
            return false;
        }

        let response = smol::block_on(fetch_document(url, fetcher, cancel));
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", url, e);
                return false;
            }
        };

        match self.load_response(response, parser) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", url, e);
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Stream reopening
    // ------------------------------------------------------------------

    /// Reopen the document for `write`. HTML documents still loading only.
    pub fn open(&mut self) -> DomResult<()> {
        if !self.is_html() || self.ready_state != ReadyState::Loading {
            return Err(DomError::InvalidState);
        }
        self.reset_for_load(TextSource::default());
        self.stream_open = true;
        Ok(())
    }

    /// Append markup to the source of an open stream
    pub fn write(&mut self, text: &str) -> DomResult<()> {
        if !self.stream_open {
            return Err(DomError::InvalidState);
        }
        self.source.push_str(text);
        Ok(())
    }

    pub fn is_stream_open(&self) -> bool {
        self.stream_open
    }
}

/// Race the fetch against cancellation and check the status
async fn fetch_document<F: Fetcher>(url: &str, fetcher: &F, cancel: CancelToken) -> Result<DocumentResponse, LoadError> {
    let parsed = url::Url::parse(url).map_err(|e| LoadError::InvalidUrl(format!("{url}: {e}")))?;
    if cancel.is_cancelled() {
        return Err(LoadError::Cancelled);
    }
    let fetch = fetcher.fetch(parsed.as_str(), cancel.clone());
    let cancelled = async {
        cancel.cancelled().await;
        Err(LoadError::Cancelled)
    };
    let response = smol::future::or(fetch, cancelled).await?;
    if !response.is_success() {
        return Err(LoadError::HttpStatus { status: response.status });
    }
    Ok(response)
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("location", &self.location)
            .field("ready_state", &self.ready_state)
            .field("content_type", &self.content_type)
            .field("nodes", &self.tree.len())
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}
