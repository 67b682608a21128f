//! HTML5 Parser implementation
//!
//! Uses html5ever's built-in RcDom and converts to our DOM format through
//! the tree construction primitives. Attributes go in via the fast path,
//! so reflection handlers run but no attribute records are logged.

use fos_dom::{Document, DocumentParser, DomResult, DomTree, NodeId, QualName, QuirksMode};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::QuirksMode as Html5QuirksMode;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
#[derive(Debug, Default)]
pub struct HtmlParser {
    /// Parse errors reported by the tree builder on the last run
    errors: Vec<String>,
    /// Turn on scripting-dependent parsing (`<noscript>` as raw text)
    scripting: Option<bool>,
}

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the document's scripting flag
    pub fn scripting(mut self, enabled: bool) -> Self {
        self.scripting = Some(enabled);
        self
    }

    /// Errors recovered from while parsing the last document
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Convert an RcDom node to our DOM format
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> DomResult<()> {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent)?;
                }
            }
            RcNodeData::Doctype { name, public_id, system_id } => {
                let id = tree.create_doctype(name, public_id, system_id);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Text { contents } => {
                let id = tree.create_text(&contents.borrow());
                tree.append_child(parent, id)?;
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::ProcessingInstruction { target, contents } => {
                let id = tree.create_processing_instruction(target, contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, template_contents, .. } => {
                let qname = QualName::new(
                    namespace(&name.ns),
                    name.prefix.as_deref(),
                    &name.local,
                );
                let id = tree.create_element(qname);
                tree.finalize_element(id);
                tree.append_child(parent, id)?;

                for attr in attrs.borrow().iter() {
                    let attr_name = QualName::new(
                        namespace(&attr.name.ns),
                        attr.name.prefix.as_deref(),
                        &attr.name.local,
                    );
                    tree.fast_add_attribute(id, attr_name, &attr.value);
                }

                // Template contents are flattened into the template element
                if let Some(contents) = template_contents.borrow().as_ref() {
                    for child in contents.children.borrow().iter() {
                        self.convert_node(child, tree, id)?;
                    }
                }
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id)?;
                }
            }
        }
        Ok(())
    }
}

fn namespace(ns: &str) -> Option<&str> {
    (!ns.is_empty()).then_some(ns)
}

fn quirks_mode(mode: Html5QuirksMode) -> QuirksMode {
    match mode {
        Html5QuirksMode::Quirks => QuirksMode::Quirks,
        Html5QuirksMode::LimitedQuirks => QuirksMode::LimitedQuirks,
        Html5QuirksMode::NoQuirks => QuirksMode::NoQuirks,
    }
}

impl DocumentParser for HtmlParser {
    fn parse(&mut self, document: &mut Document) -> DomResult<()> {
        tracing::debug!("Parsing HTML document: {}", document.location());

        let mut opts = ParseOpts::default();
        opts.tree_builder.scripting_enabled = self.scripting.unwrap_or(document.config().scripting);

        let dom = parse_document(RcDom::default(), opts).one(document.source().text());
        self.errors = dom.errors.borrow().iter().map(|e| e.to_string()).collect();
        if !self.errors.is_empty() {
            tracing::trace!(count = self.errors.len(), "recovered from parse errors");
        }

        let tree = document.tree_mut();
        let recording = tree.is_mutation_recording();
        tree.set_mutation_recording(false);
        let root = tree.root();
        let converted = self.convert_node(&dom.document, tree, root);
        tree.set_mutation_recording(recording);
        converted?;

        document.set_quirks_mode(quirks_mode(dom.quirks_mode.get()));
        tracing::debug!("Parsed {} nodes", document.tree().len());

        document.close();
        Ok(())
    }
}
