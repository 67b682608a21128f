//! Element factories
//!
//! One factory per known namespace. A factory decides the element's
//! initial flags; anything outside HTML, SVG and MathML gets a plain
//! namespaced element.

use crate::names::{HTML_NAMESPACE, MATHML_NAMESPACE, SVG_NAMESPACE};
use crate::node::{ElementData, QualName};
use crate::NodeId;

/// HTML void elements, closed as soon as they are created
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Creates element data for one namespace
pub trait ElementFactory {
    fn namespace(&self) -> Option<&'static str>;

    fn create(&self, local_name: &str, prefix: Option<&str>) -> ElementData {
        ElementData::new(QualName::new(self.namespace(), prefix, local_name), NodeId::NONE)
    }
}

pub struct HtmlElementFactory;

impl HtmlElementFactory {
    pub fn is_void(local_name: &str) -> bool {
        VOID_ELEMENTS.contains(&local_name)
    }
}

impl ElementFactory for HtmlElementFactory {
    fn namespace(&self) -> Option<&'static str> {
        Some(HTML_NAMESPACE)
    }

    fn create(&self, local_name: &str, prefix: Option<&str>) -> ElementData {
        let mut element = ElementData::new(
            QualName::new(Some(HTML_NAMESPACE), prefix, local_name),
            NodeId::NONE,
        );
        element.self_closing = Self::is_void(local_name);
        element
    }
}

pub struct SvgElementFactory;

impl ElementFactory for SvgElementFactory {
    fn namespace(&self) -> Option<&'static str> {
        Some(SVG_NAMESPACE)
    }
}

pub struct MathMlElementFactory;

impl ElementFactory for MathMlElementFactory {
    fn namespace(&self) -> Option<&'static str> {
        Some(MATHML_NAMESPACE)
    }
}

/// Element in an arbitrary (or no) namespace
pub struct GenericElementFactory {
    namespace: Option<String>,
}

impl GenericElementFactory {
    pub fn new(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
        }
    }

    pub fn create(&self, local_name: &str, prefix: Option<&str>) -> ElementData {
        ElementData::new(
            QualName::new(self.namespace.as_deref(), prefix, local_name),
            NodeId::NONE,
        )
    }
}

/// Factory for a namespace URI, if it is one of the known families
pub fn factory_for(namespace: Option<&str>) -> Option<&'static dyn ElementFactory> {
    match namespace? {
        HTML_NAMESPACE => Some(&HtmlElementFactory),
        SVG_NAMESPACE => Some(&SvgElementFactory),
        MATHML_NAMESPACE => Some(&MathMlElementFactory),
        _ => None,
    }
}

/// Build element data through the matching factory
pub fn create_element_data(namespace: Option<&str>, prefix: Option<&str>, local_name: &str) -> ElementData {
    match factory_for(namespace) {
        Some(factory) => factory.create(local_name, prefix),
        None => GenericElementFactory::new(namespace).create(local_name, prefix),
    }
}
