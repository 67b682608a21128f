//! Qualified-name validation
//!
//! Name grammar from XML 1.0 (fifth edition) and the "validate and
//! extract" algorithm used by namespaced element and attribute creation.

use crate::{DomError, DomResult};

pub const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Name split into its namespace parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedName {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
}

#[inline]
fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

#[inline]
fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// Check the `Name` production
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// Check the `QName` production for a string that already is a valid Name:
/// at most one colon, with non-empty parts on both sides.
pub fn is_valid_qualified_name(name: &str) -> bool {
    if !is_valid_name(name) {
        return false;
    }
    match name.split_once(':') {
        None => true,
        Some((prefix, local)) => {
            !prefix.is_empty() && !local.is_empty() && !local.contains(':')
        }
    }
}

/// Split `prefix:local` into its parts. No validation.
pub fn split_qualified_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Validate `qualified_name` against `namespace` and split it.
///
/// An empty namespace is treated as no namespace.
pub fn validate_and_extract(namespace: Option<&str>, qualified_name: &str) -> DomResult<ExtractedName> {
    let namespace = namespace.filter(|ns| !ns.is_empty());

    if !is_valid_name(qualified_name) {
        return Err(DomError::InvalidCharacter);
    }
    if !is_valid_qualified_name(qualified_name) {
        return Err(DomError::Namespace);
    }

    let (prefix, local_name) = split_qualified_name(qualified_name);

    if prefix.is_some() && namespace.is_none() {
        return Err(DomError::Namespace);
    }
    if prefix == Some("xml") && namespace != Some(XML_NAMESPACE) {
        return Err(DomError::Namespace);
    }
    if (qualified_name == "xmlns" || prefix == Some("xmlns")) && namespace != Some(XMLNS_NAMESPACE) {
        return Err(DomError::Namespace);
    }
    if namespace == Some(XMLNS_NAMESPACE) && qualified_name != "xmlns" && prefix != Some("xmlns") {
        return Err(DomError::Namespace);
    }

    Ok(ExtractedName {
        namespace: namespace.map(str::to_string),
        prefix: prefix.map(str::to_string),
        local_name: local_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("div"));
        assert!(is_valid_name("_x"));
        assert!(is_valid_name("svg:rect"));
        assert!(is_valid_name("a-b.c1"));
        assert!(is_valid_name("\u{e9}t\u{e9}"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1bad"));
        assert!(!is_valid_name("-x"));
        assert!(!is_valid_name("a b"));
        assert!(!is_valid_name("a<b"));
    }

    #[test]
    fn test_qualified_names() {
        assert!(is_valid_qualified_name("a:b"));
        assert!(!is_valid_qualified_name(":b"));
        assert!(!is_valid_qualified_name("a:"));
        assert!(!is_valid_qualified_name("a:b:c"));
    }

    #[test]
    fn test_extract_prefix_and_local() {
        let name = validate_and_extract(Some(SVG_NAMESPACE), "s:rect").unwrap();
        assert_eq!(name.prefix.as_deref(), Some("s"));
        assert_eq!(name.local_name, "rect");
        assert_eq!(name.namespace.as_deref(), Some(SVG_NAMESPACE));
    }

    #[test]
    fn test_empty_namespace_is_null() {
        let name = validate_and_extract(Some(""), "plain").unwrap();
        assert_eq!(name.namespace, None);
        assert_eq!(validate_and_extract(Some(""), "p:plain"), Err(DomError::Namespace));
    }

    #[test]
    fn test_xml_prefix_rules() {
        assert_eq!(validate_and_extract(Some("urn:x"), "xml:lang"), Err(DomError::Namespace));
        assert!(validate_and_extract(Some(XML_NAMESPACE), "xml:lang").is_ok());
    }

    #[test]
    fn test_xmlns_rules() {
        assert_eq!(validate_and_extract(Some("urn:x"), "xmlns"), Err(DomError::Namespace));
        assert_eq!(validate_and_extract(Some("urn:x"), "xmlns:a"), Err(DomError::Namespace));
        assert_eq!(validate_and_extract(Some(XMLNS_NAMESPACE), "a:b"), Err(DomError::Namespace));
        assert_eq!(validate_and_extract(Some(XMLNS_NAMESPACE), "foo"), Err(DomError::Namespace));
        assert!(validate_and_extract(Some(XMLNS_NAMESPACE), "xmlns").is_ok());
        assert!(validate_and_extract(Some(XMLNS_NAMESPACE), "xmlns:a").is_ok());
    }

    #[test]
    fn test_name_grammar_checked_first() {
        assert_eq!(validate_and_extract(Some(HTML_NAMESPACE), "1a:b"), Err(DomError::InvalidCharacter));
        assert_eq!(validate_and_extract(Some(HTML_NAMESPACE), "a::b"), Err(DomError::Namespace));
    }
}
