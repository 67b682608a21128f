//! NamedNodeMap tests for fos-dom
//!
//! Exclusive ownership of attribute nodes and the change pipeline as seen
//! through a document.

use std::cell::RefCell;
use std::rc::Rc;

use fos_dom::names::XML_NAMESPACE;
use fos_dom::*;

fn two_divs() -> (Document, NodeId, NodeId) {
    let mut doc = Document::new();
    let a = doc.create_element("div").unwrap();
    let b = doc.create_element("div").unwrap();
    (doc, a, b)
}

// ============================================================================
// OWNERSHIP TESTS
// ============================================================================

#[test]
fn test_attr_in_use_by_other_element() {
    let (mut doc, a, b) = two_divs();
    let attr = doc.create_attribute("title").unwrap();
    let tree = doc.tree_mut();

    assert_eq!(tree.set_named_item(a, attr), Ok(None));
    assert_eq!(tree.attr(attr).unwrap().owner_element(), Some(a));
    assert_eq!(tree.set_named_item(b, attr), Err(DomError::InUseAttribute));
    assert!(!tree.has_attribute(b, "title"));

    tree.remove_named_item(a, "title").unwrap();
    assert_eq!(tree.set_named_item(b, attr), Ok(None));
    assert_eq!(tree.attr(attr).unwrap().owner_element(), Some(b));
}

#[test]
fn test_set_named_item_ns_replaces_same_key() {
    let (mut doc, a, _) = two_divs();
    let first = doc.create_attribute_ns(Some(XML_NAMESPACE), "xml:lang").unwrap();
    let second = doc.create_attribute_ns(Some(XML_NAMESPACE), "xml:lang").unwrap();
    let tree = doc.tree_mut();
    tree.set_attr_value(first, "en").unwrap();
    tree.set_attr_value(second, "fr").unwrap();

    tree.set_named_item_ns(a, first).unwrap();
    let displaced = tree.set_named_item_ns(a, second).unwrap();

    assert_eq!(displaced, Some(first));
    assert_eq!(tree.attr(first).unwrap().owner_element(), None);
    assert_eq!(tree.attributes(a).unwrap().length(), 1);
    assert_eq!(tree.get_attribute_ns(a, Some(XML_NAMESPACE), "lang"), Some("fr"));
    assert_eq!(tree.get_named_item(a, "xml:lang"), Some(second));
}

#[test]
fn test_set_named_item_replaces_other_prefix() {
    let (mut doc, a, _) = two_divs();
    let first = doc.create_attribute_ns(Some("urn:x"), "a:k").unwrap();
    let second = doc.create_attribute_ns(Some("urn:x"), "b:k").unwrap();
    let tree = doc.tree_mut();
    tree.set_attr_value(first, "1").unwrap();
    tree.set_attr_value(second, "2").unwrap();

    assert_eq!(tree.set_named_item(a, first), Ok(None));
    assert_eq!(tree.set_named_item(a, second), Ok(Some(first)));

    assert_eq!(tree.attributes(a).unwrap().length(), 1);
    assert_eq!(tree.get_attribute_ns(a, Some("urn:x"), "k"), Some("2"));
    assert_eq!(tree.get_named_item(a, "a:k"), None);
    assert_eq!(tree.attr(first).unwrap().owner_element(), None);
}

#[test]
fn test_set_named_item_keeps_distinct_namespaces() {
    let (mut doc, a, _) = two_divs();
    let x = doc.create_attribute_ns(Some("urn:x"), "p:k").unwrap();
    let y = doc.create_attribute_ns(Some("urn:y"), "q:k").unwrap();
    let tree = doc.tree_mut();

    tree.set_named_item(a, x).unwrap();
    assert_eq!(tree.set_named_item(a, y), Ok(None));
    assert_eq!(tree.attributes(a).unwrap().length(), 2);
}

#[test]
fn test_remove_ns_missing() {
    let (mut doc, a, _) = two_divs();
    let tree = doc.tree_mut();
    assert_eq!(
        tree.remove_named_item_ns(a, Some(XML_NAMESPACE), "lang"),
        Err(DomError::NotFound)
    );
    assert_eq!(tree.try_remove_named_item_ns(a, Some(XML_NAMESPACE), "lang"), None);
}

#[test]
fn test_items_keep_insertion_order() {
    let (mut doc, a, _) = two_divs();
    let tree = doc.tree_mut();
    for name in ["z", "y", "x"] {
        tree.set_attribute(a, name, name).unwrap();
    }
    let map = tree.attributes(a).unwrap();
    let names: Vec<&str> = map
        .items()
        .map(|id| tree.attr(id).unwrap().local_name())
        .collect();
    assert_eq!(names, vec!["z", "y", "x"]);
    assert_eq!(map.item(1), tree.get_named_item(a, "y"));
    assert_eq!(map.item(3), None);
}

// ============================================================================
// NOTIFICATION TESTS
// ============================================================================

#[test]
fn test_pipeline_records_old_values() {
    let (mut doc, a, _) = two_divs();
    let tree = doc.tree_mut();
    tree.set_mutation_recording(true);

    tree.set_attribute(a, "class", "one").unwrap();
    tree.set_attribute(a, "class", "two").unwrap();
    tree.remove_attribute(a, "class");

    let records = tree.take_mutation_records();
    let old: Vec<Option<&str>> = records.iter().map(|r| r.old_value.as_deref()).collect();
    assert_eq!(old, vec![None, Some("one"), Some("two")]);
    assert!(records.iter().all(|r| r.mutation_type == MutationType::Attributes));
    assert!(records.iter().all(|r| r.target == a));
}

#[test]
fn test_handler_sees_removal_as_none() {
    let (mut doc, a, _) = two_divs();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let tree = doc.tree_mut();
    tree.attributes_mut(a).unwrap().add_handler("hidden", move |_, _, value| {
        sink.borrow_mut().push(value.map(str::to_string));
    });

    tree.set_attribute(a, "hidden", "").unwrap();
    tree.remove_attribute(a, "hidden");

    assert_eq!(*seen.borrow(), vec![Some(String::new()), None]);
}

#[test]
fn test_handler_can_mirror_into_other_attribute() {
    let (mut doc, a, _) = two_divs();
    let tree = doc.tree_mut();
    tree.attributes_mut(a).unwrap().add_handler("value", |tree, element, value| {
        let _ = tree.set_attribute(element, "data-mirror", value.unwrap_or(""));
    });

    tree.set_attribute(a, "value", "42").unwrap();
    assert_eq!(tree.get_attribute(a, "data-mirror"), Some("42"));
}

#[test]
fn test_remove_handler_returns_registered() {
    let (mut doc, a, _) = two_divs();
    let map = doc.tree_mut().attributes_mut(a).unwrap();
    map.add_handler("x", |_, _, _| {});
    map.add_handler("x", |_, _, _| {});
    assert!(map.has_handler("x"));
    assert_eq!(map.remove_handler("x").len(), 2);
    assert!(!map.has_handler("x"));
    assert!(map.remove_handler("x").is_empty());
}

#[test]
fn test_cloned_element_keeps_values_not_ownership() {
    let (mut doc, a, _) = two_divs();
    let tree = doc.tree_mut();
    tree.set_attribute(a, "id", "orig").unwrap();
    let copy = tree.clone_node(a, false).unwrap();

    let original_attr = tree.get_named_item(a, "id").unwrap();
    let copied_attr = tree.get_named_item(copy, "id").unwrap();
    assert_ne!(original_attr, copied_attr);
    assert_eq!(tree.attr(copied_attr).unwrap().owner_element(), Some(copy));

    tree.set_attribute(copy, "id", "copy").unwrap();
    assert_eq!(tree.get_attribute(a, "id"), Some("orig"));
}
