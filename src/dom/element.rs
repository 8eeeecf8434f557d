//! Helpers over `dom_query` nodes
//!
//! The locator engine and the extraction heuristic only need a handful of
//! element queries (tag, id, classes, same-tag position, text). They live here
//! so both agree on the details, e.g. that an empty `id` attribute counts as
//! no id at all.

use dom_query::{NodeRef, Selection};

/// Lowercase tag name of an element node, `None` for any other node kind
pub fn tag_name(node: &NodeRef) -> Option<String> {
    if !node.is_element() {
        return None;
    }
    node.node_name().map(|name| name.to_ascii_lowercase())
}

/// Check if the node is an element with the given tag
pub fn is_tag(node: &NodeRef, tag: &str) -> bool {
    tag_name(node).is_some_and(|name| name.eq_ignore_ascii_case(tag))
}

/// Get attribute value by name
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.attr(name).map(|value| value.to_string())
}

/// Non-empty `id` attribute
pub fn element_id(node: &NodeRef) -> Option<String> {
    attr(node, "id").filter(|id| !id.is_empty())
}

/// Class tokens in authored order
pub fn class_tokens(node: &NodeRef) -> Vec<String> {
    attr(node, "class")
        .map(|classes| classes.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Element children, skipping text, comment and doctype nodes
pub fn element_children<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.children()
        .into_iter()
        .filter(|child| child.is_element())
        .collect()
}

/// 1-based position of `node` among its parent's children with the same tag,
/// together with the number of such children.
///
/// A node without a parent is alone: `(1, 1)`.
pub fn same_tag_position(node: &NodeRef) -> (usize, usize) {
    let Some(parent) = node.parent() else {
        return (1, 1);
    };
    let tag = tag_name(node);

    let mut position = 1;
    let mut count = 0;
    for sibling in element_children(&parent) {
        if tag_name(&sibling) != tag {
            continue;
        }
        count += 1;
        if sibling.id == node.id {
            position = count;
        }
    }

    (position, count.max(1))
}

/// All element descendants of `node` in document order, excluding `node`
pub fn descendant_elements<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    let mut out = Vec::new();
    collect_descendants(node, &mut out);
    out
}

fn collect_descendants<'a>(node: &NodeRef<'a>, out: &mut Vec<NodeRef<'a>>) {
    for child in element_children(node) {
        out.push(child.clone());
        collect_descendants(&child, out);
    }
}

/// `node` itself (if an element) followed by its element descendants
pub fn self_and_descendants<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    let mut out = Vec::new();
    if node.is_element() {
        out.push(node.clone());
    }
    collect_descendants(node, &mut out);
    out
}

/// First element with the given tag at or below `node`
pub fn first_by_tag<'a>(node: &NodeRef<'a>, tag: &str) -> Option<NodeRef<'a>> {
    self_and_descendants(node)
        .into_iter()
        .find(|candidate| is_tag(candidate, tag))
}

/// Concatenated text of all descendant text nodes
pub fn text_content(node: &NodeRef) -> String {
    node.text().to_string()
}

/// Serialized markup of the node including its own tag
pub fn outer_html(node: &NodeRef) -> String {
    Selection::from(node.clone()).html().to_string()
}

/// Identity comparison within one document
pub fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    a.id == b.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_query::Document;

    fn first<'a>(doc: &'a Document, tag: &str) -> NodeRef<'a> {
        first_by_tag(&doc.root(), tag).unwrap()
    }

    #[test]
    fn test_tag_and_attributes() {
        let doc = Document::from(r#"<div id="main" class="post  wide featured">x</div>"#);
        let div = first(&doc, "div");

        assert_eq!(tag_name(&div).as_deref(), Some("div"));
        assert!(is_tag(&div, "DIV"));
        assert_eq!(element_id(&div).as_deref(), Some("main"));
        assert_eq!(class_tokens(&div), vec!["post", "wide", "featured"]);
    }

    #[test]
    fn test_empty_id_is_no_id() {
        let doc = Document::from(r#"<p id="">x</p>"#);
        assert!(element_id(&first(&doc, "p")).is_none());
    }

    #[test]
    fn test_same_tag_position() {
        let doc = Document::from("<body><p>a</p><div>b</div><p>c</p><span>d</span></body>");
        let body = first(&doc, "body");
        let children = element_children(&body);

        assert_eq!(same_tag_position(&children[0]), (1, 2));
        assert_eq!(same_tag_position(&children[1]), (1, 1));
        assert_eq!(same_tag_position(&children[2]), (2, 2));
        assert_eq!(same_tag_position(&children[3]), (1, 1));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let doc = Document::from("<body><div><p>a</p></div><section>b</section></body>");
        let body = first(&doc, "body");
        let tags: Vec<_> = descendant_elements(&body)
            .iter()
            .filter_map(tag_name)
            .collect();

        assert_eq!(tags, vec!["div", "p", "section"]);
    }

    #[test]
    fn test_text_and_html() {
        let doc = Document::from("<body><p>Hello <b>world</b></p></body>");
        let p = first(&doc, "p");

        assert_eq!(text_content(&p), "Hello world");
        assert_eq!(outer_html(&p), "<p>Hello <b>world</b></p>");
        assert!(same_node(&p, &first(&doc, "p")));
        assert!(!same_node(&p, &first(&doc, "b")));
    }
}
