use crate::config::ExtractMode;
use crate::dom::ParsedDocument;
use crate::dom::element::{class_tokens, element_id, same_tag_position, tag_name};
use crate::dom::xpath::XPathExpr;
use dom_query::NodeRef;
use serde::{Deserialize, Serialize};

/// Maximum number of segments in a generated CSS path
pub const CSS_MAX_DEPTH: usize = 8;

/// Maximum number of steps in a generated XPath
pub const XPATH_MAX_DEPTH: usize = 12;

/// A CSS path and an XPath that each identify one element of a loaded page
///
/// Locators are computed against one document instance; the same URL may
/// lay out differently on the next load.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Locator {
    /// CSS selector for the element
    pub css: String,

    /// XPath expression for the element
    pub xpath: String,
}

impl Locator {
    pub fn new(css: impl Into<String>, xpath: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            xpath: xpath.into(),
        }
    }

    /// Compute both locators for an element
    pub fn for_element(element: &NodeRef) -> Self {
        Self {
            css: build_css_path(element),
            xpath: build_xpath(element),
        }
    }

    /// The expression an extraction in `mode` should use
    pub fn for_mode(&self, mode: ExtractMode) -> Option<&str> {
        match mode {
            ExtractMode::Auto => None,
            ExtractMode::Css => Some(&self.css),
            ExtractMode::Xpath => Some(&self.xpath),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.xpath.is_empty()
    }
}

/// Build a CSS path for `element`.
///
/// Walks from the element towards the root and stops at the first ancestor
/// carrying an id, after [`CSS_MAX_DEPTH`] segments, or below `<html>`
/// (`<html>` itself only appears as the path of the root element).
/// Each segment is `tag`, up to two classes, and `:nth-of-type(k)` when the
/// parent has several children with the same tag.
pub fn build_css_path(element: &NodeRef) -> String {
    if !element.is_element() {
        return String::new();
    }
    if let Some(id) = element_id(element) {
        return format!("#{}", css_escape(&id));
    }

    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(element.clone());

    while let Some(node) = current {
        let Some(tag) = tag_name(&node) else {
            break;
        };
        if tag == "html" && !parts.is_empty() {
            break;
        }

        if let Some(id) = element_id(&node) {
            parts.push(format!("#{}", css_escape(&id)));
            break;
        }

        let mut part = tag;
        for class in class_tokens(&node).iter().take(2) {
            part.push('.');
            part.push_str(&css_escape(class));
        }

        let (position, count) = same_tag_position(&node);
        if count > 1 {
            part.push_str(&format!(":nth-of-type({})", position));
        }

        parts.push(part);
        if parts.len() >= CSS_MAX_DEPTH {
            break;
        }
        current = node.parent();
    }

    parts.reverse();
    parts.join(" > ")
}

/// Build an XPath for `element`.
///
/// An element with an id short-circuits to `//*[@id="..."]`. Otherwise each
/// level emits `/tag[k]` with `k` counted among same-tag siblings, up to the
/// `<html>` root. A walk cut off by [`XPATH_MAX_DEPTH`] is emitted as a
/// descendant path (`//...`).
pub fn build_xpath(element: &NodeRef) -> String {
    if !element.is_element() {
        return String::new();
    }
    if let Some(id) = element_id(element) {
        return format!("//*[@id={}]", xpath_literal(&id));
    }

    let mut parts: Vec<String> = Vec::new();
    let mut truncated = false;
    let mut current = Some(element.clone());

    while let Some(node) = current {
        let Some(tag) = tag_name(&node) else {
            break;
        };
        let Some(parent) = node.parent() else {
            break;
        };

        let (position, _) = same_tag_position(&node);
        parts.push(format!("/{}[{}]", tag, position));

        if parts.len() >= XPATH_MAX_DEPTH {
            truncated = parent.is_element();
            break;
        }
        current = Some(parent);
    }

    if parts.is_empty() {
        return String::new();
    }

    parts.reverse();
    let path = parts.concat();
    if truncated { format!("/{}", path) } else { path }
}

/// Find the first element matching a CSS selector.
///
/// Empty or malformed selectors yield `None`, same as no match.
pub fn resolve_by_css<'a>(document: &'a ParsedDocument, selector: &str) -> Option<NodeRef<'a>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }

    let selection = document.document().try_select(selector)?;
    selection.nodes().first().cloned()
}

/// Find the first element (in document order) matching an XPath expression.
///
/// Empty, malformed or unsupported expressions yield `None`.
pub fn resolve_by_xpath<'a>(document: &'a ParsedDocument, expression: &str) -> Option<NodeRef<'a>> {
    let expression = expression.trim();
    if expression.is_empty() {
        return None;
    }

    match XPathExpr::parse(expression) {
        Some(xpath) => xpath.first(&document.root()),
        None => {
            log::debug!("Unsupported or malformed XPath: {}", expression);
            None
        }
    }
}

/// Escape an identifier for use in a CSS selector (the `CSS.escape` rules)
pub fn css_escape(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len());

    for (i, &c) in chars.iter().enumerate() {
        let code = c as u32;
        if c == '\0' {
            out.push('\u{FFFD}');
        } else if (0x01..=0x1f).contains(&code)
            || code == 0x7f
            || (i == 0 && c.is_ascii_digit())
            || (i == 1 && c.is_ascii_digit() && chars[0] == '-')
        {
            out.push_str(&format!("\\{:x} ", code));
        } else if i == 0 && c == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }

    out
}

/// Quote a string as an XPath literal
pub fn xpath_literal(value: &str) -> String {
    if value.contains('"') {
        format!("'{}'", value)
    } else {
        format!("\"{}\"", value)
    }
}
