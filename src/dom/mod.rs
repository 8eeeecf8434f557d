//! Parsed page model and locators
//!
//! This module provides the host-side view of a fetched page:
//! - ParsedDocument: the parsed HTML tree anchored at the page URL
//! - element: tag/attribute/position helpers shared by the other modules
//! - locator: CSS path and XPath generation and resolution
//! - xpath: the XPath subset evaluator used by the locator

pub mod element;
pub mod locator;
pub mod xpath;

pub use dom_query::NodeRef;
pub use locator::{Locator, build_css_path, build_xpath, resolve_by_css, resolve_by_xpath};

use crate::error::{ClipError, Result};
use dom_query::Document;
use url::Url;

/// An HTML page parsed into a tree, plus the URL relative references resolve against
pub struct ParsedDocument {
    document: Document,
    base_url: Url,
}

impl ParsedDocument {
    /// Parse raw HTML fetched from `base_url`
    pub fn parse(html: &str, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ClipError::InvalidRequest(format!("Invalid URL '{}': {}", base_url, e)))?;

        Ok(Self {
            document: Document::from(html),
            base_url,
        })
    }

    /// Parse raw HTML with an already validated base URL
    pub fn with_base(html: &str, base_url: Url) -> Self {
        Self {
            document: Document::from(html),
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The document node (parent of `<html>`)
    pub fn root(&self) -> NodeRef<'_> {
        self.document.root()
    }

    /// Every element in document order
    pub fn elements(&self) -> Vec<NodeRef<'_>> {
        element::descendant_elements(&self.root())
    }

    /// First element with the given tag in document order
    pub fn first_by_tag(&self, tag: &str) -> Option<NodeRef<'_>> {
        element::first_by_tag(&self.root(), tag)
    }

    /// Trimmed text of the first `<title>`, empty when there is none
    pub fn title(&self) -> String {
        self.first_by_tag("title")
            .map(|title| element::text_content(&title).trim().to_string())
            .unwrap_or_default()
    }

    /// Resolve a possibly relative reference against the page URL
    pub fn resolve_url(&self, reference: &str) -> Option<Url> {
        self.base_url.join(reference).ok()
    }
}
