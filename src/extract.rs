//! Content root selection
//!
//! `auto` mode prefers explicit semantic tags and only falls back to the
//! text-volume heuristic when the page has neither `<article>` nor `<main>`.
//! The fallback compares raw trimmed text length: hidden elements and
//! `<script>` text are counted because the page is never rendered.

use crate::config::ExtractMode;
use crate::dom::element::{attr, is_tag, tag_name, text_content};
use crate::dom::{NodeRef, ParsedDocument, resolve_by_css, resolve_by_xpath};

/// Class substrings that disqualify a text-volume candidate
pub const BOILERPLATE_CLASS_TOKENS: [&str; 5] = ["nav", "menu", "sidebar", "footer", "header"];

/// Tags considered by the text-volume fallback
const CANDIDATE_TAGS: [&str; 3] = ["div", "section", "body"];

/// Pick the content root for `mode`.
///
/// `content_path` is the CSS selector or XPath for the explicit modes and is
/// ignored in `auto` mode. `None` means nothing matched, which is an
/// ordinary outcome.
pub fn extract<'a>(
    document: &'a ParsedDocument,
    mode: ExtractMode,
    content_path: Option<&str>,
) -> Option<NodeRef<'a>> {
    let root = match mode {
        ExtractMode::Auto => extract_auto(document),
        ExtractMode::Css => content_path.and_then(|path| resolve_by_css(document, path)),
        ExtractMode::Xpath => content_path.and_then(|path| resolve_by_xpath(document, path)),
    };

    match &root {
        Some(node) => log::debug!(
            "Content root for {} mode: <{}>",
            mode,
            tag_name(node).unwrap_or_default()
        ),
        None => log::debug!("No content root found in {} mode", mode),
    }

    root
}

/// Heuristic content detection: first `<article>`, else first `<main>`, else
/// the non-boilerplate `div`/`section`/`body` with the most text
pub fn extract_auto(document: &ParsedDocument) -> Option<NodeRef<'_>> {
    let elements = document.elements();

    if let Some(article) = elements.iter().find(|el| is_tag(el, "article")) {
        return Some(article.clone());
    }
    if let Some(main) = elements.iter().find(|el| is_tag(el, "main")) {
        return Some(main.clone());
    }

    let mut best: Option<&NodeRef> = None;
    let mut best_len = 0;

    for candidate in &elements {
        let is_candidate = tag_name(candidate).is_some_and(|tag| CANDIDATE_TAGS.contains(&tag.as_str()));
        if !is_candidate || is_boilerplate(candidate) {
            continue;
        }

        let len = text_content(candidate).trim().chars().count();
        if len > best_len {
            best_len = len;
            best = Some(candidate);
        }
    }

    best.cloned()
}

/// Whether the element's class attribute marks it as navigation or chrome
pub fn is_boilerplate(node: &NodeRef) -> bool {
    let class = attr(node, "class").unwrap_or_default().to_lowercase();
    BOILERPLATE_CLASS_TOKENS.iter().any(|token| class.contains(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::element::{element_id, outer_html};

    fn parse(html: &str) -> ParsedDocument {
        ParsedDocument::parse(html, "https://example.com/").unwrap()
    }

    fn chosen_id(doc: &ParsedDocument) -> Option<String> {
        extract_auto(doc).and_then(|el| element_id(&el))
    }

    #[test]
    fn test_article_wins_regardless_of_text_volume() {
        let long = "word ".repeat(500);
        let doc = parse(&format!(
            r#"<body><div id="big">{}</div><main id="m">short</main><article id="a1">tiny</article><article id="a2">x</article></body>"#,
            long
        ));
        assert_eq!(chosen_id(&doc).as_deref(), Some("a1"));
    }

    #[test]
    fn test_main_when_no_article() {
        let doc = parse(r#"<body><div id="big">lots and lots of text</div><main id="m">m</main></body>"#);
        assert_eq!(chosen_id(&doc).as_deref(), Some("m"));
    }

    #[test]
    fn test_largest_text_block() {
        let doc = parse(
            r#"<body class="layout-nav"><div id="a">short</div><section id="b">a much longer block of text</section></body>"#,
        );
        assert_eq!(chosen_id(&doc).as_deref(), Some("b"));
    }

    #[test]
    fn test_nested_wrapper_with_same_text_loses_tie_to_outer() {
        let doc = parse(r#"<body class="x-header"><div id="outer"><div id="inner">same text</div></div></body>"#);
        assert_eq!(chosen_id(&doc).as_deref(), Some("outer"));
    }

    #[test]
    fn test_ties_go_to_document_order() {
        let doc = parse(r#"<body class="menu"><div id="first">12345</div><div id="second">abcde</div></body>"#);
        assert_eq!(chosen_id(&doc).as_deref(), Some("first"));
    }

    #[test]
    fn test_boilerplate_classes_are_skipped_case_insensitively() {
        let doc = parse(
            r#"<body class="page-Header"><div id="n" class="TopNavBar">navigation with the most text by far</div><div id="f" class="site-FOOTER">footer footer footer footer</div><div id="c">content</div></body>"#,
        );
        assert_eq!(chosen_id(&doc).as_deref(), Some("c"));
    }

    #[test]
    fn test_nothing_qualifies() {
        let doc = parse(r#"<body class="sidebar"><div class="menu">links</div><p>loose text</p></body>"#);
        assert!(extract_auto(&doc).is_none());
    }

    #[test]
    fn test_body_is_a_candidate() {
        let doc = parse("<body><p>only paragraphs</p></body>");
        let root = extract_auto(&doc).unwrap();
        assert!(is_tag(&root, "body"));
    }

    #[test]
    fn test_explicit_modes() {
        let doc = parse(r#"<body><div class="post"><p id="p1">x</p></div></body>"#);

        let by_css = extract(&doc, ExtractMode::Css, Some("div.post")).unwrap();
        assert_eq!(outer_html(&by_css), r#"<div class="post"><p id="p1">x</p></div>"#);

        let by_xpath = extract(&doc, ExtractMode::Xpath, Some(r#"//*[@id="p1"]"#)).unwrap();
        assert_eq!(element_id(&by_xpath).as_deref(), Some("p1"));

        assert!(extract(&doc, ExtractMode::Css, Some("article")).is_none());
        assert!(extract(&doc, ExtractMode::Css, Some("::bogus((")).is_none());
        assert!(extract(&doc, ExtractMode::Xpath, None).is_none());
    }

    #[test]
    fn test_is_boilerplate() {
        let doc = parse(r#"<body><div class="Main-Menu">x</div><div class="content">y</div></body>"#);
        let divs: Vec<_> = doc.elements().into_iter().filter(|el| is_tag(el, "div")).collect();
        assert!(is_boilerplate(&divs[0]));
        assert!(!is_boilerplate(&divs[1]));
    }
}
