//! HTML to markdown conversion
//!
//! Generic markup goes through `html2md`. Preformatted blocks are taken out
//! before that pass and put back afterwards as fenced code, so their text is
//! never run through inline-markup escaping.

use crate::dom::element::{first_by_tag, text_content};
use dom_query::{Document, NodeRef, Selection};

const PLACEHOLDER_PREFIX: &str = "URLCLIPPERPREBLOCK";

fn placeholder(index: usize) -> String {
    format!("{}{}END", PLACEHOLDER_PREFIX, index)
}

/// Convert an HTML fragment to markdown
pub fn convert(markup: &str) -> String {
    let document = Document::from(markup);
    let blocks = take_preformatted(&document);

    let mut output = html2md::parse_html(&document.html());
    let mut cursor = 0;

    for (index, code) in blocks.iter().enumerate() {
        let token = placeholder(index);
        let Some(found) = output[cursor..].find(&token) else {
            log::debug!("Preformatted block {} vanished during conversion", index);
            continue;
        };
        let start = cursor + found;
        let end = start + token.len();

        let line_start = output[..start].rfind('\n').map_or(0, |idx| idx + 1);
        let prefix = &output[line_start..start];

        let rebuilt = if prefix.is_empty() {
            let before = output[..start].trim_end_matches('\n');
            let lead = if before.is_empty() { "" } else { "\n\n" };
            format!("{}{}{}\n\n", before, lead, fence(code))
        } else {
            // inside a list item or blockquote: the fence opens on the marker line
            format!("{}{}", &output[..line_start], nested_fence(code, prefix))
        };
        let after = if prefix.is_empty() {
            output[end..].trim_start_matches('\n')
        } else {
            &output[end..]
        };

        cursor = rebuilt.len();
        output = rebuilt + after;
    }

    output
}

/// Fence whose first line follows `prefix` and whose other lines carry the
/// matching continuation: `>` markers repeat, list markers become spaces
fn nested_fence(code: &str, prefix: &str) -> String {
    let continuation: String = prefix
        .chars()
        .map(|c| if c == '>' { '>' } else { ' ' })
        .collect();

    let mut out = String::from(prefix);
    for (index, line) in fence(code).split('\n').enumerate() {
        if index > 0 {
            out.push('\n');
            out.push_str(&continuation);
        }
        out.push_str(line);
    }
    out
}

/// Replace each outermost `<pre>` with a placeholder paragraph and return
/// the code text of each, in document order
fn take_preformatted(document: &Document) -> Vec<String> {
    let pres: Vec<NodeRef> = document
        .select("pre")
        .nodes()
        .iter()
        .filter(|pre| !has_pre_ancestor(pre))
        .cloned()
        .collect();

    let mut blocks = Vec::with_capacity(pres.len());
    for pre in pres {
        blocks.push(preformatted_text(&pre));
        Selection::from(pre).replace_with_html(format!("<p>{}</p>", placeholder(blocks.len() - 1)));
    }
    blocks
}

fn has_pre_ancestor(node: &NodeRef) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.node_name().is_some_and(|name| name.eq_ignore_ascii_case("pre")) {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Text of the `<code>` inside a `<pre>` if present, else of the `<pre>`
/// itself, minus one trailing newline
fn preformatted_text(pre: &NodeRef) -> String {
    let text = match first_by_tag(pre, "code") {
        Some(code) => text_content(&code),
        None => text_content(pre),
    };
    text.strip_suffix('\n').map(str::to_string).unwrap_or(text)
}

/// Wrap code in a backtick fence longer than any backtick run it contains
/// (at least three)
pub fn fence(code: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in code.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }

    let marker = "`".repeat((longest + 1).max(3));
    format!("{}\n{}\n{}", marker, code, marker)
}
