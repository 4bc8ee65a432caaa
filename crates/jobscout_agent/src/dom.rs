use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Collapses all runs of whitespace to single spaces and trims the ends.
pub(crate) fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-normalized text content of one element subtree.
pub(crate) fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Visible page text, capped at `max_len` characters on a char boundary.
/// Scripting and presentation-only subtrees contribute nothing.
pub(crate) fn visible_text(doc: &Html, max_len: usize) -> String {
    let mut raw = String::new();
    // Gather a little more than needed so collapsing cannot undershoot.
    let raw_budget = max_len.saturating_mul(2).saturating_add(1024);
    for child in doc.root_element().children() {
        if raw.len() >= raw_budget {
            break;
        }
        collect_visible(child, &mut raw, raw_budget);
    }
    truncate_on_char_boundary(collapse_whitespace(&raw), max_len)
}

fn collect_visible(node: NodeRef<'_, Node>, out: &mut String, budget: usize) {
    if out.len() >= budget {
        return;
    }
    match node.value() {
        Node::Text(text) => {
            out.push_str(text);
            out.push(' ');
        }
        Node::Element(element) => {
            if matches!(
                element.name(),
                "script" | "style" | "noscript" | "template" | "iframe" | "head"
            ) {
                return;
            }
            for child in node.children() {
                collect_visible(child, out, budget);
            }
        }
        _ => {}
    }
}

/// Truncates defensively rather than rejecting very large pages.
pub(crate) fn truncate_on_char_boundary(mut text: String, max_len: usize) -> String {
    if text.len() <= max_len {
        return text;
    }
    let mut end = max_len;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text
}
