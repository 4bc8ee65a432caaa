use scraper::{ElementRef, Html, Selector};

use crate::dom;

const MAX_SIBLING_PROBES: usize = 4;
const MAX_ANCESTOR_LEVELS: usize = 7;
const MAX_LABEL_LEN: usize = 140;

/// Classes that mark an element as carrying a control's caption.
const LABELISH_CLASS_HINTS: &[&str] = &["label", "title", "heading", "question"];

/// Classes that mark an ancestor as the control's own field wrapper.
const CONTAINER_CLASS_HINTS: &[&str] = &["field", "form-group", "form_group", "question"];

/// Returns the best human-readable label for one form control, or empty.
///
/// ATS vendors place captions in wildly different structural positions, so
/// this is an ordered, bounded fallback chain; an unbounded search would risk
/// picking up unrelated page text.
pub fn resolve_label(doc: &Html, control: ElementRef) -> String {
    wrapping_label(control)
        .or_else(|| for_associated_label(doc, control))
        .or_else(|| aria_referenced_label(doc, control))
        .or_else(|| container_label(control))
        .or_else(|| preceding_sibling_label(control))
        .or_else(|| ancestor_descendant_label(control))
        .unwrap_or_default()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Step 1: a `<label>` element wrapping the control.
fn wrapping_label(control: ElementRef) -> Option<String> {
    control
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "label")
        .and_then(|label| non_empty(dom::element_text(label)))
}

/// Step 2: an explicit `label[for=<id>]` association.
fn for_associated_label(doc: &Html, control: ElementRef) -> Option<String> {
    let id = control.value().attr("id")?.trim();
    if id.is_empty() {
        return None;
    }
    // Matching by attribute comparison instead of a built selector: ids on
    // third-party pages routinely contain characters that break selectors.
    let label_sel = Selector::parse("label").ok()?;
    doc.select(&label_sel)
        .find(|label| label.value().attr("for") == Some(id))
        .and_then(|label| non_empty(dom::element_text(label)))
}

/// Step 3: `aria-labelledby` references, joined in reference order.
fn aria_referenced_label(doc: &Html, control: ElementRef) -> Option<String> {
    let refs = control.value().attr("aria-labelledby")?;
    let ids: Vec<&str> = refs.split_whitespace().collect();
    if ids.is_empty() {
        return None;
    }
    let id_sel = Selector::parse("[id]").ok()?;
    let mut parts = Vec::new();
    for id in ids {
        if let Some(referenced) = doc
            .select(&id_sel)
            .find(|element| element.value().attr("id") == Some(id))
        {
            let text = dom::element_text(referenced);
            if !text.is_empty() {
                parts.push(text);
            }
        }
    }
    non_empty(parts.join(" "))
}

/// Step 4: the nearest structural container (list item, fieldset, or a
/// wrapper whose class hints "field"), searched for a caption child.
fn container_label(control: ElementRef) -> Option<String> {
    let container = control
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| is_field_container(*ancestor))?;

    // Prefer a real legend/label descendant over class-hint matches.
    let caption = container
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| matches!(element.value().name(), "legend" | "label"))
        .or_else(|| {
            container
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|element| !is_form_control(element.value().name()))
                .find(|element| has_class_hint(*element, LABELISH_CLASS_HINTS))
        })?;
    non_empty(dom::element_text(caption))
}

fn is_field_container(element: ElementRef) -> bool {
    matches!(element.value().name(), "li" | "fieldset")
        || has_class_hint(element, CONTAINER_CLASS_HINTS)
}

/// Step 5: up to four preceding siblings, accepted only if label-like and
/// short.
fn preceding_sibling_label(control: ElementRef) -> Option<String> {
    for sibling in control
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .take(MAX_SIBLING_PROBES)
    {
        if is_form_control(sibling.value().name()) {
            continue;
        }
        // An explicit label/legend tag or labelish class qualifies outright;
        // anything else qualifies as short generic text. The length cap
        // applies in every case.
        let text = dom::element_text(sibling);
        if !text.is_empty() && text.len() <= MAX_LABEL_LEN {
            return Some(text);
        }
    }
    None
}

/// Step 6: walk up a bounded number of levels looking for any label
/// descendant.
fn ancestor_descendant_label(control: ElementRef) -> Option<String> {
    for ancestor in control
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(MAX_ANCESTOR_LEVELS)
    {
        if let Some(label) = ancestor
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == "label")
        {
            let text = dom::element_text(label);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn is_form_control(name: &str) -> bool {
    matches!(
        name,
        "input" | "select" | "textarea" | "button" | "option" | "optgroup"
    )
}

fn has_class_hint(element: ElementRef, hints: &[&str]) -> bool {
    let Some(class) = element.value().attr("class") else {
        return false;
    };
    let class = class.to_ascii_lowercase();
    hints.iter().any(|hint| class.contains(hint))
}
