use scraper::{ElementRef, Html, Selector};

use crate::label;

/// Element capability, computed once per control up front so the rest of the
/// pipeline never branches on ad hoc attribute presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Select,
    File,
    Unsupported,
}

/// Events dispatched after a value is set, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchedEvent {
    Input,
    Change,
    Blur,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Compatibility shim for a host framework's internal change tracker. The
/// framework's change detector compares the node value against
/// `last_value`; resetting it before a programmatic write keeps that
/// comparison truthful.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueTracker {
    pub last_value: String,
}

/// One form control lifted out of the document, with everything the
/// classifier and injector need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormControl {
    pub kind: ControlKind,
    pub dom_index: usize,
    pub id: String,
    pub name: String,
    pub input_type: String,
    pub label: String,
    pub aria_label: String,
    pub data_testid: String,
    pub data_qa: String,
    pub placeholder: String,
    pub autocomplete: String,
    pub disabled: bool,
    pub read_only: bool,
    pub options: Vec<SelectOption>,
    pub value: String,
    pub tracker: Option<ValueTracker>,
    pub events: Vec<DispatchedEvent>,
}

impl FormControl {
    pub fn editable(&self) -> bool {
        !self.disabled && !self.read_only
    }

    /// Stable identity used to carry state across document re-renders.
    /// Empty when the control has neither id nor name.
    pub fn identity_key(&self) -> String {
        if !self.id.is_empty() {
            format!("id:{}", self.id)
        } else if !self.name.is_empty() {
            format!("name:{}", self.name)
        } else {
            String::new()
        }
    }
}

/// Mutable form state scanned from one document version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormState {
    controls: Vec<FormControl>,
}

impl FormState {
    /// Scans every control on the page. Labels are resolved here, once,
    /// while the document tree is at hand.
    pub fn scan(doc: &Html) -> Self {
        let Ok(control_sel) = Selector::parse("input, textarea, select") else {
            return Self::default();
        };
        let tracked = framework_managed(doc);
        let controls = doc
            .select(&control_sel)
            .enumerate()
            .map(|(dom_index, element)| build_control(doc, element, dom_index, tracked))
            .collect();
        Self { controls }
    }

    pub fn controls(&self) -> &[FormControl] {
        &self.controls
    }

    pub(crate) fn controls_mut(&mut self) -> &mut [FormControl] {
        &mut self.controls
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Re-scans after a document mutation, carrying values and event logs
    /// over for controls with matching identity (a framework re-render keeps
    /// user-entered state).
    pub fn rebuild(&mut self, doc: &Html) {
        let mut fresh = Self::scan(doc);
        for control in &mut fresh.controls {
            let key = control.identity_key();
            if key.is_empty() {
                continue;
            }
            if let Some(prev) = self
                .controls
                .iter()
                .find(|prev| prev.identity_key() == key)
            {
                control.value = prev.value.clone();
                control.events = prev.events.clone();
                control.tracker = prev.tracker.clone();
            }
        }
        *self = fresh;
    }
}

/// Does the page look framework-managed? Controls on such pages get the
/// tracker shim attached so injection keeps the framework's change
/// detection working.
fn framework_managed(doc: &Html) -> bool {
    let Ok(root_sel) =
        Selector::parse("[data-reactroot], [data-reactid], #__next, #___gatsby, [data-v-app]")
    else {
        return false;
    };
    doc.select(&root_sel).next().is_some()
}

fn build_control(
    doc: &Html,
    element: ElementRef<'_>,
    dom_index: usize,
    tracked: bool,
) -> FormControl {
    let attr = |name: &str| {
        element
            .value()
            .attr(name)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };

    let input_type = element
        .value()
        .attr("type")
        .unwrap_or("text")
        .trim()
        .to_ascii_lowercase();
    let kind = kind_for(element, &input_type);
    let options = if kind == ControlKind::Select {
        scan_options(element)
    } else {
        Vec::new()
    };
    let value = initial_value(element, kind, &options);
    let tracker = if tracked && kind == ControlKind::Text {
        Some(ValueTracker {
            last_value: value.clone(),
        })
    } else {
        None
    };

    FormControl {
        kind,
        dom_index,
        id: attr("id"),
        name: attr("name"),
        input_type,
        label: label::resolve_label(doc, element),
        aria_label: attr("aria-label"),
        data_testid: attr("data-testid"),
        data_qa: attr("data-qa"),
        placeholder: attr("placeholder"),
        autocomplete: attr("autocomplete"),
        disabled: element.value().attr("disabled").is_some(),
        read_only: element.value().attr("readonly").is_some(),
        options,
        value,
        tracker,
        events: Vec::new(),
    }
}

fn kind_for(element: ElementRef<'_>, input_type: &str) -> ControlKind {
    match element.value().name() {
        "textarea" => ControlKind::Text,
        "select" => ControlKind::Select,
        "input" => match input_type {
            "" | "text" | "email" | "tel" | "url" | "search" | "number" | "date" | "month" => {
                ControlKind::Text
            }
            "file" => ControlKind::File,
            // hidden, submit, button, reset, image, checkbox, radio, password
            _ => ControlKind::Unsupported,
        },
        _ => ControlKind::Unsupported,
    }
}

fn scan_options(select: ElementRef<'_>) -> Vec<SelectOption> {
    let Ok(option_sel) = Selector::parse("option") else {
        return Vec::new();
    };
    select
        .select(&option_sel)
        .map(|option| {
            let label = crate::dom::element_text(option);
            let value = option
                .value()
                .attr("value")
                .map(|value| value.to_string())
                .unwrap_or_else(|| label.clone());
            SelectOption { value, label }
        })
        .collect()
}

fn initial_value(
    element: ElementRef<'_>,
    kind: ControlKind,
    options: &[SelectOption],
) -> String {
    match kind {
        ControlKind::Select => {
            let Ok(selected_sel) = Selector::parse("option[selected]") else {
                return String::new();
            };
            element
                .select(&selected_sel)
                .next()
                .map(|option| {
                    option
                        .value()
                        .attr("value")
                        .map(str::to_string)
                        .unwrap_or_else(|| crate::dom::element_text(option))
                })
                .or_else(|| options.first().map(|option| option.value.clone()))
                .unwrap_or_default()
        }
        _ if element.value().name() == "textarea" => {
            crate::dom::collapse_whitespace(&element.text().collect::<String>())
        }
        _ => element
            .value()
            .attr("value")
            .unwrap_or_default()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_tags_control_kinds_up_front() {
        let doc = Html::parse_document(
            r#"<form>
              <input type="text" name="first_name">
              <input type="email" name="email">
              <textarea name="summary"></textarea>
              <select name="degree"><option value="b">Bachelor</option></select>
              <input type="file" name="resume">
              <input type="hidden" name="token">
              <input type="submit" value="Apply">
              <input type="checkbox" name="relocate">
            </form>"#,
        );
        let form = FormState::scan(&doc);
        let kinds: Vec<ControlKind> = form.controls().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ControlKind::Text,
                ControlKind::Text,
                ControlKind::Text,
                ControlKind::Select,
                ControlKind::File,
                ControlKind::Unsupported,
                ControlKind::Unsupported,
                ControlKind::Unsupported,
            ]
        );
    }

    #[test]
    fn tracker_is_attached_only_on_framework_pages() {
        let plain = Html::parse_document(r#"<form><input name="email"></form>"#);
        let form = FormState::scan(&plain);
        assert_eq!(form.controls()[0].tracker, None);

        let managed = Html::parse_document(
            r#"<div data-reactroot><form><input name="email" value="old"></form></div>"#,
        );
        let form = FormState::scan(&managed);
        assert_eq!(
            form.controls()[0].tracker,
            Some(ValueTracker {
                last_value: "old".to_string(),
            })
        );
    }

    #[test]
    fn select_scan_collects_options_and_default_value() {
        let doc = Html::parse_document(
            r#"<select name="degree">
              <option value="">Choose</option>
              <option value="btech" selected>B.Tech</option>
            </select>"#,
        );
        let form = FormState::scan(&doc);
        let control = &form.controls()[0];
        assert_eq!(control.options.len(), 2);
        assert_eq!(control.value, "btech");
    }

    #[test]
    fn rebuild_carries_values_over_by_identity() {
        let doc = Html::parse_document(r#"<form><input name="email"></form>"#);
        let mut form = FormState::scan(&doc);
        form.controls_mut()[0].value = "a@b.com".to_string();
        form.controls_mut()[0].events.push(DispatchedEvent::Input);

        // A conditional field mounted after the first change event.
        let mutated = Html::parse_document(
            r#"<form><input name="email"><input name="phone"></form>"#,
        );
        form.rebuild(&mutated);

        assert_eq!(form.len(), 2);
        assert_eq!(form.controls()[0].value, "a@b.com");
        assert_eq!(form.controls()[0].events, vec![DispatchedEvent::Input]);
        assert_eq!(form.controls()[1].value, "");
    }
}
