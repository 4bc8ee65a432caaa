use crate::form::{ControlKind, DispatchedEvent, FormControl};

/// Sets a value on one control so that both the native model and any
/// framework observing the node converge on it. Returns whether the control
/// was filled.
///
/// Text path: if the node carries a framework change tracker, the tracker is
/// reset to the previous value before the write so the framework's change
/// detector still fires; `input`, `change`, `blur` are then dispatched in
/// that order. Select path: the desired text is matched against option
/// labels by case-insensitive substring containment and the first match's
/// underlying value is selected. File inputs are never touched: programmatic
/// file selection is forbidden territory, document upload stays a manual
/// user action.
pub fn inject_value(control: &mut FormControl, value: &str) -> bool {
    if !control.editable() {
        return false;
    }
    match control.kind {
        ControlKind::Text => {
            set_text_value(control, value);
            true
        }
        ControlKind::Select => select_matching_option(control, value),
        ControlKind::File | ControlKind::Unsupported => false,
    }
}

fn set_text_value(control: &mut FormControl, value: &str) {
    if let Some(tracker) = control.tracker.as_mut() {
        // Reset to the previous value first; the framework diffs against
        // this marker to decide whether its own listeners see a change.
        tracker.last_value = control.value.clone();
    }
    control.value = value.to_string();
    control.events.push(DispatchedEvent::Input);
    control.events.push(DispatchedEvent::Change);
    control.events.push(DispatchedEvent::Blur);
}

fn select_matching_option(control: &mut FormControl, value: &str) -> bool {
    let wanted = value.to_lowercase();
    let matched = control
        .options
        .iter()
        .find(|option| option.label.to_lowercase().contains(&wanted))
        .map(|option| option.value.clone());
    match matched {
        Some(option_value) => {
            control.value = option_value;
            control.events.push(DispatchedEvent::Change);
            true
        }
        // No match leaves the control untouched.
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormState, ValueTracker};
    use scraper::Html;

    fn text_control(tracked: bool) -> FormControl {
        let html = if tracked {
            r#"<div data-reactroot><input name="email" value="old@x.com"></div>"#
        } else {
            r#"<input name="email" value="old@x.com">"#
        };
        let doc = Html::parse_document(html);
        FormState::scan(&doc).controls()[0].clone()
    }

    #[test]
    fn text_injection_dispatches_input_change_blur_once() {
        let mut control = text_control(false);
        assert!(inject_value(&mut control, "a@b.com"));
        assert_eq!(control.value, "a@b.com");
        assert_eq!(
            control.events,
            vec![
                DispatchedEvent::Input,
                DispatchedEvent::Change,
                DispatchedEvent::Blur,
            ]
        );
    }

    #[test]
    fn tracker_is_reset_to_previous_value_before_the_write() {
        let mut control = text_control(true);
        control.value = "typed@x.com".to_string();
        assert!(inject_value(&mut control, "a@b.com"));
        assert_eq!(control.value, "a@b.com");
        assert_eq!(
            control.tracker,
            Some(ValueTracker {
                last_value: "typed@x.com".to_string(),
            })
        );
    }

    #[test]
    fn untracked_control_fills_without_a_tracker() {
        let mut control = text_control(false);
        assert!(inject_value(&mut control, "a@b.com"));
        assert_eq!(control.tracker, None);
    }

    #[test]
    fn disabled_and_readonly_controls_are_refused() {
        let doc = Html::parse_document(
            r#"<form><input name="email" disabled><input name="phone" readonly></form>"#,
        );
        let mut form = FormState::scan(&doc);
        for control in form.controls_mut() {
            assert!(!inject_value(control, "x"));
            assert!(control.events.is_empty());
        }
    }

    #[test]
    fn file_input_is_never_touched() {
        let doc = Html::parse_document(r#"<input type="file" name="resume">"#);
        let mut form = FormState::scan(&doc);
        let control = &mut form.controls_mut()[0];
        assert!(!inject_value(control, "resume.pdf"));
        assert_eq!(control.value, "");
        assert!(control.events.is_empty());
    }

    #[test]
    fn select_matches_option_label_by_substring() {
        let doc = Html::parse_document(
            r#"<select name="degree">
              <option value="">Choose</option>
              <option value="bt">Bachelor of Technology (B.Tech)</option>
              <option value="mt">Master of Technology</option>
            </select>"#,
        );
        let mut form = FormState::scan(&doc);
        let control = &mut form.controls_mut()[0];
        assert!(inject_value(control, "bachelor of technology"));
        assert_eq!(control.value, "bt");
        assert_eq!(control.events, vec![DispatchedEvent::Change]);
    }

    #[test]
    fn select_without_match_is_left_untouched() {
        let doc = Html::parse_document(
            r#"<select name="degree"><option value="a">Associate</option></select>"#,
        );
        let mut form = FormState::scan(&doc);
        let control = &mut form.controls_mut()[0];
        assert!(!inject_value(control, "Doctorate"));
        assert_eq!(control.value, "a");
        assert!(control.events.is_empty());
    }
}
