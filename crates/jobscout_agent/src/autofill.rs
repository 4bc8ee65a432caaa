use crate::classify::{classify, signature_for};
use crate::form::{ControlKind, FormState};
use crate::inject::inject_value;
use crate::types::{AutofillResult, CandidateProfileView};

/// One autofill pass: walk every supported control, classify its signature,
/// inject the matching non-empty profile value.
///
/// `filled` counts successful injections. `skipped` counts supported
/// controls walked but left unfilled (no classification, empty profile
/// value, uneditable, or no matching option). File inputs and unsupported
/// controls are excluded from both counters.
pub fn autofill_pass(form: &mut FormState, profile: &CandidateProfileView) -> AutofillResult {
    let mut result = AutofillResult::default();
    for control in form.controls_mut() {
        if matches!(control.kind, ControlKind::File | ControlKind::Unsupported) {
            continue;
        }
        let signature = signature_for(control);
        let Some(field) = classify(&signature) else {
            result.skipped += 1;
            continue;
        };
        let value = field.value_from(profile);
        if value.trim().is_empty() {
            result.skipped += 1;
            continue;
        }
        if inject_value(control, value) {
            result.filled += 1;
        } else {
            result.skipped += 1;
        }
    }
    result
}
