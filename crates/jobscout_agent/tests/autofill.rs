use std::sync::Once;

use jobscout_agent::{
    autofill_pass, AgentConfig, CandidateProfileView, DispatchedEvent, FormState, PageAgent,
};
use pretty_assertions::assert_eq;
use scraper::Html;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(agent_logging::initialize_for_tests);
}

fn profile() -> CandidateProfileView {
    CandidateProfileView {
        full_name: "A B".to_string(),
        first_name: "A".to_string(),
        last_name: "B".to_string(),
        email: "a@b.com".to_string(),
        phone: "123".to_string(),
        location: "Pune".to_string(),
        linkedin: "https://linkedin.com/in/ab".to_string(),
        github: "https://github.com/ab".to_string(),
        college: "IIT".to_string(),
        degree: "Bachelor of Technology".to_string(),
        skills: "Rust, SQL".to_string(),
        ..CandidateProfileView::default()
    }
}

#[test]
fn contact_form_fills_all_four_fields_with_one_event_burst_each() {
    init_logging();
    let doc = Html::parse_document(
        r#"<form>
          <input name="first_name"><input name="last_name">
          <input type="email" name="email"><input type="tel" name="phone">
        </form>"#,
    );
    let mut form = FormState::scan(&doc);

    let result = autofill_pass(&mut form, &profile());

    assert_eq!(result.filled, 4);
    assert_eq!(result.skipped, 0);
    let values: Vec<&str> = form.controls().iter().map(|c| c.value.as_str()).collect();
    assert_eq!(values, vec!["A", "B", "a@b.com", "123"]);
    for control in form.controls() {
        // Exactly one dispatch of each event per field.
        assert_eq!(
            control.events,
            vec![
                DispatchedEvent::Input,
                DispatchedEvent::Change,
                DispatchedEvent::Blur,
            ]
        );
    }
}

#[test]
fn unclassified_and_uneditable_controls_count_as_skipped() {
    init_logging();
    let doc = Html::parse_document(
        r#"<form>
          <input name="email">
          <input name="how_did_you_hear">
          <input name="phone" disabled>
        </form>"#,
    );
    let mut form = FormState::scan(&doc);

    let result = autofill_pass(&mut form, &profile());

    assert_eq!(result.filled, 1);
    assert_eq!(result.skipped, 2);
    assert_eq!(form.controls()[2].value, "");
    assert!(form.controls()[2].events.is_empty());
}

#[test]
fn file_inputs_count_as_neither_filled_nor_skipped() {
    init_logging();
    let doc = Html::parse_document(
        r#"<form>
          <input type="email" name="email">
          <input type="file" name="resume">
          <input type="submit" value="Apply">
        </form>"#,
    );
    let mut form = FormState::scan(&doc);

    let result = autofill_pass(&mut form, &profile());

    assert_eq!(result.filled, 1);
    assert_eq!(result.skipped, 0);
}

#[test]
fn empty_profile_values_leave_fields_untouched() {
    init_logging();
    let doc = Html::parse_document(r#"<form><input name="portfolio_website"></form>"#);
    let mut form = FormState::scan(&doc);

    // profile().portfolio is empty.
    let result = autofill_pass(&mut form, &profile());

    assert_eq!(result.filled, 0);
    assert_eq!(result.skipped, 1);
    assert_eq!(form.controls()[0].value, "");
}

#[test]
fn labels_drive_classification_when_attributes_are_opaque() {
    init_logging();
    let doc = Html::parse_document(
        r#"<form>
          <div class="application-field">
            <div class="field-label">College name</div>
            <input name="q_1142">
          </div>
          <label for="q2">Graduation year</label><input id="q2" name="q_9983">
        </form>"#,
    );
    let mut form = FormState::scan(&doc);
    let result = autofill_pass(
        &mut form,
        &CandidateProfileView {
            college: "IIT".to_string(),
            end_year: "2025".to_string(),
            ..CandidateProfileView::default()
        },
    );

    assert_eq!(result.filled, 2);
    assert_eq!(form.controls()[0].value, "IIT");
    assert_eq!(form.controls()[1].value, "2025");
}

#[test]
fn degree_select_is_matched_by_option_label() {
    init_logging();
    let doc = Html::parse_document(
        r#"<form><label>Degree
          <select name="degree">
            <option value="">Select one</option>
            <option value="12">Bachelor of Technology</option>
          </select></label></form>"#,
    );
    let mut form = FormState::scan(&doc);

    let result = autofill_pass(&mut form, &profile());

    assert_eq!(result.filled, 1);
    assert_eq!(form.controls()[0].value, "12");
}

#[test]
fn second_pass_picks_up_conditionally_mounted_fields() {
    init_logging();
    let agent_config = AgentConfig::default();
    let mut agent = PageAgent::new(
        agent_config,
        "https://jobs.lever.co/acme/1",
        r#"<form><input type="email" name="email"></form>"#,
    );

    let first = agent.autofill(&profile());
    assert_eq!(first.filled, 1);

    // The first change event caused the vendor UI to mount another field.
    agent.replace_document(
        r#"<form><input type="email" name="email"><input type="tel" name="phone"></form>"#
            .to_string(),
    );
    let second = agent.autofill(&profile());

    // The carried-over email field refills; the new phone field gets filled.
    assert_eq!(second.filled, 2);
    let values: Vec<&str> = agent
        .form()
        .controls()
        .iter()
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(values, vec!["a@b.com", "123"]);
}
