use crate::form::FormControl;
use crate::types::CandidateProfileView;

/// Profile attribute a form control maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FirstName,
    LastName,
    FullName,
    Email,
    Phone,
    Location,
    Linkedin,
    Github,
    Portfolio,
    College,
    Degree,
    Branch,
    EndYear,
    Skills,
    Summary,
}

impl ProfileField {
    /// Projects the matching profile value.
    pub fn value_from<'a>(&self, profile: &'a CandidateProfileView) -> &'a str {
        match self {
            ProfileField::FirstName => &profile.first_name,
            ProfileField::LastName => &profile.last_name,
            ProfileField::FullName => &profile.full_name,
            ProfileField::Email => &profile.email,
            ProfileField::Phone => &profile.phone,
            ProfileField::Location => &profile.location,
            ProfileField::Linkedin => &profile.linkedin,
            ProfileField::Github => &profile.github,
            ProfileField::Portfolio => &profile.portfolio,
            ProfileField::College => &profile.college,
            ProfileField::Degree => &profile.degree,
            ProfileField::Branch => &profile.branch,
            ProfileField::EndYear => &profile.end_year,
            ProfileField::Skills => &profile.skills,
            ProfileField::Summary => &profile.summary,
        }
    }
}

/// Builds the classification signature for one control: up to eight text
/// sources concatenated, lowercased, with `_`/`-` folded to spaces so
/// attribute spellings (`first_name`, `given-name`) and label spellings
/// ("First name") all hit the same rules.
pub fn signature_for(control: &FormControl) -> String {
    let sources = [
        control.label.as_str(),
        control.aria_label.as_str(),
        control.data_testid.as_str(),
        control.data_qa.as_str(),
        control.placeholder.as_str(),
        control.autocomplete.as_str(),
        control.name.as_str(),
        control.id.as_str(),
    ];
    let joined = sources
        .iter()
        .filter(|source| !source.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" | ");
    let folded: String = joined
        .chars()
        .map(|c| match c {
            '_' | '-' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect();
    crate::dom::collapse_whitespace(&folded)
}

/// Signatures that look name-like but mean an organization or institution,
/// not the candidate. Blocks the generic full-name catch-all.
const NON_PERSON_NAME_CONTEXT: &[&str] = &[
    "company",
    "employer",
    "organization",
    "organisation",
    "business",
    "school",
    "college",
    "university",
    "user name",
    "username",
    "file name",
];

/// Maps a signature to one profile attribute, or `None` (leave the field
/// untouched). Rules run top to bottom, first match wins; signatures are
/// ambiguous, so specific cues must sit above the generic ones they contain.
pub fn classify(signature: &str) -> Option<ProfileField> {
    let s = signature;
    if contains_any(s, &["first name", "given name", "fname", "forename"]) {
        return Some(ProfileField::FirstName);
    }
    if contains_any(s, &["last name", "surname", "family name", "lname"]) {
        return Some(ProfileField::LastName);
    }
    if contains_any(s, &["full name", "your name", "candidate name", "applicant name"]) {
        return Some(ProfileField::FullName);
    }
    if contains_any(s, &["email", "e mail"]) {
        return Some(ProfileField::Email);
    }
    // "tel" only as a whole token (the autocomplete hint); as a bare
    // substring it would shadow "tell us about yourself".
    if contains_any(s, &["phone", "mobile", "contact number", "telephone"]) || contains_word(s, "tel")
    {
        return Some(ProfileField::Phone);
    }
    // Most specific location phrasing first, generic address cues last.
    if contains_any(s, &["current location", "current city"]) {
        return Some(ProfileField::Location);
    }
    if s.contains("location") {
        return Some(ProfileField::Location);
    }
    if contains_any(s, &["address", "city", "zip", "postal"]) {
        return Some(ProfileField::Location);
    }
    if s.contains("linkedin") {
        return Some(ProfileField::Linkedin);
    }
    if s.contains("github") {
        return Some(ProfileField::Github);
    }
    if contains_any(s, &["portfolio", "personal website", "personal site", "website"]) {
        return Some(ProfileField::Portfolio);
    }
    if contains_any(s, &["college", "university", "institute", "school"]) {
        return Some(ProfileField::College);
    }
    if contains_any(s, &["degree", "qualification"]) {
        return Some(ProfileField::Degree);
    }
    if contains_any(
        s,
        &["branch", "major", "department", "field of study", "discipline", "specialization"],
    ) {
        return Some(ProfileField::Branch);
    }
    if contains_any(
        s,
        &[
            "graduation year",
            "grad year",
            "graduating year",
            "year of passing",
            "passing year",
            "batch",
            "end year",
        ],
    ) {
        return Some(ProfileField::EndYear);
    }
    if contains_any(s, &["skills", "tech stack", "technologies"]) {
        return Some(ProfileField::Skills);
    }
    if contains_any(
        s,
        &["summary", "about you", "about yourself", "cover letter", "objective", "tell us about"],
    ) {
        return Some(ProfileField::Summary);
    }
    // Generic "name" only as a late catch-all, and never in a non-person
    // context ("company name" must not receive the candidate's name).
    if s.contains("name") && !contains_any(s, NON_PERSON_NAME_CONTEXT) {
        return Some(ProfileField::FullName);
    }
    None
}

fn contains_any(signature: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| signature.contains(cue))
}

fn contains_word(signature: &str, word: &str) -> bool {
    signature
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| token == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_spellings_fold_to_the_same_rule() {
        assert_eq!(classify("first name"), Some(ProfileField::FirstName));
        assert_eq!(classify("first_name".replace('_', " ").as_str()), Some(ProfileField::FirstName));
        assert_eq!(classify("given name"), Some(ProfileField::FirstName));
    }

    #[test]
    fn specific_rules_shadow_generic_name() {
        assert_eq!(classify("first name | name"), Some(ProfileField::FirstName));
        assert_eq!(classify("last name | name"), Some(ProfileField::LastName));
        // A signature with both "company name" and "name" must not pick the
        // generic full-name rule.
        assert_eq!(classify("company name | name"), None);
        assert_eq!(classify("name"), Some(ProfileField::FullName));
    }

    #[test]
    fn current_location_beats_generic_address_cues() {
        assert_eq!(
            classify("current location | city"),
            Some(ProfileField::Location)
        );
        assert_eq!(classify("zip code"), Some(ProfileField::Location));
    }

    #[test]
    fn university_field_does_not_become_a_name() {
        assert_eq!(
            classify("university name | school"),
            Some(ProfileField::College)
        );
    }

    #[test]
    fn links_classify_by_vendor_cue() {
        assert_eq!(classify("linkedin url"), Some(ProfileField::Linkedin));
        assert_eq!(classify("github profile"), Some(ProfileField::Github));
        assert_eq!(classify("personal website"), Some(ProfileField::Portfolio));
    }

    #[test]
    fn graduation_year_phrases_map_to_end_year() {
        assert_eq!(classify("graduation year"), Some(ProfileField::EndYear));
        assert_eq!(classify("year of passing"), Some(ProfileField::EndYear));
        assert_eq!(classify("batch"), Some(ProfileField::EndYear));
    }

    #[test]
    fn essay_fields_map_to_summary() {
        assert_eq!(classify("cover letter"), Some(ProfileField::Summary));
        assert_eq!(classify("tell us about yourself"), Some(ProfileField::Summary));
    }

    #[test]
    fn tel_matches_as_a_token_not_a_substring() {
        assert_eq!(classify("phone number | tel"), Some(ProfileField::Phone));
        assert_eq!(classify("tel"), Some(ProfileField::Phone));
        assert_ne!(classify("tell me more"), Some(ProfileField::Phone));
    }

    #[test]
    fn unrelated_signature_is_left_alone() {
        assert_eq!(classify("how did you hear about us"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn signature_concatenates_sources_in_order() {
        let control = FormControl {
            kind: crate::form::ControlKind::Text,
            dom_index: 0,
            id: "f-42".to_string(),
            name: "first_name".to_string(),
            input_type: "text".to_string(),
            label: "First Name".to_string(),
            aria_label: String::new(),
            data_testid: String::new(),
            data_qa: String::new(),
            placeholder: "Jane".to_string(),
            autocomplete: "given-name".to_string(),
            disabled: false,
            read_only: false,
            options: Vec::new(),
            value: String::new(),
            tracker: None,
            events: Vec::new(),
        };
        assert_eq!(
            signature_for(&control),
            "first name | jane | given name | first name | f 42"
        );
    }
}
