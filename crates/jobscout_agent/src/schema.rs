use scraper::{Html, Selector};
use serde_json::Value;

use crate::dom;

/// Machine-readable job-posting record embedded in the page (JSON-LD).
/// When present, its fields are trusted above all other signals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobPostingRecord {
    pub title: String,
    pub organization: String,
    pub locality: String,
    /// Description flattened to plain text.
    pub description_text: String,
    pub apply_url: String,
}

/// Finds the first embedded `JobPosting` record in the document, if any.
/// Malformed JSON blocks are skipped, not errors.
pub fn job_posting_record(doc: &Html) -> Option<JobPostingRecord> {
    let script_sel = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
    for script in doc.select(&script_sel) {
        let raw = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        if let Some(posting) = find_job_posting(&value) {
            return Some(record_from(posting));
        }
    }
    None
}

/// JSON-LD wraps postings in arrays and `@graph` containers; search them all.
fn find_job_posting(value: &Value) -> Option<&Value> {
    match value {
        Value::Object(map) => {
            if type_is_job_posting(map.get("@type")) {
                return Some(value);
            }
            map.get("@graph").and_then(find_job_posting)
        }
        Value::Array(items) => items.iter().find_map(find_job_posting),
        _ => None,
    }
}

fn type_is_job_posting(type_field: Option<&Value>) -> bool {
    match type_field {
        Some(Value::String(name)) => name == "JobPosting",
        Some(Value::Array(names)) => names
            .iter()
            .any(|name| name.as_str() == Some("JobPosting")),
        _ => false,
    }
}

fn record_from(posting: &Value) -> JobPostingRecord {
    JobPostingRecord {
        title: string_at(posting, &["title"]),
        organization: string_at(posting, &["hiringOrganization", "name"]),
        locality: locality_from(posting),
        description_text: html_to_text(&string_at(posting, &["description"])),
        apply_url: string_at(posting, &["url"]),
    }
}

fn locality_from(posting: &Value) -> String {
    let location = match posting.get("jobLocation") {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };
    let Some(location) = location else {
        return String::new();
    };
    let address = match location.get("address") {
        Some(Value::Array(items)) => items.first(),
        other => other,
    };
    address
        .and_then(|address| address.get("addressLocality"))
        .and_then(Value::as_str)
        .map(|text| dom::collapse_whitespace(text))
        .unwrap_or_default()
}

fn string_at(value: &Value, path: &[&str]) -> String {
    let mut current = value;
    for &key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return String::new(),
        }
    }
    current
        .as_str()
        .map(|text| dom::collapse_whitespace(text))
        .unwrap_or_default()
}

/// Record descriptions arrive as HTML; flatten to whitespace-normalized text.
fn html_to_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(html);
    dom::collapse_whitespace(&fragment.root_element().text().collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_ld(json: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><head><script type="application/ld+json">{json}</script></head><body></body></html>"#
        ))
    }

    #[test]
    fn extracts_plain_job_posting() {
        let doc = doc_with_ld(
            r#"{"@context":"https://schema.org","@type":"JobPosting","title":"Backend Engineer","hiringOrganization":{"@type":"Organization","name":"Acme"},"jobLocation":{"@type":"Place","address":{"addressLocality":"Remote"}},"description":"<p>Build APIs</p>","url":"https://acme.example/jobs/1"}"#,
        );
        let record = job_posting_record(&doc).expect("record");
        assert_eq!(record.title, "Backend Engineer");
        assert_eq!(record.organization, "Acme");
        assert_eq!(record.locality, "Remote");
        assert_eq!(record.description_text, "Build APIs");
        assert_eq!(record.apply_url, "https://acme.example/jobs/1");
    }

    #[test]
    fn finds_posting_inside_graph_container() {
        let doc = doc_with_ld(
            r#"{"@graph":[{"@type":"WebSite","name":"Acme"},{"@type":"JobPosting","title":"SRE"}]}"#,
        );
        let record = job_posting_record(&doc).expect("record");
        assert_eq!(record.title, "SRE");
        assert_eq!(record.organization, "");
    }

    #[test]
    fn finds_posting_with_array_type() {
        let doc = doc_with_ld(r#"[{"@type":["JobPosting","Thing"],"title":"Data Engineer"}]"#);
        let record = job_posting_record(&doc).expect("record");
        assert_eq!(record.title, "Data Engineer");
    }

    #[test]
    fn malformed_json_block_is_skipped() {
        let doc = Html::parse_document(
            r#"<html><head>
            <script type="application/ld+json">{not json</script>
            <script type="application/ld+json">{"@type":"JobPosting","title":"QA"}</script>
            </head><body></body></html>"#,
        );
        let record = job_posting_record(&doc).expect("record");
        assert_eq!(record.title, "QA");
    }

    #[test]
    fn no_record_yields_none() {
        let doc = Html::parse_document("<html><body><h1>Pricing</h1></body></html>");
        assert_eq!(job_posting_record(&doc), None);
    }
}
