use std::panic::{self, AssertUnwindSafe};

use scraper::{Html, Selector};
use url::Url;

use crate::dom;
use crate::schema::{self, JobPostingRecord};
use crate::types::{JobInfo, PageState};

/// Very large pages are truncated, not rejected.
pub const MAX_JD_TEXT: usize = 50_000;
const MIN_DESCRIPTION_LEN: usize = 200;
const BIG_FORM_CONTROLS: usize = 6;
const MAX_LOCATION_LEN: usize = 120;

/// Known job-board/ATS hosts and path fragments. Matching any of these alone
/// classifies the page; false positives are tolerated, downstream actions
/// are opt-in user clicks.
const ATS_URL_PATTERNS: &[&str] = &[
    "jobs.lever.co",
    "boards.greenhouse.io",
    "job-boards.greenhouse.io",
    "myworkdayjobs.com",
    "jobs.ashbyhq.com",
    "jobs.smartrecruiters.com",
    "apply.workable.com",
    "jobs.jobvite.com",
    "icims.com",
    "bamboohr.com/careers",
    "taleo.net",
    "recruitee.com",
    "breezy.hr",
    "linkedin.com/jobs/view",
    "indeed.com/viewjob",
    "naukri.com/job-listings",
    "wellfound.com/jobs",
    "/careers/",
    "/jobs/",
    "/job/",
    "/apply",
];

/// Vendor-specific title nodes, tried before generic headings.
const TITLE_SELECTORS: &[&str] = &[
    ".posting-headline h2",
    "h1.app-title",
    "h1[data-automation-id='jobPostingHeader']",
    ".jobs-unified-top-card__job-title",
    ".jobsearch-JobInfoHeader-title",
];

const LOCATION_SELECTORS: &[&str] = &[
    ".posting-categories .location",
    ".location",
    "[class*='job-location']",
    "[class*='location']",
];

/// Likely description containers, most specific first.
const DESCRIPTION_SELECTORS: &[&str] = &[
    "#job-description",
    "[class*='job-description']",
    "[class*='jobdescription']",
    ".posting-description",
    "[class*='description']",
    "main",
    "article",
];

const TEXT_KEYWORDS: &[&str] = &["apply", "resume", "cover letter"];

/// True when the page URL matches a known job-board/ATS pattern.
pub fn url_matches_ats(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ATS_URL_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

/// Runs one full detection over the document. Never fails outward: a broken
/// extraction is recorded in `last_error` and `is_job` degrades to the URL
/// heuristic alone.
pub fn detect_page(doc: &Html, page_url: &str, detected_at_utc: String) -> PageState {
    let url_match = url_matches_ats(page_url);
    match panic::catch_unwind(AssertUnwindSafe(|| analyze(doc, page_url))) {
        Ok(analysis) => PageState {
            is_job: url_match || analysis.has_record || analysis.heuristic_hit,
            extracted: Some(analysis.info),
            detected_at_utc,
            last_error: None,
        },
        Err(payload) => PageState {
            is_job: url_match,
            extracted: None,
            detected_at_utc,
            last_error: Some(panic_message(payload.as_ref())),
        },
    }
}

struct Analysis {
    has_record: bool,
    heuristic_hit: bool,
    info: JobInfo,
}

fn analyze(doc: &Html, page_url: &str) -> Analysis {
    let record = schema::job_posting_record(doc);
    let page_text = dom::visible_text(doc, MAX_JD_TEXT);

    let info = JobInfo {
        title: resolve_title(doc, record.as_ref()),
        company: resolve_company(doc, record.as_ref(), page_url),
        location: resolve_location(doc, record.as_ref()),
        jd_text: resolve_description(doc, record.as_ref(), &page_text),
        apply_url: resolve_apply_url(doc, record.as_ref(), page_url),
        page_url: page_url.to_string(),
    };

    let signals = heuristic_signals(doc);
    let lower_text = page_text.to_lowercase();
    let keyword = TEXT_KEYWORDS
        .iter()
        .any(|keyword| lower_text.contains(keyword));
    // Disjunctive on purpose, not a weighted score: tuned for low false
    // negatives.
    let heuristic_hit = (signals.big_form || signals.file_upload) && signals.contact_field && keyword;

    Analysis {
        has_record: record.is_some(),
        heuristic_hit,
        info,
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct HeuristicSignals {
    file_upload: bool,
    contact_field: bool,
    big_form: bool,
}

fn heuristic_signals(doc: &Html) -> HeuristicSignals {
    let mut signals = HeuristicSignals::default();

    if let Ok(file_sel) = Selector::parse("input[type='file']") {
        signals.file_upload = doc.select(&file_sel).next().is_some();
    }

    if let Ok(input_sel) = Selector::parse("input") {
        signals.contact_field = doc.select(&input_sel).any(|input| {
            let typed = input
                .value()
                .attr("type")
                .map(|t| t.eq_ignore_ascii_case("email") || t.eq_ignore_ascii_case("tel"))
                .unwrap_or(false);
            let named = ["name", "id"].iter().any(|attr| {
                input
                    .value()
                    .attr(attr)
                    .map(|v| {
                        let v = v.to_ascii_lowercase();
                        v.contains("email") || v.contains("phone")
                    })
                    .unwrap_or(false)
            });
            typed || named
        });
    }

    if let (Ok(form_sel), Ok(control_sel)) = (
        Selector::parse("form"),
        Selector::parse("input, select, textarea"),
    ) {
        signals.big_form = doc
            .select(&form_sel)
            .any(|form| form.select(&control_sel).count() >= BIG_FORM_CONTROLS);
    }

    signals
}

fn resolve_title(doc: &Html, record: Option<&JobPostingRecord>) -> String {
    if let Some(record) = record {
        if !record.title.is_empty() {
            return record.title.clone();
        }
    }
    first_selector_text(doc, TITLE_SELECTORS, usize::MAX)
        .or_else(|| first_selector_text(doc, &["h1", "h2"], usize::MAX))
        .or_else(|| meta_content(doc, "og:title"))
        .or_else(|| first_selector_text(doc, &["title"], usize::MAX))
        .unwrap_or_default()
}

fn resolve_company(doc: &Html, record: Option<&JobPostingRecord>, page_url: &str) -> String {
    if let Some(record) = record {
        if !record.organization.is_empty() {
            return record.organization.clone();
        }
    }
    meta_content(doc, "og:site_name")
        .or_else(|| company_slug_from_url(page_url))
        .unwrap_or_default()
}

/// ATS vanity URLs carry the tenant slug in a well-known position.
fn company_slug_from_url(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let first_segment = || {
        url.path_segments()
            .and_then(|mut segments| segments.find(|segment| !segment.is_empty()))
            .map(str::to_string)
    };
    match host.as_str() {
        "jobs.lever.co" | "jobs.eu.lever.co" => first_segment(),
        "boards.greenhouse.io" | "job-boards.greenhouse.io" => first_segment(),
        "jobs.ashbyhq.com" | "apply.workable.com" | "jobs.smartrecruiters.com" => first_segment(),
        _ if host.ends_with(".myworkdayjobs.com") => {
            host.split('.').next().map(str::to_string)
        }
        _ => None,
    }
}

fn resolve_location(doc: &Html, record: Option<&JobPostingRecord>) -> String {
    if let Some(record) = record {
        if !record.locality.is_empty() {
            return record.locality.clone();
        }
    }
    first_selector_text(doc, LOCATION_SELECTORS, MAX_LOCATION_LEN).unwrap_or_default()
}

fn resolve_description(doc: &Html, record: Option<&JobPostingRecord>, page_text: &str) -> String {
    if let Some(record) = record {
        if !record.description_text.is_empty() {
            return dom::truncate_on_char_boundary(record.description_text.clone(), MAX_JD_TEXT);
        }
    }
    for raw in DESCRIPTION_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in doc.select(&selector) {
            let text = dom::element_text(element);
            if text.len() > MIN_DESCRIPTION_LEN {
                return dom::truncate_on_char_boundary(text, MAX_JD_TEXT);
            }
        }
    }
    page_text.to_string()
}

fn resolve_apply_url(doc: &Html, record: Option<&JobPostingRecord>, page_url: &str) -> String {
    if let Some(record) = record {
        if !record.apply_url.is_empty() {
            return record.apply_url.clone();
        }
    }
    if let Ok(anchor_sel) = Selector::parse("a[href]") {
        let base = Url::parse(page_url).ok();
        for anchor in doc.select(&anchor_sel) {
            let text = dom::element_text(anchor).to_lowercase();
            if !text.contains("apply") {
                continue;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let resolved = match Url::parse(href) {
                Ok(url) => Some(url),
                Err(_) => base.as_ref().and_then(|base| base.join(href).ok()),
            };
            if let Some(url) = resolved {
                if matches!(url.scheme(), "http" | "https") {
                    return url.into();
                }
            }
        }
    }
    page_url.to_string()
}

/// First non-empty (and short enough) text among the given selectors.
fn first_selector_text(doc: &Html, selectors: &[&str], max_len: usize) -> Option<String> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        for element in doc.select(&selector) {
            let text = dom::element_text(element);
            if !text.is_empty() && text.len() <= max_len {
                return Some(text);
            }
        }
    }
    None
}

fn meta_content(doc: &Html, property: &str) -> Option<String> {
    let raw = format!(r#"meta[property="{property}"], meta[name="{property}"]"#);
    let selector = Selector::parse(&raw).ok()?;
    doc.select(&selector)
        .find_map(|meta| meta.value().attr("content"))
        .map(dom::collapse_whitespace)
        .filter(|content| !content.is_empty())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "detection failed".to_string()
    }
}
