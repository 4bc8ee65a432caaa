use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use agent_logging::agent_debug;
use scraper::Html;

use crate::autofill::autofill_pass;
use crate::detect::detect_page;
use crate::form::FormState;
use crate::types::{AutofillResult, CandidateProfileView, PageState};

/// Tuning knobs for one page agent. The clock is injected so detection
/// timestamps stay deterministic under test; the host supplies a real UTC
/// clock.
#[derive(Clone)]
pub struct AgentConfig {
    /// Quiet period after the last observed mutation before re-detection.
    pub debounce_quiet_period: Duration,
    /// Delay before the silent second autofill pass.
    pub second_pass_delay: Duration,
    pub now_utc: Arc<dyn Fn() -> String + Send + Sync>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            debounce_quiet_period: Duration::from_millis(800),
            second_pass_delay: Duration::from_millis(1200),
            now_utc: Arc::new(|| "1970-01-01T00:00:00Z".to_string()),
        }
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("debounce_quiet_period", &self.debounce_quiet_period)
            .field("second_pass_delay", &self.second_pass_delay)
            .finish_non_exhaustive()
    }
}

/// In-page agent for one document: owns the page state and the scanned form
/// model. Detection and autofill are synchronous scans; all suspension
/// points (debounce, second pass) live in the runtime loop driving this.
#[derive(Debug)]
pub struct PageAgent {
    config: AgentConfig,
    page_url: String,
    document_html: String,
    state: PageState,
    form: FormState,
}

impl PageAgent {
    pub fn new(
        config: AgentConfig,
        page_url: impl Into<String>,
        document_html: impl Into<String>,
    ) -> Self {
        let page_url = page_url.into();
        let document_html = document_html.into();
        let doc = Html::parse_document(&document_html);
        let form = FormState::scan(&doc);
        Self {
            config,
            page_url,
            document_html,
            state: PageState::default(),
            form,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    /// Read-only snapshot of the current page state.
    pub fn snapshot(&self) -> PageState {
        self.state.clone()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Runs one detection and replaces the page state wholesale. Returns
    /// the summary verdict for broadcasting.
    pub fn detect(&mut self) -> bool {
        let doc = Html::parse_document(&self.document_html);
        self.state = detect_page(&doc, &self.page_url, (self.config.now_utc)());
        agent_debug!(
            "detection url={} is_job={} controls={}",
            self.page_url,
            self.state.is_job,
            self.form.len()
        );
        self.state.is_job
    }

    /// One autofill pass over the current form model.
    pub fn autofill(&mut self, profile: &CandidateProfileView) -> AutofillResult {
        autofill_pass(&mut self.form, profile)
    }

    /// The document re-rendered. The form model is rebuilt with carryover;
    /// the caller decides when to re-detect.
    pub fn replace_document(&mut self, html: String) {
        self.document_html = html;
        let doc = Html::parse_document(&self.document_html);
        self.form.rebuild(&doc);
    }
}
