use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured job fields pulled from one page. All fields are independently
/// optional; source pages vary too much for any required-field invariant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobInfo {
    pub title: String,
    pub company: String,
    pub location: String,
    pub jd_text: String,
    pub apply_url: String,
    pub page_url: String,
}

/// Detection snapshot owned by the page agent for its page's lifetime.
/// Replaced wholesale on every (re-)detection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageState {
    pub is_job: bool,
    pub extracted: Option<JobInfo>,
    pub detected_at_utc: String,
    pub last_error: Option<String>,
}

/// Flat, read-only projection of the stored candidate profile. This is the
/// only profile shape the page agent ever sees.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CandidateProfileView {
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
    pub college: String,
    pub degree: String,
    pub branch: String,
    pub end_year: String,
    /// Already joined into one display string by the profile owner.
    pub skills: String,
    pub summary: String,
}

/// Outcome of one autofill command. Purely informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutofillResult {
    pub filled: usize,
    pub skipped: usize,
}

/// Summary signal broadcast by the page agent after each detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentEvent {
    Detection { is_job: bool },
}

/// Transport failures surfaced to command senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The target tab has no page agent to receive the command.
    #[error("no receiving end in target tab")]
    NoReceiver,
    /// The agent went away after accepting the command, before replying.
    #[error("page agent disconnected before replying")]
    Disconnected,
}
