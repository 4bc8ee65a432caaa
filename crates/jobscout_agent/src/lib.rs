//! Jobscout agent: in-page job detection, extraction and form autofill.
mod agent;
mod autofill;
mod classify;
mod detect;
mod dom;
mod form;
mod inject;
mod jobid;
mod label;
mod runtime;
mod schema;
mod types;

pub use agent::{AgentConfig, PageAgent};
pub use autofill::autofill_pass;
pub use classify::{classify, signature_for, ProfileField};
pub use detect::{detect_page, url_matches_ats, MAX_JD_TEXT};
pub use form::{ControlKind, DispatchedEvent, FormControl, FormState, SelectOption, ValueTracker};
pub use inject::inject_value;
pub use jobid::{job_id_for_url, normalize_apply_url};
pub use label::resolve_label;
pub use runtime::{AgentHandle, AgentRequest, AgentResponse};
pub use schema::{job_posting_record, JobPostingRecord};
pub use types::{
    AgentEvent, AutofillResult, CandidateProfileView, CommandError, JobInfo, PageState,
};
