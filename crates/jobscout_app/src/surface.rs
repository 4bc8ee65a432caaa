use agent_logging::agent_info;
use jobscout_agent::{
    job_id_for_url, AgentRequest, AgentResponse, AutofillResult, CandidateProfileView,
    CommandError, PageState,
};

use crate::collaborators::{
    CollaboratorClient, CollaboratorError, ResumeGenerationReceipt, ResumeGenerationRequest,
    StatusUpsert,
};
use crate::tabs::TabHost;

/// Origin tag recorded on statuses this surface writes.
const STATUS_ORIGIN: &str = "extension";

/// Transient command surface: reads page-agent state, issues commands, and
/// forwards outcomes to the external collaborators.
pub struct ControlSurface {
    host: TabHost,
    collaborators: Option<CollaboratorClient>,
}

impl ControlSurface {
    pub fn new(host: TabHost, collaborators: Option<CollaboratorClient>) -> Self {
        Self {
            host,
            collaborators,
        }
    }

    pub fn host_mut(&mut self) -> &mut TabHost {
        &mut self.host
    }

    pub fn page_info(&mut self, tab_id: u64) -> Result<PageState, CommandError> {
        self.expect_page_info(tab_id, AgentRequest::GetPageInfo)
    }

    pub fn force_detect(&mut self, tab_id: u64) -> Result<PageState, CommandError> {
        self.expect_page_info(tab_id, AgentRequest::ForceDetect)
    }

    pub fn autofill(
        &mut self,
        tab_id: u64,
        profile: CandidateProfileView,
    ) -> Result<AutofillResult, CommandError> {
        match self.host.send_command(tab_id, AgentRequest::Autofill { profile })? {
            AgentResponse::AutofillDone(result) => {
                agent_info!(
                    "tab {tab_id}: autofill filled={} skipped={}",
                    result.filled,
                    result.skipped
                );
                Ok(result)
            }
            AgentResponse::PageInfo(_) => Err(CommandError::Disconnected),
        }
    }

    /// Job id for the page's apply URL; computed lazily, never stored.
    pub fn job_id_for(&self, state: &PageState) -> Option<String> {
        state
            .extracted
            .as_ref()
            .and_then(|info| job_id_for_url(&info.apply_url))
    }

    /// Records an application status against the detected job.
    pub async fn save_status(
        &self,
        state: &PageState,
        status: &str,
    ) -> Result<(), SurfaceError> {
        let job_id = self.job_id_for(state).ok_or(SurfaceError::NoJobId)?;
        let client = self
            .collaborators
            .as_ref()
            .ok_or(SurfaceError::NotConfigured)?;
        client
            .upsert_status(&StatusUpsert {
                job_id,
                status: status.to_string(),
                origin: STATUS_ORIGIN.to_string(),
            })
            .await?;
        Ok(())
    }

    /// Kicks off remote resume generation for the detected job.
    pub async fn generate_resume(
        &self,
        state: &PageState,
        match_score: Option<f32>,
        match_reasons: Option<Vec<String>>,
    ) -> Result<ResumeGenerationReceipt, SurfaceError> {
        let job_id = self.job_id_for(state).ok_or(SurfaceError::NoJobId)?;
        let client = self
            .collaborators
            .as_ref()
            .ok_or(SurfaceError::NotConfigured)?;
        let receipt = client
            .generate_resume(&ResumeGenerationRequest {
                job_id,
                match_score,
                match_reasons,
            })
            .await?;
        Ok(receipt)
    }

    /// Fetches the compiled document for a generated application.
    pub async fn download_document(
        &self,
        application_id: &str,
    ) -> Result<Vec<u8>, SurfaceError> {
        let client = self
            .collaborators
            .as_ref()
            .ok_or(SurfaceError::NotConfigured)?;
        Ok(client.download_document(application_id).await?)
    }

    fn expect_page_info(
        &mut self,
        tab_id: u64,
        request: AgentRequest,
    ) -> Result<PageState, CommandError> {
        match self.host.send_command(tab_id, request)? {
            AgentResponse::PageInfo(state) => Ok(state),
            AgentResponse::AutofillDone(_) => Err(CommandError::Disconnected),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// The page has no usable apply URL to derive a job id from.
    #[error("no job id available for this page")]
    NoJobId,
    #[error("no collaborator endpoint configured")]
    NotConfigured,
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
