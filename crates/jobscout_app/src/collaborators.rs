use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Remote services the control surface talks to. Opaque to the core: it only
/// supplies the job id and fields they need.
#[derive(Debug, Clone)]
pub struct CollaboratorConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
}

impl CollaboratorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Request for the AI resume-generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeGenerationRequest {
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_reasons: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeGenerationReceipt {
    pub application_id: String,
    pub gen_id: String,
}

/// Upsert of a tracked application's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpsert {
    pub job_id: String,
    pub status: String,
    pub origin: String,
}

pub struct CollaboratorClient {
    config: CollaboratorConfig,
    client: reqwest::Client,
}

impl CollaboratorClient {
    pub fn new(config: CollaboratorConfig) -> Result<Self, CollaboratorError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| CollaboratorError::Network(err.to_string()))?;
        Ok(Self { config, client })
    }

    pub async fn generate_resume(
        &self,
        request: &ResumeGenerationRequest,
    ) -> Result<ResumeGenerationReceipt, CollaboratorError> {
        let bytes = self
            .post_json("applications/generate", request)
            .await?;
        serde_json::from_slice(&bytes)
            .map_err(|err| CollaboratorError::InvalidResponse(err.to_string()))
    }

    /// Downloads the compiled document for one application as raw bytes.
    pub async fn download_document(
        &self,
        application_id: &str,
    ) -> Result<Vec<u8>, CollaboratorError> {
        let url = self.endpoint(&format!("applications/{application_id}/document"));
        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|err| CollaboratorError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::HttpStatus(status.as_u16()));
        }
        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|err| CollaboratorError::Network(err.to_string()))
    }

    pub async fn upsert_status(&self, request: &StatusUpsert) -> Result<(), CollaboratorError> {
        self.post_json("jobs/status", request).await.map(|_| ())
    }

    async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Vec<u8>, CollaboratorError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| CollaboratorError::InvalidResponse(err.to_string()))?;
        let response = self
            .authorized(
                self.client
                    .post(self.endpoint(path))
                    .header(CONTENT_TYPE, "application/json")
                    .body(payload),
            )
            .send()
            .await
            .map_err(|err| CollaboratorError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::HttpStatus(status.as_u16()));
        }
        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|err| CollaboratorError::Network(err.to_string()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.auth_token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}
