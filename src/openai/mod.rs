//! Relay clients for the upstream OpenAI HTTP API.
//!
//! One async trait per operation so the pipeline and HTTP handlers can be
//! tested against mocks:
//! - [`Transcribe`] — multipart audio → transcript text
//! - [`GenerateFeedback`] — transcript → speaking-performance feedback
//! - [`GenerateParagraph`] — style → practice paragraph

pub mod feedback;
pub mod paragraph;
pub mod transcription;

pub use feedback::{GenerateFeedback, OpenAiFeedback};
pub use paragraph::{GenerateParagraph, OpenAiParagraph, Style};
pub use transcription::{OpenAiTranscription, Transcribe};

use crate::config::OpenAiConfig;
use crate::error::{CoachError, Step};
use std::time::Duration;
use tracing::error;

/// Shared HTTP plumbing for the OpenAI relays: one pooled client with a
/// bounded per-request timeout, plus base URL and credential.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, CoachError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoachError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
    }
}

/// Convert a non-success upstream response into the step's error, extracting
/// the provider's `error.message` when the body is parseable.
pub(crate) async fn upstream_failure(step: Step, response: reqwest::Response) -> CoachError {
    let status = response.status().as_u16();
    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{} request failed with status {}", step, status));

    error!("OpenAI {} error: status {} - {}", step, status, message);

    CoachError::Upstream {
        step,
        status: Some(status),
        message,
    }
}

/// Convert a transport-level failure (connection refused, timeout) into the
/// step's error. Timeouts come from the client-level bound, single attempt.
pub(crate) fn transport_failure(step: Step, err: reqwest::Error) -> CoachError {
    let message = if err.is_timeout() {
        format!("{} request timed out", step)
    } else {
        format!("{} request failed: {}", step, err)
    };

    error!("OpenAI {} transport error: {}", step, message);

    CoachError::Upstream {
        step,
        status: None,
        message,
    }
}
