use super::{transport_failure, upstream_failure, OpenAiClient};
use crate::audio::AudioPayload;
use crate::error::{CoachError, Step};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Speech-to-text relay: one audio payload in, plain transcript text out.
#[async_trait]
pub trait Transcribe: Send + Sync {
    async fn transcribe(&self, payload: &AudioPayload) -> Result<String, CoachError>;
}

/// Calls the OpenAI audio-transcriptions endpoint (Whisper wire format).
pub struct OpenAiTranscription {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiTranscription {
    pub fn new(client: Arc<OpenAiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[async_trait]
impl Transcribe for OpenAiTranscription {
    /// Submit the payload as a multipart form. Single attempt, no retries.
    ///
    /// Empty transcript text is a valid result, not an error.
    async fn transcribe(&self, payload: &AudioPayload) -> Result<String, CoachError> {
        let part = reqwest::multipart::Part::bytes(payload.bytes.clone())
            .file_name(payload.file_name.clone())
            .mime_str(payload.media_type.mime())
            .map_err(|e| CoachError::Internal(format!("invalid audio part: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "json");

        info!(
            "Transcribing {} bytes ({}) with model {}",
            payload.bytes.len(),
            payload.media_type.mime(),
            self.model
        );

        let response = self
            .client
            .post("/v1/audio/transcriptions")
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_failure(Step::Transcription, e))?;

        if !response.status().is_success() {
            return Err(upstream_failure(Step::Transcription, response).await);
        }

        let body: TranscriptionResponse = response.json().await.map_err(|e| CoachError::Parse {
            step: Step::Transcription,
            detail: e.to_string(),
        })?;

        Ok(body.text.trim().to_string())
    }
}
