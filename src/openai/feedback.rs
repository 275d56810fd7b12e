use super::{transport_failure, upstream_failure, OpenAiClient};
use crate::error::{CoachError, Step};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Fixed system instruction establishing the assistant's role.
const SYSTEM_INSTRUCTION: &str =
    "You are an assistant that provides constructive feedback on speech performance.";

/// Fixed trailing instruction asking for compliments and tips.
const TIPS_INSTRUCTION: &str =
    "Provide compliments and improvement tips based on the speech performance.";

/// Output length cap for feedback generation.
const MAX_TOKENS: u32 = 150;

/// Fixed creativity parameter.
const TEMPERATURE: f64 = 0.7;

/// Feedback relay: transcript text in, speaking-performance feedback out.
#[async_trait]
pub trait GenerateFeedback: Send + Sync {
    async fn generate_feedback(&self, transcript: &str) -> Result<String, CoachError>;
}

/// Calls the OpenAI chat-completions endpoint with the fixed feedback prompt.
pub struct OpenAiFeedback {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiFeedback {
    pub fn new(client: Arc<OpenAiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl GenerateFeedback for OpenAiFeedback {
    /// The transcript is embedded verbatim in the user message; the prompt
    /// structure and generation parameters are fixed.
    async fn generate_feedback(&self, transcript: &str) -> Result<String, CoachError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                {
                    "role": "user",
                    "content": format!("Here is a transcription of a speech: \"{}\"", transcript)
                },
                { "role": "user", "content": TIPS_INSTRUCTION }
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        info!(
            "Generating feedback for {}-char transcript with model {}",
            transcript.len(),
            self.model
        );

        let response = self
            .client
            .post("/v1/chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_failure(Step::Feedback, e))?;

        if !response.status().is_success() {
            return Err(upstream_failure(Step::Feedback, response).await);
        }

        let body: ChatResponse = response.json().await.map_err(|e| CoachError::Parse {
            step: Step::Feedback,
            detail: e.to_string(),
        })?;

        let feedback = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CoachError::Parse {
                step: Step::Feedback,
                detail: "response contained no choices".to_string(),
            })?;

        Ok(feedback.trim().to_string())
    }
}
