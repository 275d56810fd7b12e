use super::{transport_failure, upstream_failure, OpenAiClient};
use crate::error::{CoachError, Step};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Output length cap for paragraph generation.
const MAX_TOKENS: u32 = 100;

/// Fixed creativity parameter.
const TEMPERATURE: f64 = 0.7;

/// Practice-paragraph style selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Casual,
    Formal,
}

impl Style {
    /// Fixed instruction template for the chosen style.
    pub fn prompt(&self) -> &'static str {
        match self {
            Style::Casual => "Generate a casual paragraph for someone to read aloud.",
            Style::Formal => "Generate a formal paragraph for someone to read aloud.",
        }
    }
}

impl FromStr for Style {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Casual" => Ok(Style::Casual),
            "Formal" => Ok(Style::Formal),
            other => Err(CoachError::InvalidInput(format!(
                "invalid mode \"{}\"; expected \"Casual\" or \"Formal\"",
                other
            ))),
        }
    }
}

/// Practice-paragraph relay: style in, trimmed paragraph text out.
#[async_trait]
pub trait GenerateParagraph: Send + Sync {
    async fn generate_paragraph(&self, style: Style) -> Result<String, CoachError>;
}

/// Calls the OpenAI text-completions endpoint with the style's template.
pub struct OpenAiParagraph {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiParagraph {
    pub fn new(client: Arc<OpenAiClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[async_trait]
impl GenerateParagraph for OpenAiParagraph {
    async fn generate_paragraph(&self, style: Style) -> Result<String, CoachError> {
        let body = json!({
            "model": self.model,
            "prompt": style.prompt(),
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
        });

        info!("Generating {:?} practice paragraph with model {}", style, self.model);

        let response = self
            .client
            .post("/v1/completions")
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_failure(Step::Paragraph, e))?;

        if !response.status().is_success() {
            return Err(upstream_failure(Step::Paragraph, response).await);
        }

        let body: CompletionResponse = response.json().await.map_err(|e| CoachError::Parse {
            step: Step::Paragraph,
            detail: e.to_string(),
        })?;

        let paragraph = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| CoachError::Parse {
                step: Step::Paragraph,
                detail: "response contained no choices".to_string(),
            })?;

        Ok(paragraph.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casual_and_formal_parse() {
        assert_eq!("Casual".parse::<Style>().unwrap(), Style::Casual);
        assert_eq!("Formal".parse::<Style>().unwrap(), Style::Formal);
    }

    #[test]
    fn unknown_mode_is_invalid_input() {
        let err = "Loud".parse::<Style>().unwrap_err();
        assert!(matches!(err, CoachError::InvalidInput(_)));
    }

    #[test]
    fn mode_matching_is_case_sensitive() {
        assert!("casual".parse::<Style>().is_err());
    }

    #[test]
    fn prompts_mention_reading_aloud() {
        assert!(Style::Casual.prompt().contains("casual"));
        assert!(Style::Formal.prompt().contains("formal"));
        assert!(Style::Casual.prompt().ends_with("read aloud."));
    }
}
