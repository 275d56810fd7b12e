use thiserror::Error;

/// Which upstream relay an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Transcription,
    Feedback,
    Paragraph,
}

impl Step {
    /// Operation name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Transcription => "transcription",
            Step::Feedback => "feedback",
            Step::Paragraph => "paragraph",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors surfaced by the speech pipeline and its HTTP handlers.
#[derive(Debug, Error)]
pub enum CoachError {
    /// Bad input caught before any network call (wrong file type, oversized
    /// upload, unknown paragraph mode, malformed request body).
    #[error("{0}")]
    InvalidInput(String),

    /// Microphone access was refused when starting a recording.
    #[error("microphone access denied")]
    PermissionDenied,

    /// A pipeline run is already processing; new captures are rejected
    /// rather than queued or cancelled (reject-concurrent policy).
    #[error("a pipeline run is already processing")]
    Busy,

    /// The upstream provider returned a non-success response (or the request
    /// timed out). Carries the provider's message when one was parseable.
    #[error("{step} request failed: {message}")]
    Upstream {
        step: Step,
        /// Upstream HTTP status, if a response was received at all.
        status: Option<u16>,
        message: String,
    },

    /// The provider responded 2xx but the body did not match the expected
    /// wire format.
    #[error("failed to parse {step} response: {detail}")]
    Parse { step: Step, detail: String },

    /// Unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}

impl CoachError {
    /// Message suitable for the user-facing `{ "error": ... }` body.
    ///
    /// For upstream failures this is the provider's own message, matching
    /// what the caller would have seen talking to the provider directly.
    pub fn user_message(&self) -> String {
        match self {
            CoachError::Upstream { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names() {
        assert_eq!(Step::Transcription.name(), "transcription");
        assert_eq!(Step::Feedback.name(), "feedback");
        assert_eq!(Step::Paragraph.name(), "paragraph");
    }

    #[test]
    fn upstream_user_message_is_provider_message() {
        let err = CoachError::Upstream {
            step: Step::Transcription,
            status: Some(500),
            message: "server error".to_string(),
        };
        assert_eq!(err.user_message(), "server error");
    }

    #[test]
    fn busy_user_message_names_the_in_flight_run() {
        assert_eq!(
            CoachError::Busy.user_message(),
            "a pipeline run is already processing"
        );
    }

    #[test]
    fn invalid_input_user_message_is_display() {
        let err = CoachError::InvalidInput("unsupported audio type".to_string());
        assert_eq!(err.user_message(), "unsupported audio type");
    }
}
