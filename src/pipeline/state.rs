/// States of one capture → transcribe → feedback run.
///
/// ```text
/// Idle ──capture begins──▶ Capturing ──payload ready──▶ Processing
/// Processing ──both steps succeed──▶ Succeeded
/// Processing ──any step fails─────▶ Failed
/// Succeeded / Failed ──next capture──▶ Capturing
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    /// No run started yet.
    Idle,

    /// Audio is being captured (upload in flight or recorder buffering).
    Capturing,

    /// Upstream relays are running; new captures are rejected until a
    /// terminal state is reached.
    Processing,

    /// Terminal: both transcript and feedback are ready for display.
    Succeeded { transcript: String, feedback: String },

    /// Terminal: the failing step's message, later steps were skipped.
    Failed(String),
}

impl PipelineState {
    /// `true` while a run is executing and must not be displaced.
    pub fn is_processing(&self) -> bool {
        matches!(self, PipelineState::Processing)
    }

    /// `true` once a run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Succeeded { .. } | PipelineState::Failed(_))
    }

    /// Short label for status reporting.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Capturing => "capturing",
            PipelineState::Processing => "processing",
            PipelineState::Succeeded { .. } => "succeeded",
            PipelineState::Failed(_) => "failed",
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        PipelineState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(PipelineState::default(), PipelineState::Idle);
    }

    #[test]
    fn only_processing_is_processing() {
        assert!(PipelineState::Processing.is_processing());
        assert!(!PipelineState::Idle.is_processing());
        assert!(!PipelineState::Capturing.is_processing());
        assert!(!PipelineState::Failed("x".to_string()).is_processing());
    }

    #[test]
    fn terminal_states() {
        assert!(PipelineState::Failed("x".to_string()).is_terminal());
        assert!(PipelineState::Succeeded {
            transcript: "t".to_string(),
            feedback: "f".to_string()
        }
        .is_terminal());
        assert!(!PipelineState::Idle.is_terminal());
        assert!(!PipelineState::Processing.is_terminal());
    }

    #[test]
    fn labels() {
        assert_eq!(PipelineState::Idle.label(), "idle");
        assert_eq!(PipelineState::Capturing.label(), "capturing");
        assert_eq!(PipelineState::Processing.label(), "processing");
        assert_eq!(PipelineState::Failed("x".to_string()).label(), "failed");
    }
}
