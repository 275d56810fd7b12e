use super::state::PipelineState;
use crate::audio::AudioPayload;
use crate::error::CoachError;
use crate::openai::{GenerateFeedback, Transcribe};
use std::sync::Arc;
use tracing::{error, info};

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub transcript: String,
    pub feedback: String,
}

/// Drives one capture → transcribe → feedback run at a time.
///
/// Owns the session's [`PipelineState`]; constructed per HTTP request or per
/// recording session, never process-wide. Steps run strictly sequentially:
/// feedback is only requested after transcription succeeds, and any failure
/// aborts the run (fail-fast, errors propagate — no placeholder feedback).
///
/// Concurrency policy: a new capture while a run is `Processing` is rejected
/// rather than queued or cancelled.
pub struct PipelineController {
    state: PipelineState,
    transcriber: Arc<dyn Transcribe>,
    feedback: Arc<dyn GenerateFeedback>,
}

impl PipelineController {
    pub fn new(transcriber: Arc<dyn Transcribe>, feedback: Arc<dyn GenerateFeedback>) -> Self {
        Self {
            state: PipelineState::Idle,
            transcriber,
            feedback,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Begin a new capture, discarding any prior terminal state.
    ///
    /// Rejected while a run is `Processing`.
    pub fn begin_capture(&mut self) -> Result<(), CoachError> {
        if self.state.is_processing() {
            return Err(CoachError::Busy);
        }

        self.state = PipelineState::Capturing;
        Ok(())
    }

    /// Run transcription then feedback on the captured payload.
    ///
    /// The payload is consumed; on any step failure the state becomes
    /// `Failed` with that step's message and later steps are skipped.
    pub async fn run(&mut self, payload: AudioPayload) -> Result<PipelineOutcome, CoachError> {
        if self.state.is_processing() {
            return Err(CoachError::Busy);
        }

        self.state = PipelineState::Processing;
        info!("Pipeline run started: {} byte payload", payload.bytes.len());

        let transcript = match self.transcriber.transcribe(&payload).await {
            Ok(text) => text,
            Err(e) => {
                error!("Pipeline failed at transcription: {}", e);
                self.state = PipelineState::Failed(e.user_message());
                return Err(e);
            }
        };

        let feedback = match self.feedback.generate_feedback(&transcript).await {
            Ok(text) => text,
            Err(e) => {
                error!("Pipeline failed at feedback: {}", e);
                self.state = PipelineState::Failed(e.user_message());
                return Err(e);
            }
        };

        info!("Pipeline run succeeded");
        self.state = PipelineState::Succeeded {
            transcript: transcript.clone(),
            feedback: feedback.clone(),
        };

        Ok(PipelineOutcome {
            transcript,
            feedback,
        })
    }
}
