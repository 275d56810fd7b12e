use crate::audio::Recorder;
use crate::config::Config;
use crate::error::CoachError;
use crate::openai::{
    GenerateFeedback, GenerateParagraph, OpenAiClient, OpenAiFeedback, OpenAiParagraph,
    OpenAiTranscription, Transcribe,
};
use crate::pipeline::PipelineController;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// One active recording session: the recorder buffering uploaded chunks plus
/// the pipeline controller that runs once the recording stops.
pub struct RecordSession {
    pub recorder: Recorder,
    pub pipeline: PipelineController,
}

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub transcriber: Arc<dyn Transcribe>,
    pub feedback: Arc<dyn GenerateFeedback>,
    pub paragraph: Arc<dyn GenerateParagraph>,

    /// Recording sessions (session_id → session). Sessions stay in the map
    /// after stopping so the status endpoint can report terminal state.
    pub sessions: Arc<RwLock<HashMap<String, Arc<Mutex<RecordSession>>>>>,
}

impl AppState {
    /// Wire the real OpenAI relays from configuration.
    pub fn from_config(config: &Config) -> Result<Self, CoachError> {
        let client = Arc::new(OpenAiClient::new(&config.openai)?);

        Ok(Self::new(
            Arc::new(OpenAiTranscription::new(
                Arc::clone(&client),
                config.openai.transcription_model.clone(),
            )),
            Arc::new(OpenAiFeedback::new(
                Arc::clone(&client),
                config.openai.feedback_model.clone(),
            )),
            Arc::new(OpenAiParagraph::new(
                client,
                config.openai.paragraph_model.clone(),
            )),
        ))
    }

    /// Assemble state from explicit clients (used by tests with mocks).
    pub fn new(
        transcriber: Arc<dyn Transcribe>,
        feedback: Arc<dyn GenerateFeedback>,
        paragraph: Arc<dyn GenerateParagraph>,
    ) -> Self {
        Self {
            transcriber,
            feedback,
            paragraph,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
