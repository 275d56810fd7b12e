pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod openai;
pub mod pipeline;

pub use audio::{AudioPayload, MediaType, MicrophoneAccess, Recorder, RecorderState};
pub use config::Config;
pub use error::{CoachError, Step};
pub use http::{create_router, AppState};
pub use openai::{
    GenerateFeedback, GenerateParagraph, OpenAiClient, OpenAiFeedback, OpenAiParagraph,
    OpenAiTranscription, Style, Transcribe,
};
pub use pipeline::{PipelineController, PipelineOutcome, PipelineState};
