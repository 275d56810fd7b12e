//! HTTP API for the speech-coach relays
//!
//! This module exposes the browser-facing REST surface:
//! - POST /speech/transcribe - Relay one audio upload to transcription
//! - POST /speech/feedback - Relay a transcript to feedback generation
//! - POST /speech/paragraph - Generate a practice paragraph
//! - POST /speech/process - Full transcribe-then-feedback pipeline
//! - POST /speech/record/start - Open a chunked recording session
//! - POST /speech/record/:id/chunk - Buffer one captured chunk
//! - POST /speech/record/:id/stop - Finalize and run the pipeline
//! - GET /speech/record/:id/status - Query session pipeline state
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, RecordSession};
