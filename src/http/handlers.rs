use super::state::{AppState, RecordSession};
use crate::audio::{AudioPayload, GrantedAccess, MediaType, Recorder};
use crate::error::CoachError;
use crate::openai::Style;
use crate::pipeline::{PipelineController, PipelineState};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcription: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
}

#[derive(Debug, Serialize)]
pub struct ParagraphResponse {
    pub paragraph: String,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub transcription: String,
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct StartRecordingRequest {
    /// Declared media type of the incoming chunks (MIME or extension).
    /// Defaults to webm, the browser MediaRecorder default.
    pub media_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartRecordingResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub session_id: String,
    pub buffered_bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct RecordStatusResponse {
    pub session_id: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffered_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for CoachError {
    fn into_response(self) -> Response {
        let status = match &self {
            CoachError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CoachError::PermissionDenied => StatusCode::FORBIDDEN,
            CoachError::Busy => StatusCode::CONFLICT,
            // Relay the provider's status when one was received.
            CoachError::Upstream { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            CoachError::Parse { .. } => StatusCode::BAD_GATEWAY,
            CoachError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorResponse {
                error: self.user_message(),
            }),
        )
            .into_response()
    }
}

fn session_not_found(session_id: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Session {} not found", session_id),
        }),
    )
        .into_response()
}

fn session_busy() -> Response {
    CoachError::Busy.into_response()
}

/// Pull the first uploaded file out of the multipart form; any further file
/// parts are never read.
async fn first_audio_file(multipart: &mut Multipart) -> Result<AudioPayload, CoachError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CoachError::InvalidInput(format!("error parsing form data: {}", e)))?
    {
        if field.name() != Some("file") && field.file_name().is_none() {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| CoachError::InvalidInput(format!("error reading file data: {}", e)))?
            .to_vec();

        return AudioPayload::from_upload(file_name.as_deref(), content_type.as_deref(), bytes);
    }

    Err(CoachError::InvalidInput("no file uploaded".to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// POST /speech/transcribe
/// Relay one uploaded audio file to the transcription endpoint.
pub async fn transcribe_speech(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, CoachError> {
    let payload = first_audio_file(&mut multipart).await?;
    let transcription = state.transcriber.transcribe(&payload).await?;

    info!("Transcription complete: {} chars", transcription.len());
    Ok(Json(TranscribeResponse { transcription }))
}

/// POST /speech/feedback
/// Relay a transcript to the feedback endpoint.
pub async fn generate_feedback(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<FeedbackResponse>, CoachError> {
    let transcription = body
        .get("transcription")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CoachError::InvalidInput("invalid transcription data".to_string()))?;

    let feedback = state.feedback.generate_feedback(transcription).await?;

    info!("Feedback generated: {} chars", feedback.len());
    Ok(Json(FeedbackResponse { feedback }))
}

/// POST /speech/paragraph
/// Generate a practice paragraph for the requested style.
pub async fn generate_paragraph(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<ParagraphResponse>, CoachError> {
    let mode = body
        .get("mode")
        .and_then(|v| v.as_str())
        .ok_or_else(|| CoachError::InvalidInput("invalid mode".to_string()))?;

    // Validated before any network call.
    let style: Style = mode.parse()?;
    let paragraph = state.paragraph.generate_paragraph(style).await?;

    Ok(Json(ParagraphResponse { paragraph }))
}

/// POST /speech/process
/// Full pipeline for one uploaded file: transcribe, then feedback.
///
/// A fresh controller per request keeps pipeline state request-scoped.
pub async fn process_speech(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, CoachError> {
    let mut pipeline = PipelineController::new(
        Arc::clone(&state.transcriber),
        Arc::clone(&state.feedback),
    );
    pipeline.begin_capture()?;

    let payload = first_audio_file(&mut multipart).await?;
    let outcome = pipeline.run(payload).await?;

    Ok(Json(ProcessResponse {
        transcription: outcome.transcript,
        feedback: outcome.feedback,
    }))
}

/// POST /speech/record/start
/// Open a recording session that buffers uploaded chunks.
pub async fn start_recording(
    State(state): State<AppState>,
    body: Result<Json<StartRecordingRequest>, JsonRejection>,
) -> Result<Json<StartRecordingResponse>, CoachError> {
    let request = match body {
        Ok(Json(request)) => Some(request),
        // No JSON body at all: fall back to defaults.
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        // A body was sent but could not be parsed.
        Err(rejection) => {
            return Err(CoachError::InvalidInput(format!(
                "malformed request body: {}",
                rejection.body_text()
            )))
        }
    };

    let media_type = match request.as_ref().and_then(|r| r.media_type.as_deref()) {
        Some(raw) => MediaType::from_mime(raw)
            .or_else(|| MediaType::from_extension(raw))
            .ok_or_else(|| {
                CoachError::InvalidInput(format!("unsupported media type \"{}\"", raw))
            })?,
        None => MediaType::Webm,
    };

    let session_id = format!("rec-{}", uuid::Uuid::new_v4());

    let mut recorder = Recorder::new(media_type);
    recorder.start(&GrantedAccess)?;

    let mut pipeline = PipelineController::new(
        Arc::clone(&state.transcriber),
        Arc::clone(&state.feedback),
    );
    pipeline.begin_capture()?;

    {
        let mut sessions = state.sessions.write().await;
        sessions.insert(
            session_id.clone(),
            Arc::new(Mutex::new(RecordSession { recorder, pipeline })),
        );
    }

    info!("Recording session started: {}", session_id);

    Ok(Json(StartRecordingResponse {
        session_id,
        status: "recording".to_string(),
    }))
}

/// POST /speech/record/:session_id/chunk
/// Buffer one chunk of captured audio.
pub async fn push_chunk(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Response {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&session_id).cloned()
    };

    let Some(session) = session else {
        return session_not_found(&session_id);
    };

    let Ok(mut session) = session.try_lock() else {
        return session_busy();
    };

    match session.recorder.push_chunk(body.to_vec()) {
        Ok(()) => {
            let buffered_bytes = session.recorder.buffered_bytes();
            (
                StatusCode::OK,
                Json(ChunkResponse {
                    session_id,
                    buffered_bytes,
                }),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /speech/record/:session_id/stop
/// Finalize the buffered chunks and run the pipeline on the result.
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&session_id).cloned()
    };

    let Some(session) = session else {
        return session_not_found(&session_id);
    };

    // Reject-concurrent: a stop while this session's run is in flight is
    // refused rather than queued.
    let Ok(mut session) = session.try_lock() else {
        return session_busy();
    };

    info!("Stopping recording session: {}", session_id);

    let payload = match session.recorder.stop() {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };

    match session.pipeline.run(payload).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ProcessResponse {
                transcription: outcome.transcript,
                feedback: outcome.feedback,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /speech/record/:session_id/status
/// Report the session's pipeline state. Re-rendering from this endpoint
/// never issues upstream calls.
pub async fn record_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&session_id).cloned()
    };

    let Some(session) = session else {
        return session_not_found(&session_id);
    };

    // Bind the lock result so the guard's borrow of the session ends before
    // the function returns.
    let guard = session.try_lock();
    match guard {
        Ok(session) => {
            let (transcription, feedback, error) = match session.pipeline.state() {
                PipelineState::Succeeded {
                    transcript,
                    feedback,
                } => (Some(transcript.clone()), Some(feedback.clone()), None),
                PipelineState::Failed(message) => (None, None, Some(message.clone())),
                _ => (None, None, None),
            };

            Json(RecordStatusResponse {
                session_id,
                state: session.pipeline.state().label().to_string(),
                buffered_bytes: Some(session.recorder.buffered_bytes()),
                transcription,
                feedback,
                error,
            })
            .into_response()
        }
        // The run holds the session lock while upstream calls are in flight.
        Err(_) => Json(RecordStatusResponse {
            session_id,
            state: "processing".to_string(),
            buffered_bytes: None,
            transcription: None,
            feedback: None,
            error: None,
        })
        .into_response(),
    }
}
