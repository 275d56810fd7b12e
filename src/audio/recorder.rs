use super::payload::{AudioPayload, MediaType, MAX_UPLOAD_BYTES};
use crate::error::CoachError;
use tracing::{info, warn};

/// Recording lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Stopped,
}

/// Gate for microphone access, checked when a recording starts.
///
/// The HTTP layer uses [`GrantedAccess`] (the remote client has already
/// captured the audio it streams up); tests exercise the denial path.
pub trait MicrophoneAccess: Send + Sync {
    fn request(&self) -> Result<(), CoachError>;
}

/// Access gate that always grants.
pub struct GrantedAccess;

impl MicrophoneAccess for GrantedAccess {
    fn request(&self) -> Result<(), CoachError> {
        Ok(())
    }
}

/// Buffers captured audio chunks into exactly one payload per recording.
///
/// State machine: `Idle → Recording → Stopped`. Only one recording may be
/// active at a time; `start` while already recording is a no-op.
pub struct Recorder {
    state: RecorderState,
    media_type: MediaType,
    chunks: Vec<Vec<u8>>,
    buffered_bytes: usize,
}

impl Recorder {
    pub fn new(media_type: MediaType) -> Self {
        Self {
            state: RecorderState::Idle,
            media_type,
            chunks: Vec::new(),
            buffered_bytes: 0,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffered_bytes
    }

    /// Request microphone access and begin buffering.
    ///
    /// On denial the recorder stays `Idle` and the error is
    /// [`CoachError::PermissionDenied`].
    pub fn start(&mut self, mic: &dyn MicrophoneAccess) -> Result<(), CoachError> {
        if self.state == RecorderState::Recording {
            warn!("Recording already started");
            return Ok(());
        }

        mic.request()?;

        self.chunks.clear();
        self.buffered_bytes = 0;
        self.state = RecorderState::Recording;
        info!("Recording started ({})", self.media_type.mime());
        Ok(())
    }

    /// Buffer one captured chunk. The cumulative size cap matches the upload
    /// ceiling so a finalized recording is always a valid payload.
    pub fn push_chunk(&mut self, chunk: Vec<u8>) -> Result<(), CoachError> {
        if self.state != RecorderState::Recording {
            return Err(CoachError::InvalidInput(
                "recorder is not recording".to_string(),
            ));
        }

        if self.buffered_bytes + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(CoachError::InvalidInput(format!(
                "recording too large (limit {} bytes)",
                MAX_UPLOAD_BYTES
            )));
        }

        self.buffered_bytes += chunk.len();
        self.chunks.push(chunk);
        Ok(())
    }

    /// Finalize buffered chunks into one payload and transition to `Stopped`.
    pub fn stop(&mut self) -> Result<AudioPayload, CoachError> {
        if self.state != RecorderState::Recording {
            return Err(CoachError::InvalidInput(
                "recorder is not recording".to_string(),
            ));
        }

        self.state = RecorderState::Stopped;

        let mut bytes = Vec::with_capacity(self.buffered_bytes);
        for chunk in self.chunks.drain(..) {
            bytes.extend_from_slice(&chunk);
        }
        self.buffered_bytes = 0;

        if bytes.is_empty() {
            return Err(CoachError::InvalidInput(
                "recording contained no audio data".to_string(),
            ));
        }

        info!("Recording stopped: {} bytes buffered", bytes.len());

        Ok(AudioPayload::new(
            bytes,
            self.media_type,
            format!("speech.{}", self.media_type.extension()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DeniedAccess;

    impl MicrophoneAccess for DeniedAccess {
        fn request(&self) -> Result<(), CoachError> {
            Err(CoachError::PermissionDenied)
        }
    }

    #[test]
    fn starts_and_buffers_into_one_payload() {
        let mut recorder = Recorder::new(MediaType::Webm);
        recorder.start(&GrantedAccess).unwrap();
        assert_eq!(recorder.state(), RecorderState::Recording);

        recorder.push_chunk(vec![1, 2, 3]).unwrap();
        recorder.push_chunk(vec![4, 5]).unwrap();
        assert_eq!(recorder.buffered_bytes(), 5);

        let payload = recorder.stop().unwrap();
        assert_eq!(recorder.state(), RecorderState::Stopped);
        assert_eq!(payload.bytes, vec![1, 2, 3, 4, 5]);
        assert_eq!(payload.media_type, MediaType::Webm);
    }

    #[test]
    fn permission_denied_keeps_recorder_idle() {
        let mut recorder = Recorder::new(MediaType::Wav);
        let err = recorder.start(&DeniedAccess).unwrap_err();
        assert!(matches!(err, CoachError::PermissionDenied));
        assert_eq!(recorder.state(), RecorderState::Idle);
    }

    #[test]
    fn start_while_recording_is_a_no_op() {
        let mut recorder = Recorder::new(MediaType::Wav);
        recorder.start(&GrantedAccess).unwrap();
        recorder.push_chunk(vec![9]).unwrap();

        // Second start must not clear the buffer.
        recorder.start(&GrantedAccess).unwrap();
        assert_eq!(recorder.state(), RecorderState::Recording);
        assert_eq!(recorder.buffered_bytes(), 1);
    }

    #[test]
    fn chunk_outside_recording_is_rejected() {
        let mut recorder = Recorder::new(MediaType::Wav);
        let err = recorder.push_chunk(vec![1]).unwrap_err();
        assert!(matches!(err, CoachError::InvalidInput(_)));
    }

    #[test]
    fn stop_without_start_is_rejected() {
        let mut recorder = Recorder::new(MediaType::Wav);
        assert!(recorder.stop().is_err());
    }

    #[test]
    fn empty_recording_is_rejected_on_stop() {
        let mut recorder = Recorder::new(MediaType::Wav);
        recorder.start(&GrantedAccess).unwrap();
        let err = recorder.stop().unwrap_err();
        assert!(matches!(err, CoachError::InvalidInput(_)));
    }

    #[test]
    fn cumulative_size_cap_is_enforced() {
        let mut recorder = Recorder::new(MediaType::Wav);
        recorder.start(&GrantedAccess).unwrap();
        recorder.push_chunk(vec![0u8; MAX_UPLOAD_BYTES]).unwrap();
        let err = recorder.push_chunk(vec![0u8; 1]).unwrap_err();
        assert!(matches!(err, CoachError::InvalidInput(_)));
    }

    #[test]
    fn restart_after_stop_begins_a_fresh_recording() {
        let mut recorder = Recorder::new(MediaType::Wav);
        recorder.start(&GrantedAccess).unwrap();
        recorder.push_chunk(vec![1]).unwrap();
        recorder.stop().unwrap();

        recorder.start(&GrantedAccess).unwrap();
        assert_eq!(recorder.state(), RecorderState::Recording);
        assert_eq!(recorder.buffered_bytes(), 0);
    }
}
