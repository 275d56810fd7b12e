use crate::error::CoachError;
use tracing::warn;

/// Upload size ceiling: 25 MB, enforced before any network call.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Accepted audio formats for upload and recording.
///
/// Canonical allow-list: wav, mp3, m4a, aac, mp4, webm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Wav,
    Mp3,
    M4a,
    Aac,
    Mp4,
    Webm,
}

impl MediaType {
    /// Resolve from a declared MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        // Strip any parameters (e.g. "audio/webm;codecs=opus").
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        match essence.to_ascii_lowercase().as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(MediaType::Wav),
            "audio/mpeg" | "audio/mp3" => Some(MediaType::Mp3),
            "audio/m4a" | "audio/x-m4a" => Some(MediaType::M4a),
            "audio/aac" => Some(MediaType::Aac),
            "audio/mp4" | "video/mp4" => Some(MediaType::Mp4),
            "audio/webm" | "video/webm" => Some(MediaType::Webm),
            _ => None,
        }
    }

    /// Resolve from a file extension (fallback when no MIME type is declared).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" => Some(MediaType::Wav),
            "mp3" => Some(MediaType::Mp3),
            "m4a" => Some(MediaType::M4a),
            "aac" => Some(MediaType::Aac),
            "mp4" => Some(MediaType::Mp4),
            "webm" => Some(MediaType::Webm),
            _ => None,
        }
    }

    /// Canonical MIME type sent upstream with the audio part.
    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Wav => "audio/wav",
            MediaType::Mp3 => "audio/mpeg",
            MediaType::M4a => "audio/m4a",
            MediaType::Aac => "audio/aac",
            MediaType::Mp4 => "audio/mp4",
            MediaType::Webm => "audio/webm",
        }
    }

    /// File extension for the upstream filename.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaType::Wav => "wav",
            MediaType::Mp3 => "mp3",
            MediaType::M4a => "m4a",
            MediaType::Aac => "aac",
            MediaType::Mp4 => "mp4",
            MediaType::Webm => "webm",
        }
    }
}

/// In-memory audio bytes plus declared media type, scoped to one pipeline run.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub media_type: MediaType,
    pub file_name: String,
}

impl AudioPayload {
    pub fn new(bytes: Vec<u8>, media_type: MediaType, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type,
            file_name: file_name.into(),
        }
    }

    /// Validate an uploaded file and wrap it as a payload.
    ///
    /// The media type is resolved from the declared content type first, then
    /// from the file extension. Unsupported types and oversized or empty
    /// uploads are rejected here, before any network call.
    pub fn from_upload(
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Self, CoachError> {
        let media_type = content_type
            .and_then(MediaType::from_mime)
            .or_else(|| {
                file_name
                    .and_then(|n| n.rsplit_once('.'))
                    .and_then(|(_, ext)| MediaType::from_extension(ext))
            })
            .ok_or_else(|| {
                warn!(
                    "Rejected upload: unsupported type (content_type={:?}, file={:?})",
                    content_type, file_name
                );
                CoachError::InvalidInput(
                    "unsupported audio type; accepted: wav, mp3, m4a, aac, mp4, webm".to_string(),
                )
            })?;

        if bytes.is_empty() {
            return Err(CoachError::InvalidInput("empty audio upload".to_string()));
        }

        if bytes.len() > MAX_UPLOAD_BYTES {
            warn!(
                "Rejected upload: {} bytes exceeds {} byte limit",
                bytes.len(),
                MAX_UPLOAD_BYTES
            );
            return Err(CoachError::InvalidInput(format!(
                "audio file too large ({} bytes, limit {} bytes)",
                bytes.len(),
                MAX_UPLOAD_BYTES
            )));
        }

        let file_name = match file_name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("speech.{}", media_type.extension()),
        };

        Ok(Self {
            bytes,
            media_type,
            file_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_wav_upload() {
        let payload =
            AudioPayload::from_upload(Some("speech.wav"), Some("audio/wav"), vec![0u8; 2048])
                .unwrap();
        assert_eq!(payload.media_type, MediaType::Wav);
        assert_eq!(payload.file_name, "speech.wav");
        assert_eq!(payload.bytes.len(), 2048);
    }

    #[test]
    fn rejects_png_before_any_network_call() {
        let err = AudioPayload::from_upload(Some("image.png"), Some("image/png"), vec![0u8; 100])
            .unwrap_err();
        assert!(matches!(err, CoachError::InvalidInput(_)));
    }

    #[test]
    fn rejects_oversized_upload() {
        let err = AudioPayload::from_upload(
            Some("big.wav"),
            Some("audio/wav"),
            vec![0u8; MAX_UPLOAD_BYTES + 1],
        )
        .unwrap_err();
        assert!(matches!(err, CoachError::InvalidInput(_)));
    }

    #[test]
    fn rejects_empty_upload() {
        let err = AudioPayload::from_upload(Some("speech.wav"), Some("audio/wav"), vec![])
            .unwrap_err();
        assert!(matches!(err, CoachError::InvalidInput(_)));
    }

    #[test]
    fn falls_back_to_extension_when_mime_is_generic() {
        let payload = AudioPayload::from_upload(
            Some("clip.m4a"),
            Some("application/octet-stream"),
            vec![0u8; 10],
        )
        .unwrap();
        assert_eq!(payload.media_type, MediaType::M4a);
    }

    #[test]
    fn mime_parameters_are_ignored() {
        assert_eq!(
            MediaType::from_mime("audio/webm;codecs=opus"),
            Some(MediaType::Webm)
        );
    }

    #[test]
    fn generated_file_name_uses_extension() {
        let payload = AudioPayload::from_upload(None, Some("audio/mpeg"), vec![0u8; 10]).unwrap();
        assert_eq!(payload.file_name, "speech.mp3");
    }
}
