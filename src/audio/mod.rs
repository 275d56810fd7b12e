pub mod payload;
pub mod recorder;

pub use payload::{AudioPayload, MediaType, MAX_UPLOAD_BYTES};
pub use recorder::{GrantedAccess, MicrophoneAccess, Recorder, RecorderState};
