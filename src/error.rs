use std::path::PathBuf;

use thiserror::Error;

/// Failures of the analysis core.
///
/// Pitch/contrast extraction and speech-rate estimation fail independently,
/// so each branch returns its own `Result<_, VoiceError>` and the caller
/// decides what still makes sense to do with the other half.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The audio file could not be opened or decoded.
    #[error("Failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// Even the most permissive silence threshold found no speech.
    #[error("No speech found in clip (tried silence thresholds down to {floor_db:.0} dBFS)")]
    SilenceDetectionExhausted { floor_db: f32 },

    #[error("Transcription failed")]
    Transcription(#[source] TranscriptionError),

    /// The detected speech span has zero length, so a per-second rate
    /// cannot be computed.
    #[error("Speech rate undefined: voice span {start_ms}..{end_ms} ms has zero duration")]
    RateUndefined { start_ms: u64, end_ms: u64 },

    /// The trimmed sub-clip could not be staged for the transcription service.
    #[error("Failed to stage sub-clip for transcription")]
    Staging(#[source] std::io::Error),
}

impl VoiceError {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        VoiceError::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<TranscriptionError> for VoiceError {
    fn from(e: TranscriptionError) -> Self {
        VoiceError::Transcription(e)
    }
}

/// Errors reported by a [`TranscriptionService`](crate::speech::TranscriptionService).
#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The service answered but found no intelligible speech.
    #[error("Speech was not recognized")]
    UnrecognizedSpeech,

    /// Transport failure, non-success status, or an unparseable reply.
    #[error("Transcription service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<reqwest::Error> for TranscriptionError {
    fn from(e: reqwest::Error) -> Self {
        TranscriptionError::ServiceUnavailable(e.to_string())
    }
}

/// The trait prompt needs both analysis branches; this carries whichever
/// one failed.
#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("Cannot compose prompt: pitch/contrast analysis failed")]
    Features(#[source] VoiceError),

    #[error("Cannot compose prompt: speech rate estimation failed")]
    Rate(#[source] VoiceError),
}

impl CompositionError {
    /// The underlying analysis failure.
    pub fn cause(&self) -> &VoiceError {
        match self {
            CompositionError::Features(e) | CompositionError::Rate(e) => e,
        }
    }
}
