pub mod kana;
pub mod whisper;

use crate::error::TranscriptionError;

/// Turns recorded speech into a count of pronounced syllabic units.
///
/// `wav_bytes` is a complete 16-bit mono WAV file. For Japanese the count is
/// the number of kana in the reading, not the number of written characters.
pub trait TranscriptionService {
    fn transcribe(&self, wav_bytes: &[u8], language: &str) -> Result<usize, TranscriptionError>;
}
