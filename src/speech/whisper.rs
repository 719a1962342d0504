use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::kana;
use super::TranscriptionService;
use crate::error::TranscriptionError;
use crate::llm::{self, openai, TextCompletion};

const API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

const READING_SYSTEM_PROMPT: &str = "You convert Japanese text into its hiragana reading. \
Reply with the reading only, written entirely in hiragana, keeping any Latin letters and digits as they are. \
Do not add punctuation, explanations or quotes.";

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// OpenAI speech-to-text, with a text model supplying kana readings.
///
/// The transcript comes back in ordinary Japanese orthography. Kanji carry
/// no syllable count of their own, so when the transcript contains any, the
/// reader model rewrites it in hiragana before counting.
pub struct WhisperTranscriber {
    api_key: String,
    model: String,
    http: reqwest::Client,
    reader: Box<dyn TextCompletion>,
}

impl WhisperTranscriber {
    pub fn new(api_key: String, model: String, reader: Box<dyn TextCompletion>) -> Self {
        Self {
            api_key,
            model,
            http: reqwest::Client::new(),
            reader,
        }
    }

    /// Uses `OPENAI_API_KEY`.
    pub fn from_env(model: &str, reader: Box<dyn TextCompletion>) -> anyhow::Result<Self> {
        let api_key = llm::provider::env_key("OPENAI_API_KEY")?;
        Ok(Self::new(api_key, model.to_string(), reader))
    }

    async fn request_transcript(&self, wav_bytes: &[u8], language: &str) -> Result<String, TranscriptionError> {
        let file = Part::bytes(wav_bytes.to_vec())
            .file_name("speech.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("language", language.to_string())
            .text("response_format", "json");

        let response = self
            .http
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TranscriptionError::ServiceUnavailable(format!(
                "OpenAI transcription error ({status}): {}",
                openai::error_message(&body)
            )));
        }

        parse_transcript(&body)
    }

    fn reading_of(&self, transcript: &str) -> Result<String, TranscriptionError> {
        self.reader
            .complete(READING_SYSTEM_PROMPT, transcript)
            .map(|reading| reading.trim().to_string())
            .map_err(|e| TranscriptionError::ServiceUnavailable(format!("reading lookup failed: {e:#}")))
    }
}

impl TranscriptionService for WhisperTranscriber {
    fn transcribe(&self, wav_bytes: &[u8], language: &str) -> Result<usize, TranscriptionError> {
        let transcript = llm::block_on(self.request_transcript(wav_bytes, language))
            .map_err(|e| TranscriptionError::ServiceUnavailable(format!("{e:#}")))??;
        log::info!("transcript: {transcript}");

        let reading = if kana::needs_reading(&transcript) {
            let reading = self.reading_of(&transcript)?;
            log::debug!("reading: {reading}");
            reading
        } else {
            transcript
        };

        syllables_in(&reading)
    }
}

fn parse_transcript(body: &str) -> Result<String, TranscriptionError> {
    let parsed: TranscriptionResponse = serde_json::from_str(body).map_err(|e| {
        TranscriptionError::ServiceUnavailable(format!("unparseable transcription response: {e}"))
    })?;

    let text = parsed.text.trim();
    if text.is_empty() {
        return Err(TranscriptionError::UnrecognizedSpeech);
    }
    Ok(text.to_string())
}

/// A reading with nothing countable left in it was not speech.
fn syllables_in(reading: &str) -> Result<usize, TranscriptionError> {
    match kana::count_syllabic_units(reading) {
        0 => Err(TranscriptionError::UnrecognizedSpeech),
        n => Ok(n),
    }
}
