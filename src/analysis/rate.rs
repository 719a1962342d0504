use std::path::Path;

use serde::Serialize;

use super::categorize::{rate_level, Level};
use crate::audio::{self, wav, AudioClip};
use crate::config::{AppConfig, CategoryThresholds};
use crate::dsp::silence::{self, SilenceConfig, VoiceSpan};
use crate::error::VoiceError;
use crate::speech::TranscriptionService;

/// Syllables per second over the trimmed speech span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeechRate {
    pub characters_per_second: f64,
    pub syllables: usize,
    pub span: VoiceSpan,
}

impl SpeechRate {
    /// A zero-length span has no rate; this never divides by zero.
    pub fn from_span(syllables: usize, span: VoiceSpan) -> Result<Self, VoiceError> {
        let duration = span.duration_secs();
        if span.duration_ms() == 0 {
            return Err(VoiceError::RateUndefined {
                start_ms: span.start_ms,
                end_ms: span.end_ms,
            });
        }
        Ok(Self {
            characters_per_second: syllables as f64 / duration,
            syllables,
            span,
        })
    }

    pub fn level(&self, thresholds: &CategoryThresholds) -> Level {
        rate_level(self.characters_per_second, thresholds)
    }
}

/// Trim the clip to its speech, transcribe that part and compute the rate.
///
/// The zero-duration check runs before the service is contacted, so an
/// empty span never costs a network call.
pub fn estimate_clip_rate(
    clip: &AudioClip,
    service: &dyn TranscriptionService,
    config: &AppConfig,
) -> Result<SpeechRate, VoiceError> {
    let silence_config: SilenceConfig = (&config.analysis).into();
    let span = silence::find_voice_span(&clip.samples, clip.sample_rate, &silence_config)?;

    if span.duration_ms() == 0 {
        return Err(VoiceError::RateUndefined {
            start_ms: span.start_ms,
            end_ms: span.end_ms,
        });
    }

    let wav_bytes = stage_sub_clip(clip.slice_ms(span.start_ms, span.end_ms), clip.sample_rate)?;
    log::info!(
        "transcribing {:.2}s of speech ({}..{} ms)",
        span.duration_secs(),
        span.start_ms,
        span.end_ms
    );

    let syllables = service.transcribe(&wav_bytes, &config.services.language)?;
    let rate = SpeechRate::from_span(syllables, span)?;
    log::info!(
        "speech rate: {} syllables / {:.2}s = {:.2}/s",
        syllables,
        span.duration_secs(),
        rate.characters_per_second
    );
    Ok(rate)
}

/// Decode `audio_path` and estimate its speech rate.
pub fn estimate_speech_rate(
    audio_path: &Path,
    service: &dyn TranscriptionService,
    config: &AppConfig,
) -> Result<SpeechRate, VoiceError> {
    let clip = audio::load_clip(audio_path)?;
    estimate_clip_rate(&clip, service, config)
}

/// Write the sub-clip to a scoped temp WAV and read it back as bytes.
/// The file is removed when `staged` drops, on every path out.
fn stage_sub_clip(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, VoiceError> {
    let staged = tempfile::Builder::new()
        .prefix("voiceportrait-")
        .suffix(".wav")
        .tempfile()
        .map_err(VoiceError::Staging)?;

    wav::write_mono(staged.path(), samples, sample_rate)
        .map_err(|e| VoiceError::Staging(std::io::Error::other(e)))?;

    std::fs::read(staged.path()).map_err(VoiceError::Staging)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranscriptionError;
    use std::cell::{Cell, RefCell};
    use std::f32::consts::PI;
    use std::io::Cursor;

    const SR: u32 = 16000;

    /// Returns a fixed count and records what it was sent.
    struct FakeTranscriber {
        syllables: usize,
        calls: Cell<usize>,
        sent_samples: RefCell<Vec<usize>>,
        language: RefCell<String>,
    }

    impl FakeTranscriber {
        fn new(syllables: usize) -> Self {
            Self {
                syllables,
                calls: Cell::new(0),
                sent_samples: RefCell::new(Vec::new()),
                language: RefCell::new(String::new()),
            }
        }
    }

    impl TranscriptionService for FakeTranscriber {
        fn transcribe(&self, wav_bytes: &[u8], language: &str) -> Result<usize, TranscriptionError> {
            self.calls.set(self.calls.get() + 1);
            let reader = hound::WavReader::new(Cursor::new(wav_bytes)).unwrap();
            assert_eq!(reader.spec().channels, 1);
            self.sent_samples.borrow_mut().push(reader.len() as usize);
            *self.language.borrow_mut() = language.to_string();
            Ok(self.syllables)
        }
    }

    struct FailingTranscriber;

    impl TranscriptionService for FailingTranscriber {
        fn transcribe(&self, _: &[u8], _: &str) -> Result<usize, TranscriptionError> {
            Err(TranscriptionError::UnrecognizedSpeech)
        }
    }

    fn padded_speech() -> AudioClip {
        let mut samples = vec![0.0; SR as usize / 2];
        samples.extend((0..SR).map(|i| 0.5 * (2.0 * PI * 150.0 * i as f32 / SR as f32).sin()));
        samples.extend(vec![0.0; SR as usize / 2]);
        AudioClip::new(samples, SR)
    }

    #[test]
    fn rate_over_trimmed_span() {
        let service = FakeTranscriber::new(6);
        let rate = estimate_clip_rate(&padded_speech(), &service, &AppConfig::default()).unwrap();

        assert_eq!(rate.syllables, 6);
        assert!((rate.characters_per_second - 6.0).abs() < 0.05);
        assert_eq!(rate.level(&CategoryThresholds::default()), Level::One);

        // Only the ~1 s of speech was sent, not the padding
        let sent = service.sent_samples.borrow()[0];
        assert!(sent.abs_diff(SR as usize) < 100, "sent {sent} samples");
        assert_eq!(*service.language.borrow(), "ja");
    }

    #[test]
    fn fast_speech_is_top_category() {
        let service = FakeTranscriber::new(8);
        let rate = estimate_clip_rate(&padded_speech(), &service, &AppConfig::default()).unwrap();
        assert_eq!(rate.level(&CategoryThresholds::default()), Level::Three);
    }

    #[test]
    fn zero_duration_span_is_undefined() {
        let service = FakeTranscriber::new(5);
        let empty = AudioClip::new(Vec::new(), SR);

        let err = estimate_clip_rate(&empty, &service, &AppConfig::default()).unwrap_err();
        assert!(matches!(err, VoiceError::RateUndefined { start_ms: 0, end_ms: 0 }));
        assert_eq!(service.calls.get(), 0);
    }

    #[test]
    fn from_span_rejects_zero_duration() {
        let span = VoiceSpan {
            start_ms: 300,
            end_ms: 300,
        };
        let err = SpeechRate::from_span(4, span).unwrap_err();
        assert!(matches!(err, VoiceError::RateUndefined { .. }));
    }

    #[test]
    fn from_span_is_finite() {
        let span = VoiceSpan {
            start_ms: 0,
            end_ms: 1,
        };
        let rate = SpeechRate::from_span(3, span).unwrap();
        assert!(rate.characters_per_second.is_finite());
        assert!((rate.characters_per_second - 3000.0).abs() < 1e-6);
    }

    #[test]
    fn silent_clip_never_reaches_the_service() {
        let service = FakeTranscriber::new(5);
        let silent = AudioClip::new(vec![0.0; SR as usize], SR);

        let err = estimate_clip_rate(&silent, &service, &AppConfig::default()).unwrap_err();
        assert!(matches!(err, VoiceError::SilenceDetectionExhausted { .. }));
        assert_eq!(service.calls.get(), 0);
    }

    #[test]
    fn transcription_failure_propagates() {
        let err = estimate_clip_rate(&padded_speech(), &FailingTranscriber, &AppConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            VoiceError::Transcription(TranscriptionError::UnrecognizedSpeech)
        ));
    }

    #[test]
    fn estimates_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.wav");
        let clip = padded_speech();
        wav::write_mono(&path, &clip.samples, clip.sample_rate).unwrap();

        let service = FakeTranscriber::new(7);
        let rate = estimate_speech_rate(&path, &service, &AppConfig::default()).unwrap();
        assert!((rate.characters_per_second - 7.0).abs() < 0.05);
    }
}
