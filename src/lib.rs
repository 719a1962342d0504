//! Voice clip in, character portrait out.
//!
//! The deterministic core measures pitch, spectral contrast and speech rate,
//! buckets them into categories and looks up a personality profile that is
//! written into an image prompt. Text, image and transcription models sit
//! behind the [`llm::TextCompletion`], [`imagegen::ImageGeneration`] and
//! [`speech::TranscriptionService`] traits.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;
pub mod imagegen;
pub mod llm;
pub mod paths;
pub mod portrait;
pub mod speech;

pub use analysis::categorize::{categorize, Categorization, CategoryIndices, ColorLineage};
pub use analysis::features::{compute_features, AcousticFeatures};
pub use analysis::rate::{estimate_speech_rate, SpeechRate};
pub use error::{CompositionError, TranscriptionError, VoiceError};
pub use llm::prompt::{compose_prompt, PromptText};
