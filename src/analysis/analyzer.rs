use std::path::Path;

use console::style;

use super::categorize::{self, Categorization};
use super::features;
use super::rate::{self, SpeechRate};
use super::traits::{PersonalityTrait, TraitProfile};
use crate::audio::{self, levels::ClipLevels};
use crate::config::{AppConfig, CategoryThresholds};
use crate::error::{CompositionError, TranscriptionError, VoiceError};
use crate::llm::prompt::{self, PromptText};
use crate::speech::TranscriptionService;

/// Both analysis branches for one clip.
///
/// Decoding is shared, so a `Decode` error fails the whole analysis. After
/// that the branches are independent and a rate failure is kept alongside
/// the pitch/contrast result.
#[derive(Debug)]
pub struct VoiceAnalysis {
    pub levels: ClipLevels,
    pub categorization: Categorization,
    pub rate: Result<SpeechRate, VoiceError>,
}

impl VoiceAnalysis {
    pub fn into_prompt(self, thresholds: &CategoryThresholds) -> Result<PromptText, CompositionError> {
        prompt::compose_from_analysis(Ok(self.categorization), self.rate, thresholds)
    }
}

/// Decode once and run both branches.
///
/// Without a transcription service the rate branch fails with
/// `ServiceUnavailable`; the pitch/contrast result is still returned.
pub fn analyze_voice(
    audio_path: &Path,
    service: Option<&dyn TranscriptionService>,
    config: &AppConfig,
) -> Result<VoiceAnalysis, VoiceError> {
    let clip = audio::load_clip(audio_path)?;

    let levels = ClipLevels::measure(&clip.samples);
    if levels.is_near_silent() {
        log::warn!(
            "{} peaks at {:.1} dBFS; the recording may be muted",
            audio_path.display(),
            levels.peak_db
        );
    }

    let features = features::features_of(&clip, &config.analysis);
    let categorization = categorize::categorize_features(features, &config.thresholds);

    let rate = match service {
        Some(service) => rate::estimate_clip_rate(&clip, service, config),
        None => Err(VoiceError::Transcription(TranscriptionError::ServiceUnavailable(
            "no transcription service configured".into(),
        ))),
    };
    if let Err(e) = &rate {
        log::warn!("speech rate unavailable for {}: {e}", audio_path.display());
    }

    Ok(VoiceAnalysis {
        levels,
        categorization,
        rate,
    })
}

/// Print an analysis the way `voiceportrait analyze` shows it.
pub fn print_analysis(audio_path: &Path, analysis: &VoiceAnalysis, thresholds: &CategoryThresholds) {
    let c = &analysis.categorization;

    println!("Analyzed {}", style(audio_path.display()).cyan());
    println!();

    println!("  {} Pitch & timbre", style(">>").cyan());
    println!(
        "     Level:       peak {:.1} dBFS, RMS {:.1} dBFS",
        analysis.levels.peak_db, analysis.levels.rms_db
    );
    println!(
        "     Mean pitch:  {:.1} Hz  (category {}, {})",
        c.features.mean_pitch_hz,
        c.categories.pitch,
        c.categories.height()
    );
    println!(
        "     Contrast:    {:.2} dB  {}",
        c.features.mean_spectral_contrast,
        contrast_label(c)
    );
    println!("     Palette:     {}", c.lineage.instruction());
    println!();

    println!("  {} Speech rate", style(">>").cyan());
    match &analysis.rate {
        Ok(rate) => {
            let level = rate.level(thresholds);
            println!(
                "     Rate:        {:.2} syllables/s  (category {level})",
                rate.characters_per_second
            );
            println!(
                "     Speech:      {} syllables in {:.2}s ({}..{} ms)",
                rate.syllables,
                rate.span.duration_secs(),
                rate.span.start_ms,
                rate.span.end_ms
            );
            println!();
            print_traits(&TraitProfile::lookup(level, c.categories.pitch));
        }
        Err(e) => {
            println!("     {} {}", style("WARN").yellow(), error_chain(e));
        }
    }
}

fn print_traits(profile: &TraitProfile) {
    println!("  {} Personality", style(">>").cyan());
    for t in PersonalityTrait::ALL {
        let degree = profile.degree(t);
        println!("     {:<18} {}", t.name(), style(t.sentence(degree)).dim());
    }
}

fn contrast_label(c: &Categorization) -> String {
    let label = format!("({})", c.categories.contrast);
    match c.categories.contrast {
        categorize::Contrast::Clear => format!("{}", style(label).green()),
        categorize::Contrast::Husky => format!("{}", style(label).yellow()),
    }
}

/// "outer: inner: innermost" for a core error.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        msg.push_str(": ");
        msg.push_str(&inner.to_string());
        source = inner.source();
    }
    msg
}
