use std::path::Path;

use serde::Serialize;

use crate::audio::{self, AudioClip};
use crate::config::AnalysisConfig;
use crate::dsp::contrast::{self, ContrastConfig};
use crate::dsp::pitch::{self, PitchConfig};
use crate::error::VoiceError;

/// Whole-clip acoustic summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AcousticFeatures {
    /// Mean of the voiced pitch frames; 0.0 when no frame was voiced.
    pub mean_pitch_hz: f32,
    /// Mean spectral contrast over all bands and frames, in dB.
    pub mean_spectral_contrast: f32,
}

/// Pitch and contrast of an already-decoded clip.
///
/// Both are plain means over the entire clip, silence included. The
/// category thresholds were calibrated on exactly these averages.
pub fn features_of(clip: &AudioClip, config: &AnalysisConfig) -> AcousticFeatures {
    let pitch_config: PitchConfig = config.into();
    let contrast_config: ContrastConfig = config.into();

    let contour = pitch::extract_pitch_contour(&clip.samples, clip.sample_rate, &pitch_config);
    log::debug!(
        "pitch: {} frames, {:.0}% voiced",
        contour.len(),
        pitch::voiced_fraction(&contour) * 100.0
    );

    AcousticFeatures {
        mean_pitch_hz: pitch::mean_pitch(&contour),
        mean_spectral_contrast: contrast::mean_spectral_contrast(
            &clip.samples,
            clip.sample_rate,
            &contrast_config,
        ),
    }
}

/// Decode `audio_path` and compute its [`AcousticFeatures`].
pub fn compute_features(audio_path: &Path, config: &AnalysisConfig) -> Result<AcousticFeatures, VoiceError> {
    let clip = audio::load_clip(audio_path)?;
    Ok(features_of(&clip, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone_clip(freq_hz: f32, sample_rate: u32, secs: f32) -> AudioClip {
        let n = (sample_rate as f32 * secs) as usize;
        let samples = (0..n)
            .map(|i| 0.4 * (2.0 * PI * freq_hz * i as f32 / sample_rate as f32).sin())
            .collect();
        AudioClip::new(samples, sample_rate)
    }

    #[test]
    fn tone_pitch_is_measured() {
        let clip = tone_clip(200.0, 22050, 1.0);
        let features = features_of(&clip, &AnalysisConfig::default());
        assert!(
            (features.mean_pitch_hz - 200.0).abs() < 5.0,
            "got {:.1} Hz",
            features.mean_pitch_hz
        );
        assert!(features.mean_spectral_contrast > 0.0);
    }

    #[test]
    fn silent_clip_has_zero_pitch() {
        let clip = AudioClip::new(vec![0.0; 22050], 22050);
        let features = features_of(&clip, &AnalysisConfig::default());
        assert_eq!(features.mean_pitch_hz, 0.0);
        assert_eq!(features.mean_spectral_contrast, 0.0);
    }

    #[test]
    fn computes_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let clip = tone_clip(150.0, 16000, 0.8);
        crate::audio::wav::write_mono(&path, &clip.samples, clip.sample_rate).unwrap();

        let features = compute_features(&path, &AnalysisConfig::default()).unwrap();
        assert!((features.mean_pitch_hz - 150.0).abs() < 5.0);
    }

    #[test]
    fn unreadable_file_is_decode_error() {
        let err = compute_features(Path::new("/nonexistent/clip.wav"), &AnalysisConfig::default())
            .unwrap_err();
        assert!(matches!(err, VoiceError::Decode { .. }));
    }
}
