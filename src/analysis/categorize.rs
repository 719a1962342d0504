use std::fmt;
use std::path::Path;

use serde::Serialize;

use super::features::{self, AcousticFeatures};
use crate::config::{AppConfig, CategoryThresholds};
use crate::error::VoiceError;

/// Ordinal bucket 0..=3 for pitch or speech rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Level {
    Zero,
    One,
    Two,
    Three,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Zero, Level::One, Level::Two, Level::Three];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Pitch bucketing: the first breakpoint the value does not exceed.
    /// A value equal to a breakpoint stays in the lower bucket.
    pub fn at_or_below(value: f32, breakpoints: &[f32; 3]) -> Level {
        breakpoints
            .iter()
            .position(|&bp| value <= bp)
            .map_or(Level::Three, |i| Level::ALL[i])
    }

    /// Rate bucketing: the first breakpoint the value is strictly under.
    /// A value equal to a breakpoint moves up to the next bucket.
    pub fn below(value: f64, breakpoints: &[f64; 3]) -> Level {
        breakpoints
            .iter()
            .position(|&bp| value < bp)
            .map_or(Level::Three, |i| Level::ALL[i])
    }

    /// Pitch categories 0-1 read as low, 2-3 as high.
    pub fn height(self) -> PitchHeight {
        match self {
            Level::Zero | Level::One => PitchHeight::Low,
            Level::Two | Level::Three => PitchHeight::High,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Contrast {
    Husky,
    Clear,
}

impl Contrast {
    /// Husky at or below the threshold, clear above it.
    pub fn classify(mean_spectral_contrast: f32, threshold: f32) -> Contrast {
        if mean_spectral_contrast <= threshold {
            Contrast::Husky
        } else {
            Contrast::Clear
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Contrast::Husky => "husky",
            Contrast::Clear => "clear",
        }
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PitchHeight {
    Low,
    High,
}

impl PitchHeight {
    pub fn label(self) -> &'static str {
        match self {
            PitchHeight::Low => "low pitch",
            PitchHeight::High => "high pitch",
        }
    }
}

impl fmt::Display for PitchHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Color-family hint for the image model, one per (contrast, height) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorLineage {
    /// husky, low
    BlueViolet,
    /// husky, high
    RoseGold,
    /// clear, low
    RedGreen,
    /// clear, high
    LightBlueSilver,
}

impl ColorLineage {
    pub fn select(contrast: Contrast, height: PitchHeight) -> ColorLineage {
        match (contrast, height) {
            (Contrast::Husky, PitchHeight::Low) => ColorLineage::BlueViolet,
            (Contrast::Husky, PitchHeight::High) => ColorLineage::RoseGold,
            (Contrast::Clear, PitchHeight::Low) => ColorLineage::RedGreen,
            (Contrast::Clear, PitchHeight::High) => ColorLineage::LightBlueSilver,
        }
    }

    /// The prompt line naming the candidate colors. The image prompts were
    /// written against these exact strings, stray spacing included.
    pub fn instruction(self) -> &'static str {
        match self {
            ColorLineage::BlueViolet => {
                "Choose one image color from [navy, cobalt blue, Lavender, Violet ]"
            }
            ColorLineage::RoseGold => "Choose one image color from [rose pink, coral pink, yellow, gold]",
            ColorLineage::RedGreen => {
                "Choose one image color from [Red, Green, emerald green, , light brown]"
            }
            ColorLineage::LightBlueSilver => {
                "Choose one image color from [Light Blue, turquoise blue, white, silver]"
            }
        }
    }
}

impl fmt::Display for ColorLineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.instruction())
    }
}

/// The categories that come from pitch and contrast alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoiceCategories {
    pub pitch: Level,
    pub contrast: Contrast,
}

impl VoiceCategories {
    pub fn height(&self) -> PitchHeight {
        self.pitch.height()
    }

    pub fn lineage(&self) -> ColorLineage {
        ColorLineage::select(self.contrast, self.height())
    }

    /// Complete the set once the speech rate is known.
    pub fn with_rate(self, rate: Level) -> CategoryIndices {
        CategoryIndices {
            pitch: self.pitch,
            contrast: self.contrast,
            rate,
        }
    }
}

/// Everything the trait tables and the prompt are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryIndices {
    pub pitch: Level,
    pub contrast: Contrast,
    pub rate: Level,
}

impl CategoryIndices {
    pub fn height(&self) -> PitchHeight {
        self.pitch.height()
    }

    pub fn lineage(&self) -> ColorLineage {
        ColorLineage::select(self.contrast, self.height())
    }
}

/// Result of [`categorize`]: the categories plus what they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Categorization {
    pub categories: VoiceCategories,
    pub features: AcousticFeatures,
    pub lineage: ColorLineage,
}

pub fn categorize_features(features: AcousticFeatures, thresholds: &CategoryThresholds) -> Categorization {
    let categories = VoiceCategories {
        pitch: Level::at_or_below(features.mean_pitch_hz, &thresholds.pitch_hz),
        contrast: Contrast::classify(features.mean_spectral_contrast, thresholds.contrast),
    };
    Categorization {
        categories,
        features,
        lineage: categories.lineage(),
    }
}

/// Bucket a speech rate (syllables per second).
pub fn rate_level(chars_per_second: f64, thresholds: &CategoryThresholds) -> Level {
    Level::below(chars_per_second, &thresholds.rate_cps)
}

/// Decode a clip, compute its features and bucket them.
pub fn categorize(audio_path: &Path, config: &AppConfig) -> Result<Categorization, VoiceError> {
    let features = features::compute_features(audio_path, &config.analysis)?;
    let result = categorize_features(features, &config.thresholds);
    log::info!(
        "categorized {}: pitch {:.1} Hz -> {}, contrast {:.2} -> {}",
        audio_path.display(),
        features.mean_pitch_hz,
        result.categories.pitch,
        features.mean_spectral_contrast,
        result.categories.contrast
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> CategoryThresholds {
        CategoryThresholds::default()
    }

    fn features(pitch: f32, contrast: f32) -> AcousticFeatures {
        AcousticFeatures {
            mean_pitch_hz: pitch,
            mean_spectral_contrast: contrast,
        }
    }

    #[test]
    fn pitch_breakpoints_are_inclusive_upper_bounds() {
        let bp = thresholds().pitch_hz;
        let cases = [
            (0.0, Level::Zero),
            (154.0, Level::Zero),
            (154.01, Level::One),
            (175.0, Level::One),
            (175.5, Level::Two),
            (214.0, Level::Two),
            (214.1, Level::Three),
            (390.0, Level::Three),
        ];
        for (hz, expected) in cases {
            assert_eq!(Level::at_or_below(hz, &bp), expected, "pitch {hz}");
        }
    }

    #[test]
    fn rate_breakpoints_are_inclusive_lower_bounds() {
        let t = thresholds();
        let cases = [
            (0.0, Level::Zero),
            (5.69, Level::Zero),
            (5.7, Level::One),
            (6.59, Level::One),
            (6.6, Level::Two),
            (7.09, Level::Two),
            (7.1, Level::Three),
            (12.0, Level::Three),
        ];
        for (cps, expected) in cases {
            assert_eq!(rate_level(cps, &t), expected, "rate {cps}");
        }
    }

    #[test]
    fn rate_just_under_a_breakpoint_stays_below() {
        let t = thresholds();
        // 1352 syllables over 237.193 s is 5.6999995..., which rounds to 5.7 in f32
        let cps = 1352.0 / 237.193;
        assert!(cps < 5.7);
        assert_eq!(rate_level(cps, &t), Level::Zero);
        // One ulp below each positive breakpoint
        let under = |bp: f64| f64::from_bits(bp.to_bits() - 1);
        assert_eq!(rate_level(under(5.7), &t), Level::Zero);
        assert_eq!(rate_level(under(6.6), &t), Level::One);
        assert_eq!(rate_level(under(7.1), &t), Level::Two);
    }

    #[test]
    fn contrast_boundary_is_husky() {
        assert_eq!(Contrast::classify(23.5, 23.5), Contrast::Husky);
        assert_eq!(Contrast::classify(23.51, 23.5), Contrast::Clear);
        assert_eq!(Contrast::classify(10.0, 23.5), Contrast::Husky);
    }

    #[test]
    fn pitch_height_split() {
        assert_eq!(Level::Zero.height(), PitchHeight::Low);
        assert_eq!(Level::One.height(), PitchHeight::Low);
        assert_eq!(Level::Two.height(), PitchHeight::High);
        assert_eq!(Level::Three.height(), PitchHeight::High);
    }

    #[test]
    fn clear_low_voice_scenario() {
        let result = categorize_features(features(160.0, 25.0), &thresholds());
        assert_eq!(result.categories.pitch, Level::One);
        assert_eq!(result.categories.height(), PitchHeight::Low);
        assert_eq!(result.categories.contrast, Contrast::Clear);
        assert_eq!(rate_level(6.0, &thresholds()), Level::One);
        assert_eq!(result.lineage, ColorLineage::RedGreen);
        assert_eq!(
            result.lineage.instruction(),
            "Choose one image color from [Red, Green, emerald green, , light brown]"
        );
    }

    #[test]
    fn husky_high_voice_scenario() {
        let result = categorize_features(features(220.0, 20.0), &thresholds());
        assert_eq!(result.categories.pitch, Level::Three);
        assert_eq!(result.categories.height(), PitchHeight::High);
        assert_eq!(result.categories.contrast, Contrast::Husky);
        assert_eq!(rate_level(7.5, &thresholds()), Level::Three);
        assert_eq!(result.lineage, ColorLineage::RoseGold);
        assert_eq!(
            result.lineage.instruction(),
            "Choose one image color from [rose pink, coral pink, yellow, gold]"
        );
    }

    #[test]
    fn no_voiced_frames_is_lowest_pitch() {
        let result = categorize_features(features(0.0, 30.0), &thresholds());
        assert_eq!(result.categories.pitch, Level::Zero);
    }

    #[test]
    fn lineage_table_covers_all_cells() {
        let cells = [
            (Contrast::Husky, PitchHeight::Low, "[navy, cobalt blue, Lavender, Violet ]"),
            (Contrast::Husky, PitchHeight::High, "[rose pink, coral pink, yellow, gold]"),
            (Contrast::Clear, PitchHeight::Low, "[Red, Green, emerald green, , light brown]"),
            (Contrast::Clear, PitchHeight::High, "[Light Blue, turquoise blue, white, silver]"),
        ];
        for (contrast, height, colors) in cells {
            let line = ColorLineage::select(contrast, height).instruction();
            assert_eq!(line, format!("Choose one image color from {colors}"));
        }
    }

    #[test]
    fn recalibrated_thresholds_are_honoured() {
        let custom = CategoryThresholds {
            pitch_hz: [100.0, 120.0, 140.0],
            rate_cps: [4.0, 5.0, 6.0],
            contrast: 30.0,
        };
        let result = categorize_features(features(160.0, 25.0), &custom);
        assert_eq!(result.categories.pitch, Level::Three);
        assert_eq!(result.categories.contrast, Contrast::Husky);
        assert_eq!(rate_level(6.0, &custom), Level::Three);
    }

    #[test]
    fn with_rate_completes_indices() {
        let categories = VoiceCategories {
            pitch: Level::Two,
            contrast: Contrast::Clear,
        };
        let indices = categories.with_rate(Level::Zero);
        assert_eq!(indices.rate, Level::Zero);
        assert_eq!(indices.lineage(), categories.lineage());
    }

    #[test]
    fn categorize_is_deterministic() {
        use std::f32::consts::PI;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.wav");
        let samples: Vec<f32> = (0..16000)
            .map(|i| {
                let t = i as f32 / 16000.0;
                0.3 * (2.0 * PI * 180.0 * t).sin() + 0.1 * (2.0 * PI * 360.0 * t).sin()
            })
            .collect();
        crate::audio::wav::write_mono(&path, &samples, 16000).unwrap();

        let config = AppConfig::default();
        let first = categorize(&path, &config).unwrap();
        let second = categorize(&path, &config).unwrap();
        assert_eq!(first.categories, second.categories);
        assert_eq!(first.features, second.features);
    }
}
