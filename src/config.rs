use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dsp::contrast::ContrastConfig;
use crate::dsp::pitch::PitchConfig;
use crate::dsp::silence::SilenceConfig;
use crate::paths;

/// Application configuration, loaded from `<config dir>/config.toml`.
///
/// Every section is `#[serde(default)]`, so a file only needs the values it
/// changes and a missing file means factory settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub thresholds: CategoryThresholds,
    pub services: ServiceConfig,
}

/// DSP parameters for feature extraction and trimming.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub pitch_floor_hz: f32,
    pub pitch_ceiling_hz: f32,
    pub frame_size_ms: f32,
    pub hop_size_ms: f32,
    pub power_threshold: f64,
    pub clarity_threshold: f64,

    pub contrast_n_fft: usize,
    pub contrast_hop_length: usize,
    pub contrast_fmin_hz: f32,
    pub contrast_bands: usize,

    pub silence_threshold_db: f32,
    pub silence_relax_step_db: f32,
    pub silence_floor_db: f32,
    pub min_silence_ms: u64,
}

/// Breakpoints that turn continuous measurements into categories.
///
/// These were tuned against whole-clip averages; changing how features are
/// averaged means retuning these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryThresholds {
    /// Mean pitch (Hz). A value at or below breakpoint i is category i.
    pub pitch_hz: [f32; 3],
    /// Syllables per second. A value at or above breakpoint i is at least
    /// category i + 1.
    pub rate_cps: [f64; 3],
    /// Mean spectral contrast at or below this is "husky".
    pub contrast: f32,
}

/// External service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Text completion provider: "claude" or "gpt".
    pub text_provider: String,
    pub transcription_model: String,
    /// Language hint passed to the transcription service.
    pub language: String,
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    /// Expression variants generated after the base portrait.
    pub expressions: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let pitch = PitchConfig::default();
        let contrast = ContrastConfig::default();
        let silence = SilenceConfig::default();
        Self {
            pitch_floor_hz: pitch.pitch_floor_hz,
            pitch_ceiling_hz: pitch.pitch_ceiling_hz,
            frame_size_ms: pitch.frame_size_ms,
            hop_size_ms: pitch.hop_size_ms,
            power_threshold: pitch.power_threshold,
            clarity_threshold: pitch.clarity_threshold,
            contrast_n_fft: contrast.n_fft,
            contrast_hop_length: contrast.hop_length,
            contrast_fmin_hz: contrast.fmin_hz,
            contrast_bands: contrast.n_bands,
            silence_threshold_db: silence.threshold_db,
            silence_relax_step_db: silence.relax_step_db,
            silence_floor_db: silence.floor_db,
            min_silence_ms: silence.min_silence_ms,
        }
    }
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self {
            pitch_hz: [154.0, 175.0, 214.0],
            rate_cps: [5.7, 6.6, 7.1],
            contrast: 23.5,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            text_provider: "gpt".into(),
            transcription_model: "whisper-1".into(),
            language: "ja".into(),
            image_model: "dall-e-3".into(),
            image_size: "1024x1024".into(),
            image_quality: "hd".into(),
            expressions: ["serious", "grinning", "winking", "laughing", "smiling"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl From<&AnalysisConfig> for PitchConfig {
    fn from(cfg: &AnalysisConfig) -> Self {
        PitchConfig {
            pitch_floor_hz: cfg.pitch_floor_hz,
            pitch_ceiling_hz: cfg.pitch_ceiling_hz,
            frame_size_ms: cfg.frame_size_ms,
            hop_size_ms: cfg.hop_size_ms,
            power_threshold: cfg.power_threshold,
            clarity_threshold: cfg.clarity_threshold,
        }
    }
}

impl From<&AnalysisConfig> for ContrastConfig {
    fn from(cfg: &AnalysisConfig) -> Self {
        ContrastConfig {
            n_fft: cfg.contrast_n_fft,
            hop_length: cfg.contrast_hop_length,
            fmin_hz: cfg.contrast_fmin_hz,
            n_bands: cfg.contrast_bands,
            ..ContrastConfig::default()
        }
    }
}

impl From<&AnalysisConfig> for SilenceConfig {
    fn from(cfg: &AnalysisConfig) -> Self {
        SilenceConfig {
            threshold_db: cfg.silence_threshold_db,
            relax_step_db: cfg.silence_relax_step_db,
            floor_db: cfg.silence_floor_db,
            min_silence_ms: cfg.min_silence_ms,
            ..SilenceConfig::default()
        }
    }
}

impl AppConfig {
    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        ensure_ascending("thresholds.pitch_hz", &t.pitch_hz)?;
        ensure_ascending("thresholds.rate_cps", &t.rate_cps)?;

        let a = &self.analysis;
        if a.pitch_floor_hz <= 0.0 || a.pitch_floor_hz >= a.pitch_ceiling_hz {
            anyhow::bail!(
                "analysis.pitch_floor_hz ({}) must be positive and below pitch_ceiling_hz ({})",
                a.pitch_floor_hz,
                a.pitch_ceiling_hz
            );
        }
        if a.silence_relax_step_db <= 0.0 {
            anyhow::bail!("analysis.silence_relax_step_db must be positive");
        }
        if a.silence_floor_db > a.silence_threshold_db {
            anyhow::bail!(
                "analysis.silence_floor_db ({}) is above silence_threshold_db ({})",
                a.silence_floor_db,
                a.silence_threshold_db
            );
        }
        if a.min_silence_ms == 0 {
            anyhow::bail!("analysis.min_silence_ms must be non-zero");
        }
        if a.contrast_n_fft == 0 || a.contrast_hop_length == 0 || a.contrast_bands == 0 {
            anyhow::bail!(
                "analysis.contrast_n_fft, contrast_hop_length and contrast_bands must be non-zero"
            );
        }
        if a.contrast_fmin_hz <= 0.0 {
            anyhow::bail!("analysis.contrast_fmin_hz ({}) must be positive", a.contrast_fmin_hz);
        }
        Ok(())
    }
}

fn ensure_ascending<T: PartialOrd + std::fmt::Debug>(name: &str, breakpoints: &[T; 3]) -> Result<()> {
    if breakpoints.windows(2).all(|w| w[0] < w[1]) {
        Ok(())
    } else {
        anyhow::bail!("{name} must be strictly ascending, got {breakpoints:?}")
    }
}

/// Load the config from the platform config directory.
/// A missing file yields defaults.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&paths::config_file())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    Ok(config)
}
