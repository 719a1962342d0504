use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Local};

/// Platform directory layout for voiceportrait, resolved through `dirs`:
///   Config:  $XDG_CONFIG_HOME/voiceportrait  (~/.config/voiceportrait)
///   Data:    $XDG_DATA_HOME/voiceportrait    (~/.local/share/voiceportrait)
/// Both are resolved once and cached.

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();

const APP_DIR: &str = "voiceportrait";

pub fn data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    })
}

pub fn config_dir() -> &'static PathBuf {
    CONFIG_DIR.get_or_init(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    })
}

/// <config_dir>/config.toml
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default parent for generated portraits: <data_dir>/portraits
pub fn portraits_dir() -> PathBuf {
    data_dir().join("portraits")
}

/// Output directory for one generation run: `<base>/<stem>-<YYYYmmdd-HHMMSS>`.
/// Each run gets its own directory so repeated runs on a clip never collide.
pub fn run_dir(base: &Path, audio_path: &Path, started: DateTime<Local>) -> PathBuf {
    base.join(format!(
        "{}-{}",
        audio_stem(audio_path),
        started.format("%Y%m%d-%H%M%S")
    ))
}

/// File name for one generated image: `<stem>_<key>.png`.
pub fn image_file_name(audio_path: &Path, key: &str) -> String {
    format!("{}_{}.png", audio_stem(audio_path), key)
}

fn audio_stem(audio_path: &Path) -> String {
    audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "voice".into())
}
