use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "voiceportrait")]
#[command(about = "Turn a voice clip into a personality sketch and an anime character portrait")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show pitch, spectral contrast, speech rate and the categories they map to
    Analyze {
        /// Voice clip (WAV, MP3 or FLAC)
        audio: PathBuf,

        #[command(flatten)]
        text: TextModelArgs,
    },

    /// Print the character prompt composed from a voice clip
    Prompt {
        /// Voice clip (WAV, MP3 or FLAC)
        audio: PathBuf,

        #[command(flatten)]
        text: TextModelArgs,
    },

    /// Generate a portrait and its expression variants
    Portrait {
        /// Voice clip (WAV, MP3 or FLAC)
        audio: PathBuf,

        /// Directory for generated images (default: the data directory)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Only generate the base portrait
        #[arg(long)]
        no_variants: bool,

        #[command(flatten)]
        text: TextModelArgs,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Show where config and generated portraits are stored
    Paths,
}

/// Text model selection, shared by every command that calls one.
#[derive(Args, Clone)]
pub struct TextModelArgs {
    /// Text provider: "claude" or "gpt" (default: from config)
    #[arg(long)]
    pub provider: Option<String>,

    /// Model override (ignores --fast/--think)
    #[arg(long)]
    pub model: Option<String>,

    /// Use the fastest/cheapest model
    #[arg(long, conflicts_with = "think")]
    pub fast: bool,

    /// Use the most capable model
    #[arg(long, conflicts_with = "fast")]
    pub think: bool,
}
