mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, TextModelArgs};
use console::style;

use voiceportrait::analysis::analyzer::{self, VoiceAnalysis};
use voiceportrait::config::{self, AppConfig};
use voiceportrait::imagegen::OpenAiImages;
use voiceportrait::llm::provider::{ModelTier, Provider};
use voiceportrait::llm::ProviderClient;
use voiceportrait::paths;
use voiceportrait::portrait::{self, PortraitRequest};
use voiceportrait::speech::whisper::WhisperTranscriber;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { audio, text } => {
            let config = config::load_config()?;
            let transcriber = match transcriber(&config, &text) {
                Ok(t) => Some(t),
                Err(e) => {
                    log::warn!("speech rate will be skipped: {e:#}");
                    None
                }
            };
            let analysis = analyze(&audio, transcriber.as_ref(), &config)?;
            analyzer::print_analysis(&audio, &analysis, &config.thresholds);
            Ok(())
        }

        Command::Prompt { audio, text } => {
            let config = config::load_config()?;
            let transcriber = transcriber(&config, &text)?;
            let analysis = analyze(&audio, Some(&transcriber), &config)?;
            let prompt = analysis.into_prompt(&config.thresholds)?;
            println!("{prompt}");
            Ok(())
        }

        Command::Portrait {
            audio,
            out,
            no_variants,
            text,
        } => {
            let config = config::load_config()?;
            // Resolve every key before spending time on audio
            let writer = text_client(&config, &text)?;
            let transcriber = transcriber(&config, &text)?;
            let images = OpenAiImages::from_env(&config.services)?;

            let analysis = analyze(&audio, Some(&transcriber), &config)?;
            let prompt = analysis.into_prompt(&config.thresholds)?;

            let base_dir = out.unwrap_or_else(paths::portraits_dir);
            let mut request = PortraitRequest::new(&audio, &base_dir, &config.services);
            if no_variants {
                request = request.without_variants();
            }

            println!(
                "Generating portraits with {} ({})...",
                style(writer.provider()).cyan(),
                writer.model()
            );
            let set = portrait::generate_portraits(&prompt, &request, &writer, &images)?;

            println!();
            for image in &set.images {
                println!("  {} {:<9} {}", style("OK").green(), image.key, image.path.display());
            }
            println!();
            println!("Saved to {}", style(set.out_dir.display()).green());
            Ok(())
        }

        Command::Config => {
            let config = config::load_config()?;
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            print!("{rendered}");
            Ok(())
        }

        Command::Paths => {
            let config_file = paths::config_file();
            let exists = if config_file.exists() { "" } else { " (not created, using defaults)" };
            println!("Config:     {}{exists}", config_file.display());
            println!("Portraits:  {}", paths::portraits_dir().display());
            Ok(())
        }
    }
}

fn analyze(
    audio: &Path,
    transcriber: Option<&WhisperTranscriber>,
    config: &AppConfig,
) -> Result<VoiceAnalysis> {
    let service = transcriber.map(|t| t as &dyn voiceportrait::speech::TranscriptionService);
    analyzer::analyze_voice(audio, service, config)
        .with_context(|| format!("Failed to analyze {}", audio.display()))
}

fn text_client(config: &AppConfig, args: &TextModelArgs) -> Result<ProviderClient> {
    let name = args.provider.as_deref().unwrap_or(&config.services.text_provider);
    let provider = Provider::from_str_loose(name)?;
    let tier = ModelTier::from_flags(args.fast, args.think);
    ProviderClient::from_env(provider, args.model.as_deref(), tier)
}

fn transcriber(config: &AppConfig, args: &TextModelArgs) -> Result<WhisperTranscriber> {
    let reader = text_client(config, args)?;
    WhisperTranscriber::from_env(&config.services.transcription_model, Box::new(reader))
}
