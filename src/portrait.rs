use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::ServiceConfig;
use crate::imagegen::ImageGeneration;
use crate::llm::prompt::{self, PromptText, SYSTEM_PROMPT};
use crate::llm::TextCompletion;
use crate::paths;

/// Key of the portrait generated straight from the elaborated prompt.
pub const BASE_KEY: &str = "normal";

#[derive(Debug, Clone, Serialize)]
pub struct PortraitImage {
    /// `normal` or the expression name.
    pub key: String,
    /// Prompt the image was generated from.
    pub prompt: String,
    pub url: String,
    pub path: PathBuf,
}

/// Everything one generation run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PortraitSet {
    pub second_prompt: String,
    pub out_dir: PathBuf,
    pub images: Vec<PortraitImage>,
}

/// Where and what to generate.
pub struct PortraitRequest<'a> {
    pub audio_path: &'a Path,
    /// Parent of the per-run directory.
    pub base_dir: &'a Path,
    pub started: DateTime<Local>,
    /// Expressions to render after the base portrait; empty for none.
    pub expressions: &'a [String],
}

impl<'a> PortraitRequest<'a> {
    pub fn new(audio_path: &'a Path, base_dir: &'a Path, services: &'a ServiceConfig) -> Self {
        Self {
            audio_path,
            base_dir,
            started: Local::now(),
            expressions: &services.expressions,
        }
    }

    pub fn without_variants(self) -> Self {
        Self {
            expressions: &[],
            ..self
        }
    }
}

/// Elaborate the trait prompt, render the base portrait and each
/// expression variant, and save every image under a fresh run directory.
///
/// Runs strictly in order; the first failing call aborts the run and images
/// already saved stay on disk.
pub fn generate_portraits(
    first_prompt: &PromptText,
    request: &PortraitRequest<'_>,
    text: &dyn TextCompletion,
    images: &dyn ImageGeneration,
) -> Result<PortraitSet> {
    let out_dir = paths::run_dir(request.base_dir, request.audio_path, request.started);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let reply = with_spinner("Elaborating character sheet", || {
        text.complete(SYSTEM_PROMPT, first_prompt.as_str())
    })?;
    let second = prompt::second_prompt(&reply);
    log::info!("second prompt: {} chars", second.len());

    let mut saved = Vec::with_capacity(request.expressions.len() + 1);
    saved.push(render(BASE_KEY, second.clone(), request, &out_dir, images)?);

    for expression in request.expressions {
        let asked = prompt::expression_prompt(&second, expression);
        let final_prompt = with_spinner(&format!("Writing '{expression}' prompt"), || {
            text.complete(SYSTEM_PROMPT, &asked)
        })?;
        saved.push(render(expression, final_prompt, request, &out_dir, images)?);
    }

    Ok(PortraitSet {
        second_prompt: second,
        out_dir,
        images: saved,
    })
}

fn render(
    key: &str,
    image_prompt: String,
    request: &PortraitRequest<'_>,
    out_dir: &Path,
    images: &dyn ImageGeneration,
) -> Result<PortraitImage> {
    let url = with_spinner(&format!("Generating '{key}' image"), || images.generate(&image_prompt))
        .with_context(|| format!("Image generation failed for '{key}'"))?;
    let bytes = images
        .download(&url)
        .with_context(|| format!("Failed to download '{key}' image"))?;

    let path = out_dir.join(paths::image_file_name(request.audio_path, key));
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("saved {} ({} bytes)", path.display(), bytes.len());

    Ok(PortraitImage {
        key: key.to_string(),
        prompt: image_prompt,
        url,
        path,
    })
}

fn with_spinner<T>(message: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg} {elapsed:.dim}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = f();
    pb.finish_and_clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use chrono::TimeZone;

    use crate::analysis::categorize::{CategoryIndices, Contrast, Level};
    use crate::llm::prompt::{compose_prompt, INSTRUCTION_2};

    /// Replies with a canned sheet and remembers every prompt it saw.
    struct ScriptedText {
        seen: RefCell<Vec<String>>,
    }

    impl TextCompletion for ScriptedText {
        fn complete(&self, system: &str, user: &str) -> Result<String> {
            assert_eq!(system, "You are a helpful assistant.");
            self.seen.borrow_mut().push(user.to_string());
            if user.ends_with("\n prompt:") {
                Ok(format!("final prompt #{}", self.seen.borrow().len()))
            } else {
                Ok("\n Hair: silver \n".to_string())
            }
        }
    }

    struct FakeImages {
        generated: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl ImageGeneration for FakeImages {
        fn generate(&self, prompt: &str) -> Result<String> {
            if self.fail_on.is_some_and(|needle| prompt.contains(needle)) {
                anyhow::bail!("content policy violation");
            }
            let mut generated = self.generated.borrow_mut();
            generated.push(prompt.to_string());
            Ok(format!("https://img.example/{}.png", generated.len()))
        }

        fn download(&self, url: &str) -> Result<Vec<u8>> {
            Ok(url.as_bytes().to_vec())
        }
    }

    fn first_prompt() -> PromptText {
        let indices = CategoryIndices {
            pitch: Level::One,
            contrast: Contrast::Clear,
            rate: Level::One,
        };
        compose_prompt(&indices, indices.lineage())
    }

    fn request<'a>(base: &'a Path, expressions: &'a [String]) -> PortraitRequest<'a> {
        PortraitRequest {
            audio_path: Path::new("uploads/taro.mp3"),
            base_dir: base,
            started: Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            expressions,
        }
    }

    #[test]
    fn base_and_variants_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let expressions = vec!["serious".to_string(), "winking".to_string()];
        let text = ScriptedText { seen: RefCell::new(Vec::new()) };
        let images = FakeImages { generated: RefCell::new(Vec::new()), fail_on: None };

        let set = generate_portraits(&first_prompt(), &request(dir.path(), &expressions), &text, &images)
            .unwrap();

        assert_eq!(set.out_dir, dir.path().join("taro-20260314-092653"));
        assert_eq!(set.second_prompt, format!("{INSTRUCTION_2}\nHair: silver"));

        let keys: Vec<&str> = set.images.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, ["normal", "serious", "winking"]);
        for image in &set.images {
            assert!(image.path.exists());
            assert_eq!(std::fs::read(&image.path).unwrap(), image.url.as_bytes());
        }
        assert!(set.images[2].path.ends_with("taro_winking.png"));

        // The base image is drawn from the second prompt itself
        assert_eq!(images.generated.borrow()[0], set.second_prompt);

        let seen = text.seen.borrow();
        assert_eq!(seen[0], first_prompt().as_str());
        assert_eq!(seen[2], format!("{} \nExpression: winking \n prompt:", set.second_prompt));
        assert_eq!(set.images[2].prompt, "final prompt #3");
    }

    #[test]
    fn no_variants_renders_base_only() {
        let dir = tempfile::tempdir().unwrap();
        let services = ServiceConfig::default();
        let text = ScriptedText { seen: RefCell::new(Vec::new()) };
        let images = FakeImages { generated: RefCell::new(Vec::new()), fail_on: None };

        let req = PortraitRequest::new(Path::new("taro.mp3"), dir.path(), &services).without_variants();
        let set = generate_portraits(&first_prompt(), &req, &text, &images).unwrap();

        assert_eq!(set.images.len(), 1);
        assert_eq!(text.seen.borrow().len(), 1);
    }

    #[test]
    fn image_failure_names_the_variant() {
        let dir = tempfile::tempdir().unwrap();
        let expressions = vec!["laughing".to_string()];
        let text = ScriptedText { seen: RefCell::new(Vec::new()) };
        let images = FakeImages {
            generated: RefCell::new(Vec::new()),
            fail_on: Some("final prompt"),
        };

        let err = generate_portraits(&first_prompt(), &request(dir.path(), &expressions), &text, &images)
            .unwrap_err();
        assert!(err.to_string().contains("'laughing'"));

        // The base portrait was already written
        let saved = dir.path().join("taro-20260314-092653").join("taro_normal.png");
        assert!(saved.exists());
    }
}
