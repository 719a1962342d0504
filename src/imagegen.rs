use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::llm::{self, openai, snippet};

const API_URL: &str = "https://api.openai.com/v1/images/generations";

/// Prompt in, hosted image out.
pub trait ImageGeneration {
    /// Generate one image and return its URL.
    fn generate(&self, prompt: &str) -> Result<String>;

    fn download(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
}

#[derive(Deserialize)]
struct Response {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

pub struct OpenAiImages {
    api_key: String,
    model: String,
    size: String,
    quality: String,
    http: reqwest::Client,
}

impl OpenAiImages {
    /// Uses `OPENAI_API_KEY` and the model, size and quality from `services`.
    pub fn from_env(services: &ServiceConfig) -> Result<Self> {
        let api_key = llm::provider::env_key("OPENAI_API_KEY")?;
        Ok(Self {
            api_key,
            model: services.image_model.clone(),
            size: services.image_size.clone(),
            quality: services.image_quality.clone(),
            http: reqwest::Client::new(),
        })
    }

    async fn generate_async(&self, prompt: &str) -> Result<String> {
        let request = Request {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
            quality: &self.quality,
        };

        let response = self
            .http
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI images API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read OpenAI images API response")?;

        if !status.is_success() {
            anyhow::bail!("OpenAI images API error ({}): {}", status, openai::error_message(&body));
        }

        parse_url(&body)
    }

    async fn download_async(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to download generated image")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Image download failed ({status})");
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read generated image")?;
        Ok(bytes.to_vec())
    }
}

impl ImageGeneration for OpenAiImages {
    fn generate(&self, prompt: &str) -> Result<String> {
        llm::block_on(self.generate_async(prompt))?
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        llm::block_on(self.download_async(url))?
    }
}

fn parse_url(body: &str) -> Result<String> {
    let parsed: Response =
        serde_json::from_str(body).context("Failed to parse OpenAI images API response")?;

    parsed
        .data
        .into_iter()
        .find_map(|d| d.url)
        .with_context(|| format!("OpenAI returned no image URL. Raw response: {}", snippet(body)))
}
