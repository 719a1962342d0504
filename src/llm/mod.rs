mod anthropic;
pub(crate) mod openai;
pub mod prompt;
pub mod provider;

use std::future::Future;

use anyhow::{Context, Result};
use provider::{ModelTier, Provider};

/// A text-in, text-out language model.
pub trait TextCompletion {
    fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// A configured provider: API key and model resolved up front so a missing
/// key fails before any audio work starts.
pub struct ProviderClient {
    provider: Provider,
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl ProviderClient {
    /// Resolve the API key from the environment. `model` overrides the tier.
    pub fn from_env(provider: Provider, model: Option<&str>, tier: ModelTier) -> Result<Self> {
        let api_key = provider.api_key()?;
        let model = model
            .map(str::to_string)
            .unwrap_or_else(|| provider.model_for_tier(tier).to_string());
        Ok(Self {
            provider,
            api_key,
            model,
            http: reqwest::Client::new(),
        })
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextCompletion for ProviderClient {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        log::debug!("{} ({}) completion, {} chars in", self.provider, self.model, user.len());
        let text = match self.provider {
            Provider::Anthropic => block_on(anthropic::complete_async(
                &self.http,
                &self.api_key,
                &self.model,
                system,
                user,
            ))??,
            Provider::OpenAI => block_on(openai::complete_async(
                &self.http,
                &self.api_key,
                &self.model,
                system,
                user,
            ))??,
        };
        Ok(text)
    }
}

/// Run one future to completion on a fresh current-thread runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;
    Ok(rt.block_on(future))
}

/// Clip an HTTP body for inclusion in an error message.
pub(crate) fn snippet(body: &str) -> &str {
    match body.char_indices().nth(500) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_on_runs_future() {
        let value = block_on(async { 40 + 2 }).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let body = "あ".repeat(600);
        assert_eq!(snippet(&body).chars().count(), 500);
        assert_eq!(snippet("short"), "short");
    }

    #[test]
    fn model_override_wins_over_tier() {
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        let client =
            ProviderClient::from_env(Provider::OpenAI, Some("gpt-4o"), ModelTier::Think).unwrap();
        assert_eq!(client.model(), "gpt-4o");

        let client = ProviderClient::from_env(Provider::OpenAI, None, ModelTier::Think).unwrap();
        assert_eq!(client.model(), Provider::OpenAI.model_for_tier(ModelTier::Think));
    }
}
