use std::fmt;

use anyhow::{Context, Result};

/// Text completion backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

/// Speed/capability tradeoff for prompt elaboration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelTier {
    Fast,
    Default,
    Think,
}

impl Provider {
    /// Accepts "claude"/"anthropic" and "gpt"/"openai", any case.
    pub fn from_str_loose(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Provider::Anthropic),
            "gpt" | "openai" => Ok(Provider::OpenAI),
            _ => anyhow::bail!("Unknown text provider: {s}. Use 'claude' or 'gpt'."),
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    pub fn api_key(&self) -> Result<String> {
        env_key(self.api_key_env())
    }

    pub fn model_for_tier(&self, tier: ModelTier) -> &'static str {
        match (self, tier) {
            (Provider::Anthropic, ModelTier::Fast)    => "claude-haiku-4-5-20251001",
            (Provider::Anthropic, ModelTier::Default) => "claude-sonnet-4-5-20250929",
            (Provider::Anthropic, ModelTier::Think)   => "claude-opus-4-6",

            (Provider::OpenAI, ModelTier::Fast)       => "gpt-4o-mini",
            (Provider::OpenAI, ModelTier::Default)    => "gpt-4o",
            (Provider::OpenAI, ModelTier::Think)      => "gpt-5.2",
        }
    }
}

/// Read an API key from `var`, with a hint on how to set it.
pub(crate) fn env_key(var: &str) -> Result<String> {
    std::env::var(var)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .with_context(|| format!("{var} not set. Export it in your shell:\n  export {var}=sk-..."))
}

impl ModelTier {
    pub fn from_flags(fast: bool, think: bool) -> Self {
        match (fast, think) {
            (true, _) => ModelTier::Fast,
            (_, true) => ModelTier::Think,
            _ => ModelTier::Default,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Anthropic => write!(f, "Claude"),
            Provider::OpenAI => write!(f, "GPT"),
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTier::Fast => write!(f, "fast"),
            ModelTier::Default => write!(f, "default"),
            ModelTier::Think => write!(f, "think"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_provider_aliases() {
        assert_eq!(Provider::from_str_loose("claude").unwrap(), Provider::Anthropic);
        assert_eq!(Provider::from_str_loose("Anthropic").unwrap(), Provider::Anthropic);
        assert_eq!(Provider::from_str_loose("GPT").unwrap(), Provider::OpenAI);
        assert_eq!(Provider::from_str_loose("openai").unwrap(), Provider::OpenAI);
        assert!(Provider::from_str_loose("gemini").is_err());
    }

    #[test]
    fn tier_models() {
        let a = Provider::Anthropic;
        assert!(a.model_for_tier(ModelTier::Fast).contains("haiku"));
        assert!(a.model_for_tier(ModelTier::Default).contains("sonnet"));
        assert!(a.model_for_tier(ModelTier::Think).contains("opus"));
        assert!(Provider::OpenAI.model_for_tier(ModelTier::Default).starts_with("gpt"));
    }

    #[test]
    fn tier_from_flags() {
        assert_eq!(ModelTier::from_flags(false, false), ModelTier::Default);
        assert_eq!(ModelTier::from_flags(true, false), ModelTier::Fast);
        assert_eq!(ModelTier::from_flags(false, true), ModelTier::Think);
    }

    #[test]
    fn blank_key_is_missing() {
        std::env::set_var("VOICEPORTRAIT_TEST_BLANK_KEY", "  ");
        let err = env_key("VOICEPORTRAIT_TEST_BLANK_KEY").unwrap_err();
        assert!(err.to_string().contains("not set"));
    }
}
