// ABOUTME: Provider selection - identifies a vendor, reads its configuration
// ABOUTME: from the environment, and builds the matching client.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{AnthropicClient, GeminiClient, LlmClient, OpenAIClient, Request};
use crate::error::LlmError;

/// The supported model vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Gemini,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Gemini => "gemini",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "gpt-4o",
            ProviderId::Anthropic => "claude-sonnet-4-20250514",
            ProviderId::Gemini => "gemini-2.0-flash",
        }
    }

    /// Environment variables holding the API key, in lookup order.
    pub fn key_vars(&self) -> &'static [&'static str] {
        match self {
            ProviderId::OpenAi => &["OPENAI_API_KEY"],
            ProviderId::Anthropic => &["ANTHROPIC_API_KEY"],
            ProviderId::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAi),
            "anthropic" | "claude" => Ok(ProviderId::Anthropic),
            "gemini" | "google" => Ok(ProviderId::Gemini),
            other => Err(LlmError::Configuration(format!(
                "Unknown provider '{}' (expected openai, anthropic, or gemini)",
                other
            ))),
        }
    }
}

/// Everything needed to build a client.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub provider: ProviderId,
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Config with the provider's default model.
    pub fn new(provider: ProviderId, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: provider.default_model().to_string(),
            base_url: None,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Read MARGIN_PROVIDER (default anthropic), MARGIN_MODEL, MARGIN_BASE_URL,
    /// and the provider's key variable.
    pub fn from_env() -> Result<Self, LlmError> {
        let provider = match std::env::var("MARGIN_PROVIDER") {
            Ok(name) if !name.trim().is_empty() => name.parse()?,
            _ => ProviderId::Anthropic,
        };
        Self::from_env_for(provider)
    }

    /// Read the key and overrides for a specific provider.
    pub fn from_env_for(provider: ProviderId) -> Result<Self, LlmError> {
        let api_key = provider
            .key_vars()
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .ok_or_else(|| {
                LlmError::Configuration(format!(
                    "{} environment variable not set",
                    provider.key_vars().join(" or ")
                ))
            })?;

        let mut config = Self::new(provider, api_key);
        if let Ok(model) = std::env::var("MARGIN_MODEL") {
            if !model.is_empty() {
                config.model = model;
            }
        }
        if let Ok(url) = std::env::var("MARGIN_BASE_URL") {
            if !url.is_empty() {
                config.base_url = Some(url);
            }
        }
        Ok(config)
    }

    /// An empty request for the configured model.
    pub fn request(&self) -> Request {
        Request::new(&self.model)
    }
}

/// Build the client for a configuration.
pub fn create_provider(config: &ProviderConfig) -> Arc<dyn LlmClient> {
    let key = config.api_key.clone();
    match config.provider {
        ProviderId::OpenAi => {
            let client = OpenAIClient::new(key);
            match &config.base_url {
                Some(url) => Arc::new(client.with_base_url(url)),
                None => Arc::new(client),
            }
        }
        ProviderId::Anthropic => {
            let client = AnthropicClient::new(key);
            match &config.base_url {
                Some(url) => Arc::new(client.with_base_url(url)),
                None => Arc::new(client),
            }
        }
        ProviderId::Gemini => {
            let client = GeminiClient::new(key);
            match &config.base_url {
                Some(url) => Arc::new(client.with_base_url(url)),
                None => Arc::new(client),
            }
        }
    }
}
