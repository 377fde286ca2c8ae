//! Completion API client.
//!
//! Sends the latest user message (behind a fixed system prompt) to an
//! OpenAI-compatible `/chat/completions` endpoint and returns the reply
//! text. One attempt per call: there is no retry and no fallback model.
//!
//! Every failure is classified for logging, but callers only ever show one
//! of two fixed strings: [`NOT_CONFIGURED_MESSAGE`] when no credential is
//! set, and [`UPSTREAM_FAILURE_MESSAGE`] for everything else.

pub mod provider;

use std::fmt;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use provider::Provider;

/// Shown when a request arrives and no API key is configured.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "OpenAI API key is not configured. Please set the OPENAI_API_KEY environment variable.";

/// Shown for any failure talking to the completion API.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Error contacting GPT API";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a legal assistant. Provide general legal information, \
     but always say: 'This is not legal advice.'";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstream error bodies are cut to this length in logs.
const LOGGED_BODY_CHARS: usize = 500;

/// Errors that can occur calling the completion API.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("No API key configured")]
    NotConfigured,

    #[error("Invalid completion settings: {0}")]
    Config(String),

    #[error("Completion API rejected the credential: {0}")]
    Unauthorized(String),

    #[error("Completion API rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Completion API error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Completion API request timed out")]
    Timeout,

    #[error("Completion API network error: {0}")]
    Network(String),

    #[error("Completion API returned an unusable response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    /// Short classification used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::NotConfigured => "not_configured",
            CompletionError::Config(_) => "configuration_error",
            CompletionError::Unauthorized(_) => "auth_error",
            CompletionError::RateLimited(_) => "rate_limit",
            CompletionError::Status { .. } => "api_error",
            CompletionError::Timeout => "timeout",
            CompletionError::Network(_) => "network_error",
            CompletionError::MalformedResponse(_) => "malformed_response",
        }
    }

    /// The text a user is shown for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            CompletionError::NotConfigured => NOT_CONFIGURED_MESSAGE,
            _ => UPSTREAM_FAILURE_MESSAGE,
        }
    }

    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CompletionError::Timeout
        } else {
            CompletionError::Network(e.to_string())
        }
    }
}

/// Settings for [`CompletionClient`].
#[derive(Clone)]
pub struct CompletionSettings {
    /// API credential. `None` or blank means "not configured".
    pub api_key: Option<String>,
    /// Overrides the provider's base URL (e.g. a proxy or a test server).
    pub base_url: Option<String>,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Whole-request timeout on the HTTP client.
    pub timeout: Duration,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for CompletionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl CompletionSettings {
    /// The configured key, if it is non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatCompletionMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionReply,
}

#[derive(Deserialize)]
struct ChatCompletionReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible completion endpoint.
///
/// Cheap to clone; the inner `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    settings: CompletionSettings,
}

impl CompletionClient {
    /// Builds the HTTP client and validates any base URL override.
    pub fn new(settings: CompletionSettings) -> Result<Self, CompletionError> {
        if let Some(base) = &settings.base_url {
            url::Url::parse(base)
                .map_err(|e| CompletionError::Config(format!("invalid base URL {base:?}: {e}")))?;
        }

        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| CompletionError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, settings })
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    /// Full URL of the chat completions endpoint for `provider`.
    pub fn endpoint(&self, provider: Provider) -> String {
        let base = self
            .settings
            .base_url
            .as_deref()
            .unwrap_or_else(|| provider.base_url());
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }

    /// Send `prompt` as the latest user message and return the reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let api_key = self.settings.api_key().ok_or(CompletionError::NotConfigured)?;
        let provider = Provider::for_api_key(api_key);
        let model = self
            .settings
            .model
            .as_deref()
            .unwrap_or_else(|| provider.default_model());
        let url = self.endpoint(provider);

        debug!(provider = provider.name(), model, %url, "calling completion API");

        let mut request = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&ChatCompletionRequest {
                model,
                messages: [
                    ChatCompletionMessage {
                        role: "system",
                        content: &self.settings.system_prompt,
                    },
                    ChatCompletionMessage {
                        role: "user",
                        content: prompt,
                    },
                ],
                max_tokens: self.settings.max_tokens,
                temperature: self.settings.temperature,
            });
        for (name, value) in provider.extra_headers() {
            request = request.header(*name, *value);
        }

        let resp = request.send().await.map_err(CompletionError::from_reqwest)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            let body: String = body.chars().take(LOGGED_BODY_CHARS).collect();
            let err = match status {
                StatusCode::UNAUTHORIZED => CompletionError::Unauthorized(body),
                StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited(body),
                _ => CompletionError::Status {
                    status: status.as_u16(),
                    body,
                },
            };
            warn!(provider = provider.name(), kind = err.kind(), "{err}");
            return Err(err);
        }

        let data: ChatCompletionResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::MalformedResponse(format!("response parse error: {e}"))
            }
        })?;

        data.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                CompletionError::MalformedResponse("no reply content in first choice".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_key(key: &str) -> CompletionSettings {
        CompletionSettings {
            api_key: Some(key.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn blank_key_is_not_configured() {
        assert!(!CompletionSettings::default().is_configured());
        assert!(!settings_with_key("   ").is_configured());
        assert!(settings_with_key("sk-test").is_configured());
    }

    #[test]
    fn every_failure_except_missing_key_shows_fixed_message() {
        let errors = [
            CompletionError::Unauthorized("bad key".into()),
            CompletionError::RateLimited("slow down".into()),
            CompletionError::Status {
                status: 500,
                body: "boom".into(),
            },
            CompletionError::Timeout,
            CompletionError::Network("refused".into()),
            CompletionError::MalformedResponse("{}".into()),
        ];
        for err in errors {
            assert_eq!(err.user_message(), UPSTREAM_FAILURE_MESSAGE, "{err:?}");
        }
        assert_eq!(
            CompletionError::NotConfigured.user_message(),
            NOT_CONFIGURED_MESSAGE
        );
    }

    #[test]
    fn debug_output_hides_key() {
        let out = format!("{:?}", settings_with_key("sk-secret-value"));
        assert!(!out.contains("sk-secret-value"));
        assert!(out.contains("<redacted>"));
    }

    #[test]
    fn endpoint_uses_provider_or_override() {
        let client = CompletionClient::new(settings_with_key("sk-test")).unwrap();
        assert_eq!(
            client.endpoint(Provider::OpenAi),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            client.endpoint(Provider::OpenRouter),
            "https://openrouter.ai/api/v1/chat/completions"
        );

        let client = CompletionClient::new(CompletionSettings {
            base_url: Some("http://127.0.0.1:8080/v1/".into()),
            ..settings_with_key("sk-test")
        })
        .unwrap();
        assert_eq!(
            client.endpoint(Provider::OpenAi),
            "http://127.0.0.1:8080/v1/chat/completions"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = CompletionClient::new(CompletionSettings {
            base_url: Some("not a url".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, CompletionError::Config(_)));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = CompletionClient::new(CompletionSettings {
            // Unroutable; reaching it would be a bug.
            base_url: Some("http://192.0.2.1:9".into()),
            ..Default::default()
        })
        .unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, CompletionError::NotConfigured));
    }
}
