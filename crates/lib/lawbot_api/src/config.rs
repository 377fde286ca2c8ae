//! API server configuration.

use std::time::Duration;

use lawbot_core::completion::CompletionSettings;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:9000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Completion API credential and request settings.
    pub completion: CompletionSettings,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                  | Default                               |
    /// |---------------------------|---------------------------------------|
    /// | `BIND_ADDR`               | `127.0.0.1:9000`                      |
    /// | `DATABASE_URL`            | `postgres://localhost:5432/lawbot`    |
    /// | `OPENAI_API_KEY`          | unset (chat reports "not configured") |
    /// | `COMPLETION_BASE_URL`     | provider default                      |
    /// | `COMPLETION_MODEL`        | provider default                      |
    /// | `SYSTEM_PROMPT`           | the legal-assistant prompt            |
    /// | `COMPLETION_TIMEOUT_SECS` | `30`                                  |
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ApiConfig::from_env`], reading variables through `var`.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = CompletionSettings::default();
        Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:9000".into()),
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost:5432/lawbot".into()),
            completion: CompletionSettings {
                api_key: var("OPENAI_API_KEY"),
                base_url: var("COMPLETION_BASE_URL"),
                model: var("COMPLETION_MODEL"),
                system_prompt: var("SYSTEM_PROMPT").unwrap_or(defaults.system_prompt),
                timeout: var("COMPLETION_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
                ..CompletionSettings::default()
            },
        }
    }
}
