//! Provider routing — picks the upstream endpoint from the credential.

/// Key prefix issued by OpenRouter.
const OPENROUTER_KEY_PREFIX: &str = "sk-or-";

/// Hosted completion API a request is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    OpenRouter,
}

/// Provider → endpoint + request defaults.
struct ProviderMapping {
    base_url: &'static str,
    default_model: &'static str,
    extra_headers: &'static [(&'static str, &'static str)],
}

const OPENAI: ProviderMapping = ProviderMapping {
    base_url: "https://api.openai.com/v1",
    default_model: "gpt-3.5-turbo",
    extra_headers: &[],
};

const OPENROUTER: ProviderMapping = ProviderMapping {
    base_url: "https://openrouter.ai/api/v1",
    default_model: "gpt-4o-mini",
    extra_headers: &[("HTTP-Referer", "http://localhost:9000"), ("X-Title", "LawBot")],
};

impl Provider {
    /// OpenRouter keys are recognised by prefix; everything else is OpenAI.
    pub fn for_api_key(api_key: &str) -> Self {
        if api_key.starts_with(OPENROUTER_KEY_PREFIX) {
            Provider::OpenRouter
        } else {
            Provider::OpenAi
        }
    }

    fn mapping(self) -> &'static ProviderMapping {
        match self {
            Provider::OpenAi => &OPENAI,
            Provider::OpenRouter => &OPENROUTER,
        }
    }

    pub fn base_url(self) -> &'static str {
        self.mapping().base_url
    }

    pub fn default_model(self) -> &'static str {
        self.mapping().default_model
    }

    /// Headers sent on every request besides auth and content type.
    pub fn extra_headers(self) -> &'static [(&'static str, &'static str)] {
        self.mapping().extra_headers
    }

    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::OpenRouter => "openrouter",
        }
    }
}
