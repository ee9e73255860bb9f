use serde::Deserialize;

/// Generative providers the service can talk to
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Provider used for recommendation text
    #[serde(default = "default_text_provider")]
    pub text_provider: ProviderKind,

    /// Provider used for destination images; defaults to the text provider
    #[serde(default)]
    pub image_provider: Option<ProviderKind>,

    /// Google Gemini API key
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Google Gemini API base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    #[serde(default = "default_gemini_text_model")]
    pub gemini_text_model: String,

    #[serde(default = "default_gemini_image_model")]
    pub gemini_image_model: String,

    /// OpenAI API key
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    #[serde(default = "default_openai_text_model")]
    pub openai_text_model: String,

    #[serde(default = "default_openai_image_model")]
    pub openai_image_model: String,

    /// Attempts per destination image before giving up
    #[serde(default = "default_image_max_attempts")]
    pub image_max_attempts: u32,

    /// Frontend origin allowed by CORS; any origin when unset
    #[serde(default)]
    pub frontend_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_text_provider() -> ProviderKind {
    ProviderKind::Gemini
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_text_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_image_model() -> String {
    "gemini-2.0-flash-exp-image-generation".to_string()
}

fn default_openai_api_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_openai_text_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

fn default_openai_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_max_attempts() -> u32 {
    3
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Image provider, falling back to the text provider
    pub fn image_provider(&self) -> ProviderKind {
        self.image_provider.unwrap_or(self.text_provider)
    }

    /// API key for a provider, if configured and non-blank
    pub fn api_key(&self, provider: ProviderKind) -> Option<&str> {
        let key = match provider {
            ProviderKind::Gemini => self.gemini_api_key.as_deref(),
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
        };
        key.map(str::trim).filter(|key| !key.is_empty())
    }

    /// Checks that every selected provider has credentials
    pub fn validate(&self) -> anyhow::Result<()> {
        for provider in [self.text_provider, self.image_provider()] {
            if self.api_key(provider).is_none() {
                let var = match provider {
                    ProviderKind::Gemini => "GEMINI_API_KEY",
                    ProviderKind::OpenAi => "OPENAI_API_KEY",
                };
                anyhow::bail!("{} environment variable is not set", var);
            }
        }
        Ok(())
    }
}
