use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub scrape_webhook_url: String,
}

/// Default webhook used for local development (n8n test endpoint).
pub const DEFAULT_SCRAPE_WEBHOOK_URL: &str = "http://localhost:5678/webhook-test/scrap-firms";

/// Public Gemini REST endpoint; overridable so tests can point at a mock server.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("GEMINI_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_model: std::env::var("GEMINI_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            scrape_webhook_url: std::env::var("SCRAPE_WEBHOOK_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SCRAPE_WEBHOOK_URL.to_string()),
        };

        if !config.gemini_base_url.starts_with("http://")
            && !config.gemini_base_url.starts_with("https://")
        {
            anyhow::bail!("GEMINI_BASE_URL must start with http:// or https://");
        }
        if !config.scrape_webhook_url.starts_with("http://")
            && !config.scrape_webhook_url.starts_with("https://")
        {
            anyhow::bail!("SCRAPE_WEBHOOK_URL must start with http:// or https://");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Gemini base URL: {}", config.gemini_base_url);
        tracing::debug!("Gemini model: {}", config.gemini_model);
        tracing::debug!("Scrape webhook URL: {}", config.scrape_webhook_url);
        tracing::debug!("Server port: {}", config.port);

        Ok(config)
    }
}
