use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Remote lead classifier settings. Both URL and key are optional; without
/// them the rule-based fallback decides every routing.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub classifier: ClassifierConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();

        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        let timeout_ms = env::var("CLASSIFIER_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let classifier = ClassifierConfig {
            api_url: env::var("HF_API_URL").ok().filter(|s| !s.is_empty()),
            api_key: env::var("HF_API_KEY").ok().filter(|s| !s.is_empty()),
            timeout: Duration::from_millis(timeout_ms),
        };

        Ok(Self { port, classifier })
    }
}
