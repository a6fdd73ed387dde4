use std::env;
use std::time::Duration;

/// Application settings loaded from environment variables (via `.env` when
/// present).
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub anthropic_api_key: Option<String>,
    pub llm_model: String,

    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub fetch_max_attempts: u32,

    pub cors_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            anthropic_api_key: None,
            llm_model: "claude-3-5-haiku-latest".to_string(),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 100,
            fetch_max_attempts: 3,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT", defaults.port),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            llm_model: env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            cache_ttl: Duration::from_secs(parse_env(
                "CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            cache_capacity: parse_env("CACHE_CAPACITY", defaults.cache_capacity),
            fetch_max_attempts: parse_env("FETCH_MAX_ATTEMPTS", defaults.fetch_max_attempts),
            cors_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
        }
    }

    pub fn llm_configured(&self) -> bool {
        self.anthropic_api_key.is_some()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
