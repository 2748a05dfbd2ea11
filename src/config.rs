use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        bind_addr: get_env_or_default("BIND_ADDR", "0.0.0.0:3000"),
        openai_base_url: get_env_or_default("OPENAI_BASE_URL", "https://api.openai.com"),
        openai_model: get_env_or_default("OPENAI_MODEL", "gpt-4.1-mini"),
        openai_temperature: get_env_parsed("OPENAI_TEMPERATURE", 0.2),
        openai_timeout: Duration::from_secs(get_env_parsed("OPENAI_TIMEOUT_SECS", 60)),
        wiki_base_url: get_env_or_default("WIKI_BASE_URL", "https://en.wikipedia.org"),
        wiki_timeout: Duration::from_secs(get_env_parsed("WIKI_TIMEOUT_SECS", 10)),
        user_agent: get_env_or_default(
            "HTTP_USER_AGENT",
            concat!("termlens/", env!("CARGO_PKG_VERSION")),
        ),
        static_dir: get_env_or_default("STATIC_DIR", "static"),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_temperature: f64,
    pub openai_timeout: Duration,
    pub wiki_base_url: String,
    pub wiki_timeout: Duration,
    pub user_agent: String,
    pub static_dir: String,
}

/// Where the text-generation API key comes from.
///
/// The key is looked up on every request rather than at startup, so a
/// missing key is reported per request as a server configuration error.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Read the named environment variable each time.
    Env(String),
    /// A fixed value, `None` meaning "not configured".
    Fixed(Option<String>),
}

impl Credential {
    pub fn from_env_var() -> Self {
        Credential::Env(API_KEY_VAR.to_string())
    }

    /// Returns the key, or `None` when it is unset, empty or only whitespace.
    pub fn resolve(&self) -> Option<String> {
        let raw = match self {
            Credential::Env(key) => env::var(key).ok(),
            Credential::Fixed(value) => value.clone(),
        };
        raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => parse_or_default(key, &raw, default),
        Err(_) => default,
    }
}

fn parse_or_default<T: FromStr + Copy + std::fmt::Display>(key: &str, raw: &str, default: T) -> T {
    raw.trim().parse().unwrap_or_else(|_| {
        log::warn!("invalid value {raw:?} for {key}, using default {default}");
        default
    })
}
