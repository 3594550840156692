use std::env;
use std::time::Duration;

/// Default guard window for a playback load attempt.
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 15;

/// Default number of characters echoed back in a manifest report preview.
pub const DEFAULT_PREVIEW_LIMIT: usize = 1000;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Public base URL of this service, used when generating embed snippets
    pub base_url: String,
    pub is_dev: bool,
    /// Guard window for a playback load attempt in seconds (default: 15)
    pub load_timeout_secs: u64,
    /// Maximum characters of manifest text echoed in reports (default: 1000)
    pub preview_limit: usize,
    /// Manifest fetch attempts, initial try included (default: 2)
    pub fetch_max_attempts: u32,
    /// Per-attempt manifest fetch timeout in seconds (default: 10)
    pub fetch_timeout_secs: u64,
    /// Allow the analyze endpoint to fetch loopback/private addresses
    pub allow_private_origins: bool,
}

impl Config {
    /// Load configuration from environment variables
    /// In DEV mode, provides sensible defaults. In PROD mode, PORT and BASE_URL are required.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let is_dev = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        // Port: required in prod, defaults to 3000 in dev
        let port = if is_dev {
            env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?
        } else {
            env::var("PORT")
                .map_err(|_| "PORT is required in production")?
                .parse()?
        };

        // Base URL: required in prod, defaults to localhost in dev
        let base_url = if is_dev {
            env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
        } else {
            env::var("BASE_URL").map_err(|_| "BASE_URL is required in production")?
        };
        let base_url = base_url.trim_end_matches('/').to_string();

        let load_timeout_secs = env::var("LOAD_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_LOAD_TIMEOUT_SECS.to_string())
            .parse()
            .unwrap_or(DEFAULT_LOAD_TIMEOUT_SECS);

        let preview_limit = env::var("PREVIEW_LIMIT")
            .unwrap_or_else(|_| DEFAULT_PREVIEW_LIMIT.to_string())
            .parse()
            .unwrap_or(DEFAULT_PREVIEW_LIMIT);

        let fetch_max_attempts = env::var("FETCH_MAX_ATTEMPTS")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .unwrap_or(2);

        let fetch_timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let allow_private_origins = env::var("ALLOW_PRIVATE_ORIGINS")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        Ok(Config {
            port,
            base_url,
            is_dev,
            load_timeout_secs,
            preview_limit,
            fetch_max_attempts,
            fetch_timeout_secs,
            allow_private_origins,
        })
    }

    /// Guard window applied to every playback load attempt.
    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }

    /// Per-attempt timeout for manifest fetches.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
