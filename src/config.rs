use std::{env, path::PathBuf, time::Duration};

/// Runtime configuration, resolved once at startup and handed to the
/// services that need it. Every value has a default so the server runs
/// out of the box against the public Launch Library API.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: String,
    pub upstream_base_url: String,
    pub cache_path: PathBuf,
    pub sample_data_path: PathBuf,
    pub freshness_window: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:5000"),
            upstream_base_url: env_or("LAUNCH_API_URL", "https://ll.thespacedevs.com/2.2.0"),
            cache_path: env_or("CACHE_FILE", "launch_cache.json").into(),
            sample_data_path: env_or("SAMPLE_DATA_FILE", "sample_data.json").into(),
            freshness_window: Duration::from_secs(env_u64("CACHE_MAX_AGE_SECS", 300)),
            request_timeout: Duration::from_secs(env_u64("UPSTREAM_TIMEOUT_SECS", 10)),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
