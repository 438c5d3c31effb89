use crate::{
    api::{LaunchLibraryClient, PreviousFilter},
    cache::LaunchCache,
    config::Config,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::{fs, path::PathBuf};
use tracing::{debug, info, warn};

/// Resolves launch-data requests through cache, upstream, and the bundled
/// sample document. Every path yields a usable JSON body; there is no
/// failure mode a caller has to handle.
pub struct LaunchService {
    client: LaunchLibraryClient,
    cache: LaunchCache,
    sample_path: PathBuf,
}

impl LaunchService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: LaunchLibraryClient::new(
                config.upstream_base_url.clone(),
                config.request_timeout,
            ),
            cache: LaunchCache::new(config.cache_path.clone(), config.freshness_window),
            sample_path: config.sample_data_path.clone(),
        }
    }

    /// Cache first, then one upstream attempt, then the sample document.
    /// Object-shaped responses get a `cached_timestamp` field so the
    /// dashboard can show how old the data is.
    pub async fn upcoming(&self) -> Value {
        if let Some(entry) = self.cache.load() {
            debug!("serving upcoming launches from cache");
            return with_cached_timestamp(entry.data, Some(entry.timestamp));
        }

        match self.client.fetch_upcoming().await {
            Ok(data) => {
                info!("fetched fresh upcoming launches from upstream");
                let stamp = match self.cache.save(&data) {
                    Ok(entry) => entry.timestamp,
                    Err(e) => {
                        // Non-fatal: the payload is already in hand.
                        warn!("failed to write launch cache: {e}");
                        Utc::now()
                    }
                };
                with_cached_timestamp(data, Some(stamp))
            }
            Err(e) => {
                warn!("upstream fetch failed ({e}), falling back to sample data");
                with_cached_timestamp(self.sample_data(), None)
            }
        }
    }

    /// Previous launches are never cached and never fall back to sample
    /// data; an upstream failure becomes a structured error document.
    pub async fn previous(&self, filter: PreviousFilter) -> Value {
        match self.client.fetch_previous(&filter.normalize()).await {
            Ok(data) => data,
            Err(e) => {
                warn!("previous-launches fetch failed: {e}");
                json!({"error": "Could not fetch previous launches", "results": []})
            }
        }
    }

    /// Last-resort data source. Never fails: a missing or unreadable
    /// sample file becomes an empty structured document.
    fn sample_data(&self) -> Value {
        fs::read_to_string(&self.sample_path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_else(|| {
                warn!("sample data missing at {:?}", self.sample_path);
                json!({"error": "Sample data not found", "results": []})
            })
    }
}

/// Injects `cached_timestamp` (RFC 3339 instant, or null when the data
/// came from the sample fallback) into object-shaped responses. Other
/// JSON shapes pass through untouched.
fn with_cached_timestamp(mut value: Value, stamp: Option<DateTime<Utc>>) -> Value {
    if let Value::Object(map) = &mut value {
        let stamp = stamp
            .map(|t| Value::String(t.to_rfc3339()))
            .unwrap_or(Value::Null);
        map.insert("cached_timestamp".to_string(), stamp);
    }
    value
}
