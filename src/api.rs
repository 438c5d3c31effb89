use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Page size sent with every previous-launches query. Filters narrow the
/// result set but never drop the limit.
const DEFAULT_PAGE_LIMIT: u32 = 18;

/// Any way an upstream call can go wrong: connect failure, timeout, or a
/// non-2xx status. Callers only need to know the fetch failed so they can
/// fall back; the transport detail is kept for the log line.
#[derive(Debug, Error)]
#[error("upstream request failed: {0}")]
pub struct FetchError(#[from] reqwest::Error);

/// Optional narrowing criteria for previous-launch queries, deserialized
/// straight from the dashboard's query string.
#[derive(Debug, Default, Deserialize)]
pub struct PreviousFilter {
    #[serde(rename = "lsp__name")]
    pub provider: Option<String>,
    #[serde(rename = "location__ids")]
    pub location_ids: Option<String>,
}

impl PreviousFilter {
    /// Drops fields the dashboard sends as the "all" sentinel (or empty),
    /// which both mean "no filter".
    pub fn normalize(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty() && v != "all")
        }

        Self {
            provider: keep(self.provider),
            location_ids: keep(self.location_ids),
        }
    }
}

pub struct LaunchLibraryClient {
    client: reqwest::Client,
    base_url: String,
}

impl LaunchLibraryClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");

        Self { client, base_url }
    }

    /// Single bounded-timeout attempt against the upcoming-launches
    /// endpoint. No retries; the caller decides what to fall back to.
    pub async fn fetch_upcoming(&self) -> Result<Value, FetchError> {
        let url = format!("{}/launch/upcoming/", self.base_url);
        debug!("fetching upcoming launches from {url}");

        let data = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(data)
    }

    /// Single attempt against the previous-launches endpoint with the
    /// default page limit merged with whatever filter fields survived
    /// normalization.
    pub async fn fetch_previous(&self, filter: &PreviousFilter) -> Result<Value, FetchError> {
        let url = format!("{}/launch/previous/", self.base_url);
        debug!("fetching previous launches from {url} with {filter:?}");

        let mut params = vec![("limit", DEFAULT_PAGE_LIMIT.to_string())];
        if let Some(provider) = &filter.provider {
            params.push(("lsp__name", provider.clone()));
        }
        if let Some(ids) = &filter.location_ids {
            params.push(("location__ids", ids.clone()));
        }

        let data = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> LaunchLibraryClient {
        LaunchLibraryClient::new(server.url(), Duration::from_secs(2))
    }

    #[test]
    fn normalize_drops_all_sentinel_and_empty_fields() {
        let filter = PreviousFilter {
            provider: Some("all".into()),
            location_ids: Some("5".into()),
        }
        .normalize();

        assert_eq!(filter.provider, None);
        assert_eq!(filter.location_ids.as_deref(), Some("5"));

        let filter = PreviousFilter {
            provider: Some(String::new()),
            location_ids: None,
        }
        .normalize();

        assert_eq!(filter.provider, None);
        assert_eq!(filter.location_ids, None);
    }

    #[tokio::test]
    async fn previous_sends_default_limit_and_no_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/launch/previous/")
            .match_query(Matcher::Exact("limit=18".into()))
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let data = client_for(&server)
            .fetch_previous(&PreviousFilter::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(data, json!({"results": []}));
    }

    #[tokio::test]
    async fn previous_merges_surviving_filter_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/launch/previous/")
            .match_query(Matcher::Exact("limit=18&location__ids=5".into()))
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let filter = PreviousFilter {
            provider: Some("all".into()),
            location_ids: Some("5".into()),
        }
        .normalize();

        client_for(&server).fetch_previous(&filter).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_2xx_status_is_a_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/launch/upcoming/")
            .with_status(503)
            .create_async()
            .await;

        let result = client_for(&server).fetch_upcoming().await;

        assert!(result.is_err());
    }
}
