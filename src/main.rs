use api::PreviousFilter;
use config::Config;
use launches::LaunchService;
use poem::{
    endpoint::StaticFilesEndpoint,
    get, handler,
    listener::TcpListener,
    middleware::{AddData, Cors},
    web::{Data, Html, Json, Query},
    EndpointExt, Route, Server,
};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod cache;
mod config;
mod launches;

#[handler]
fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

#[handler]
fn previous_page() -> Html<&'static str> {
    Html(include_str!("../static/previous.html"))
}

#[handler]
async fn api_launches(service: Data<&Arc<LaunchService>>) -> Json<Value> {
    Json(service.upcoming().await)
}

#[handler]
async fn api_previous(
    filter: Result<Query<PreviousFilter>, poem::Error>,
    service: Data<&Arc<LaunchService>>,
) -> Json<Value> {
    // a query string we can't parse means "no filters", never a 400
    let filter = filter.map(|Query(f)| f).unwrap_or_default();
    Json(service.previous(filter).await)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    info!(
        "starting launch tracker on {} (cache at {:?})",
        config.bind_addr, config.cache_path
    );

    let service = Arc::new(LaunchService::new(&config));
    let cors = Cors::new().allow_methods([Method::GET, Method::OPTIONS]);

    let app = Route::new()
        .at("/", get(index))
        .at("/previous", get(previous_page))
        .at("/api/launches", get(api_launches))
        .at("/api/previous", get(api_previous))
        .nest("/static", StaticFilesEndpoint::new("static"))
        .with(AddData::new(service))
        .with(cors);

    Server::new(TcpListener::bind(config.bind_addr.clone()))
        .run(app)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use poem::test::TestClient;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn unparseable_query_string_is_treated_as_no_filters() {
        let mut server = mockito::Server::new_async().await;
        let upstream = server
            .mock("GET", "/launch/previous/")
            .match_query(mockito::Matcher::Exact("limit=18".into()))
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let dir = tempdir().unwrap();
        let config = Config {
            bind_addr: "127.0.0.1:0".into(),
            upstream_base_url: server.url(),
            cache_path: dir.path().join("launch_cache.json"),
            sample_data_path: dir.path().join("sample_data.json"),
            freshness_window: Duration::from_secs(300),
            request_timeout: Duration::from_secs(2),
        };
        let service = Arc::new(LaunchService::new(&config));

        let app = Route::new()
            .at("/api/previous", get(api_previous))
            .with(AddData::new(service));
        let client = TestClient::new(app);

        // repeated parameters fail query deserialization; the handler
        // must still answer 200 with the unfiltered upstream result
        let resp = client
            .get("/api/previous?lsp__name=a&lsp__name=b")
            .send()
            .await;

        resp.assert_status_is_ok();
        upstream.assert_async().await;
    }
}
