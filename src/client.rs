//! HTTP content source.
//!
//! Fetches the whole catalog with a single `GET` and maps every transport
//! outcome onto [`ContentError`]. One attempt per call; retrying is the
//! store's caller's decision.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use pulgarpedia_core::{Catalog, ContentError, ContentSource, ContentStore};
use reqwest::header::CONTENT_TYPE;

use crate::config::{Config, ContentConfig};

pub struct HttpContentSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpContentSource {
    pub fn new(config: &ContentConfig) -> Result<Self> {
        Self::with_timeout(&config.endpoint, config.timeout())
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pulgarpedia/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn transport_error(err: reqwest::Error) -> ContentError {
    if err.is_timeout() {
        ContentError::Timeout
    } else {
        ContentError::Connection(err.to_string())
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self) -> Result<Catalog, ContentError> {
        tracing::debug!(endpoint = %self.endpoint, "fetching catalog");

        let response = self
            .client
            .get(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Server {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport_error)?;
        Catalog::from_json(&body)
    }
}

/// Load the catalog through a fresh store for one-shot CLI commands.
///
/// Fails with the store's error when the load does not succeed.
pub async fn load_catalog(config: &Config) -> Result<Arc<Catalog>> {
    let source = Arc::new(HttpContentSource::new(&config.content)?);
    let store = ContentStore::new(source, config.content.integrity);
    store.load().await;

    let state = store.state();
    match (state.content(), state.error()) {
        (Some(catalog), None) => Ok(catalog.clone()),
        (_, Some(err)) => Err(anyhow::Error::new(err.clone())
            .context(format!("Failed to load catalog from {}", config.content.endpoint))),
        (None, None) => anyhow::bail!("catalog load did not complete"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};

    const BODY: &str = r#"{
        "categories": [{ "id": "volcanoes", "name": "Volcanes", "icon": "", "description": "" }],
        "places": []
    }"#;

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/content", addr)
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let url = spawn_upstream(Router::new().route("/content", get(|| async { BODY }))).await;
        let source = HttpContentSource::with_timeout(&url, Duration::from_secs(5)).unwrap();
        let catalog = source.fetch().await.unwrap();
        assert_eq!(catalog.categories[0].id, "volcanoes");
        assert!(catalog.places.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let url = spawn_upstream(Router::new().route(
            "/content",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        ))
        .await;
        let source = HttpContentSource::with_timeout(&url, Duration::from_secs(5)).unwrap();
        assert_eq!(
            source.fetch().await.unwrap_err(),
            ContentError::Server { status: 502 }
        );
    }

    #[tokio::test]
    async fn test_fetch_shape_error() {
        let url = spawn_upstream(
            Router::new().route("/content", get(|| async { r#"{"categories": []}"# })),
        )
        .await;
        let source = HttpContentSource::with_timeout(&url, Duration::from_secs(5)).unwrap();
        assert!(matches!(
            source.fetch().await.unwrap_err(),
            ContentError::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let url = spawn_upstream(Router::new().route(
            "/content",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                BODY
            }),
        ))
        .await;
        let source = HttpContentSource::with_timeout(&url, Duration::from_millis(100)).unwrap();
        assert_eq!(source.fetch().await.unwrap_err(), ContentError::Timeout);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/content", addr);
        let source = HttpContentSource::with_timeout(&url, Duration::from_secs(2)).unwrap();
        assert!(matches!(
            source.fetch().await.unwrap_err(),
            ContentError::Connection(_)
        ));
    }

    #[tokio::test]
    async fn test_load_catalog_reports_failure() {
        let url = spawn_upstream(Router::new().route(
            "/content",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "") }),
        ))
        .await;
        let mut config = Config::minimal();
        config.content.endpoint = url;

        let err = load_catalog(&config).await.unwrap_err();
        assert!(format!("{:#}", err).contains("HTTP 500"));
    }
}
