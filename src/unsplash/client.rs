// SPDX-License-Identifier: MPL-2.0

use crate::config::CONNECT_TIMEOUT_SECS;
use crate::settings::Settings;
use crate::unsplash::types::{ErrorBody, Photo, RandomResponse};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),
    #[error("provider error ({status}): {}", .messages.join("; "))]
    Api { status: u16, messages: Vec<String> },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("no photo returned")]
    Empty,
}

/// Remote source of ambient photos.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// One random photo matching `query` and `orientation`.
    async fn random_photo(&self, query: &str, orientation: &str) -> Result<Photo, ProviderError>;

    /// Register a download; required by the provider's usage terms.
    async fn track_download(&self, download_location: &str) -> Result<(), ProviderError>;
}

/// Thin reqwest wrapper over the Unsplash REST API.
pub struct UnsplashClient {
    http: reqwest::Client,
    api_url: String,
    access_key: String,
}

impl UnsplashClient {
    pub fn new(api_url: &str, access_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ProviderError> {
        Self::new(
            &settings.unsplash_api_url,
            &settings.unsplash_access_key,
            settings.request_timeout(),
        )
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
    }

    /// Turn a non-2xx into `ProviderError::Api`, keeping the provider's messages.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(ProviderError::Api {
            status: status.as_u16(),
            messages: body.errors,
        })
    }
}

#[async_trait]
impl ImageProvider for UnsplashClient {
    async fn random_photo(&self, query: &str, orientation: &str) -> Result<Photo, ProviderError> {
        let url = url::Url::parse_with_params(
            &format!("{}/photos/random", self.api_url),
            &[("query", query), ("orientation", orientation), ("count", "1")],
        )
        .map_err(|e| ProviderError::InvalidResponse(format!("bad api url: {e}")))?;

        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let response = Self::check(response).await?;

        let body: RandomResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        body.into_first().ok_or(ProviderError::Empty)
    }

    async fn track_download(&self, download_location: &str) -> Result<(), ProviderError> {
        let response = self
            .authorize(self.http.get(download_location))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubResponse, serve, serve_silent};

    const PHOTOS: &str = r#"[{
        "id": "p1",
        "urls": {"regular": "https://images.unsplash.com/p1"},
        "user": {"name": "Ada", "links": {"html": "https://unsplash.com/@ada"}},
        "links": {"download_location": "https://api.unsplash.com/photos/p1/download"}
    }]"#;

    fn client(base: &str) -> UnsplashClient {
        UnsplashClient::new(base, "secret", Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn random_photo_sends_query_and_key() {
        let (base, server) = serve(vec![StubResponse::json(200, PHOTOS)]).await;

        let photo = client(&base).random_photo("pets", "landscape").await.unwrap();
        assert_eq!(photo.id, "p1");
        assert_eq!(photo.user.name, "Ada");

        let requests = server.await.unwrap();
        let request = &requests[0];
        assert!(request.starts_with("GET /photos/random?query=pets&orientation=landscape&count=1 "));
        assert!(request.to_lowercase().contains("authorization: client-id secret"));
    }

    #[tokio::test]
    async fn provider_errors_are_reported() {
        let (base, server) = serve(vec![StubResponse::json(
            403,
            r#"{"errors":["Rate Limit Exceeded"]}"#,
        )])
        .await;

        let err = client(&base).random_photo("pets", "landscape").await.unwrap_err();
        match err {
            ProviderError::Api { status, messages } => {
                assert_eq!(status, 403);
                assert_eq!(messages, vec!["Rate Limit Exceeded".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn empty_result_is_an_error() {
        let (base, server) = serve(vec![StubResponse::json(200, "[]")]).await;
        let err = client(&base).random_photo("pets", "landscape").await.unwrap_err();
        assert!(matches!(err, ProviderError::Empty));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn track_download_hits_location() {
        let (base, server) = serve(vec![StubResponse::json(200, r#"{"url":"x"}"#)]).await;
        let location = format!("{base}/photos/p1/download?ixid=abc");

        client(&base).track_download(&location).await.unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /photos/p1/download?ixid=abc "));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = client(&base).random_photo("pets", "landscape").await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[tokio::test]
    async fn silent_provider_times_out() {
        let (base, _server) = serve_silent().await;
        let client = UnsplashClient::new(&base, "secret", Duration::from_millis(200)).unwrap();

        let started = std::time::Instant::now();
        let err = client.random_photo("pets", "landscape").await.unwrap_err();

        assert!(matches!(err, ProviderError::Network(_)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
