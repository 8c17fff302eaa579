// SPDX-License-Identifier: MPL-2.0

use crate::backend::types::{AuthUser, MembershipRow, PostId, ViewerId};
use crate::config::CONNECT_TIMEOUT_SECS;
use crate::settings::Settings;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("not authenticated")]
    NotAuthenticated,
}

/// The hosted data store, as far as likes are concerned.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Does a (viewer, post) like row exist?
    async fn query_membership(&self, viewer: &ViewerId, post: &PostId)
    -> Result<bool, ClientError>;

    async fn insert_membership(&self, viewer: &ViewerId, post: &PostId)
    -> Result<(), ClientError>;

    async fn delete_membership(&self, viewer: &ViewerId, post: &PostId)
    -> Result<(), ClientError>;

    /// Number of like rows for a post. This is the authoritative like count.
    async fn count_memberships(&self, post: &PostId) -> Result<u32, ClientError>;

    /// Write the denormalized counter on the post record.
    async fn update_like_count(&self, post: &PostId, count: u32) -> Result<(), ClientError>;

    /// Who is signed in, if anyone.
    async fn current_identity(&self) -> Result<Option<ViewerId>, ClientError>;
}

const LIKES_TABLE: &str = "post_likes";
const POSTS_TABLE: &str = "posts";

/// REST client for the hosted backend (PostgREST tables + auth endpoint).
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: None,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        let client = Self::new(
            &settings.backend_url,
            &settings.anon_key,
            settings.request_timeout(),
        )?;
        Ok(match &settings.access_token {
            Some(token) => client.with_access_token(token),
            None => client,
        })
    }

    /// Act as the user owning this token instead of anonymously.
    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    fn table_url(&self, table: &str, filters: &[(&str, String)]) -> Result<url::Url, ClientError> {
        let endpoint = format!("{}/rest/v1/{}", self.base_url, table);
        let url = if filters.is_empty() {
            url::Url::parse(&endpoint)
        } else {
            url::Url::parse_with_params(&endpoint, filters)
        };
        url.map_err(|e| ClientError::InvalidResponse(format!("bad backend url: {e}")))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        req.header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn pair_filter(viewer: &ViewerId, post: &PostId) -> [(&'static str, String); 2] {
        [
            ("user_id", format!("eq.{viewer}")),
            ("post_id", format!("eq.{post}")),
        ]
    }

    /// Parse the total out of `Content-Range: 0-24/57` or `*/0`.
    fn parse_total(content_range: &str) -> Option<u32> {
        content_range.rsplit('/').next()?.trim().parse().ok()
    }
}

#[async_trait]
impl RemoteStore for BackendClient {
    async fn query_membership(
        &self,
        viewer: &ViewerId,
        post: &PostId,
    ) -> Result<bool, ClientError> {
        let [user, post] = Self::pair_filter(viewer, post);
        let url = self.table_url(
            LIKES_TABLE,
            &[("select", "post_id".to_string()), user, post, ("limit", "1".to_string())],
        )?;

        let rows: Vec<serde_json::Value> = self
            .send(self.http.get(url))
            .await?
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    async fn insert_membership(
        &self,
        viewer: &ViewerId,
        post: &PostId,
    ) -> Result<(), ClientError> {
        let row = MembershipRow {
            user_id: viewer.clone(),
            post_id: post.clone(),
        };
        let url = self.table_url(LIKES_TABLE, &[])?;
        let req = self
            .http
            .post(url)
            .header("Prefer", "return=minimal")
            .json(&row);

        match self.send(req).await {
            Ok(_) => Ok(()),
            // Unique violation: the like already exists, which is what we wanted
            Err(ClientError::Rejected { status, .. }) if status == StatusCode::CONFLICT.as_u16() => {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_membership(
        &self,
        viewer: &ViewerId,
        post: &PostId,
    ) -> Result<(), ClientError> {
        let url = self.table_url(LIKES_TABLE, &Self::pair_filter(viewer, post))?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn count_memberships(&self, post: &PostId) -> Result<u32, ClientError> {
        let url = self.table_url(
            LIKES_TABLE,
            &[
                ("select", "post_id".to_string()),
                ("post_id", format!("eq.{post}")),
            ],
        )?;
        let response = self
            .send(self.http.head(url).header("Prefer", "count=exact"))
            .await?;

        response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse_total)
            .ok_or_else(|| ClientError::InvalidResponse("missing like count".into()))
    }

    async fn update_like_count(&self, post: &PostId, count: u32) -> Result<(), ClientError> {
        let url = self.table_url(POSTS_TABLE, &[("id", format!("eq.{post}"))])?;
        let req = self
            .http
            .patch(url)
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "like_count": count }));
        self.send(req).await?;
        Ok(())
    }

    async fn current_identity(&self) -> Result<Option<ViewerId>, ClientError> {
        if self.access_token.is_none() {
            return Ok(None);
        }

        let url = format!("{}/auth/v1/user", self.base_url);
        match self.send(self.http.get(url)).await {
            Ok(response) => {
                let user: AuthUser = response
                    .json()
                    .await
                    .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
                Ok(Some(user.id))
            }
            // Expired or revoked session reads as signed out
            Err(ClientError::Rejected { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubResponse, serve, serve_silent};

    fn client(base: &str) -> BackendClient {
        BackendClient::new(base, "anon", Duration::from_secs(2))
            .unwrap()
            .with_access_token("jwt")
    }

    fn pair() -> (ViewerId, PostId) {
        (ViewerId::new("u1"), PostId::new("p1"))
    }

    #[test]
    fn content_range_totals() {
        assert_eq!(BackendClient::parse_total("0-24/57"), Some(57));
        assert_eq!(BackendClient::parse_total("*/0"), Some(0));
        assert_eq!(BackendClient::parse_total("0-24/*"), None);
    }

    #[tokio::test]
    async fn membership_query_filters_by_pair() {
        let (base, server) = serve(vec![
            StubResponse::json(200, r#"[{"post_id":"p1"}]"#),
            StubResponse::json(200, "[]"),
        ])
        .await;
        let (viewer, post) = pair();
        let client = client(&base);

        assert!(client.query_membership(&viewer, &post).await.unwrap());
        assert!(!client.query_membership(&viewer, &post).await.unwrap());

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with(
            "GET /rest/v1/post_likes?select=post_id&user_id=eq.u1&post_id=eq.p1&limit=1 "
        ));
        let head = requests[0].to_lowercase();
        assert!(head.contains("apikey: anon"));
        assert!(head.contains("authorization: bearer jwt"));
    }

    #[tokio::test]
    async fn silent_backend_times_out() {
        let (base, _server) = serve_silent().await;
        let client = BackendClient::new(&base, "anon", Duration::from_millis(200)).unwrap();
        let (viewer, post) = pair();

        let err = client.insert_membership(&viewer, &post).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[tokio::test]
    async fn insert_posts_row_and_tolerates_duplicates() {
        let (base, server) = serve(vec![
            StubResponse::json(201, ""),
            StubResponse::json(409, r#"{"code":"23505"}"#),
        ])
        .await;
        let (viewer, post) = pair();
        let client = client(&base);

        client.insert_membership(&viewer, &post).await.unwrap();
        client.insert_membership(&viewer, &post).await.unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /rest/v1/post_likes "));
        assert!(requests[0].ends_with(r#"{"user_id":"u1","post_id":"p1"}"#));
    }

    #[tokio::test]
    async fn delete_failure_is_rejected() {
        let (base, server) = serve(vec![StubResponse::json(500, "oops")]).await;
        let (viewer, post) = pair();

        let err = client(&base)
            .delete_membership(&viewer, &post)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Rejected { status: 500, .. }));

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("DELETE /rest/v1/post_likes?user_id=eq.u1&post_id=eq.p1 "));
    }

    #[tokio::test]
    async fn count_reads_content_range() {
        let (base, server) = serve(vec![
            StubResponse::json(200, "").with_header("Content-Range", "*/12"),
        ])
        .await;

        let count = client(&base)
            .count_memberships(&PostId::new("p1"))
            .await
            .unwrap();
        assert_eq!(count, 12);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("HEAD /rest/v1/post_likes?select=post_id&post_id=eq.p1 "));
        assert!(requests[0].to_lowercase().contains("prefer: count=exact"));
    }

    #[tokio::test]
    async fn update_patches_post_counter() {
        let (base, server) = serve(vec![StubResponse::json(204, "")]).await;

        client(&base)
            .update_like_count(&PostId::new("p1"), 3)
            .await
            .unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("PATCH /rest/v1/posts?id=eq.p1 "));
        assert!(requests[0].ends_with(r#"{"like_count":3}"#));
    }

    #[tokio::test]
    async fn identity_resolution() {
        let (base, server) = serve(vec![
            StubResponse::json(200, r#"{"id":"u1","email":"a@b.c"}"#),
            StubResponse::json(401, r#"{"msg":"expired"}"#),
        ])
        .await;
        let client = client(&base);

        assert_eq!(
            client.current_identity().await.unwrap(),
            Some(ViewerId::new("u1"))
        );
        assert_eq!(client.current_identity().await.unwrap(), None);
        server.await.unwrap();

        let anonymous = BackendClient::new(&base, "anon", Duration::from_secs(1)).unwrap();
        assert_eq!(anonymous.current_identity().await.unwrap(), None);
    }
}
