//! Wire client for the OpenPanel track API.

use serde::Serialize;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.openpanel.dev";

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Serialize)]
struct TrackBody<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    payload: TrackPayload<'a>,
}

#[derive(Serialize)]
struct TrackPayload<'a> {
    name: &'a str,
    properties: serde_json::Value,
    timestamp: String,
}

#[derive(Debug, Clone)]
pub(crate) struct OpenPanel {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: Option<String>,
}

impl OpenPanel {
    pub(crate) fn new(client_id: String, client_secret: Option<String>) -> Self {
        Self::with_base_url(client_id, client_secret, DEFAULT_BASE_URL.to_string())
    }

    pub(crate) fn with_base_url(
        client_id: String,
        client_secret: Option<String>,
        base_url: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        }
    }

    pub(crate) async fn track(
        &self,
        name: &str,
        properties: serde_json::Value,
    ) -> Result<(), AnalyticsError> {
        let mut request = self
            .http
            .post(format!("{}/track", self.base_url))
            .header("openpanel-client-id", &self.client_id)
            .json(&TrackBody {
                kind: "track",
                payload: TrackPayload {
                    name,
                    properties,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                },
            });

        if let Some(secret) = &self.client_secret {
            request = request.header("openpanel-client-secret", secret);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyticsError::Api { status, body });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn track_posts_credentials_and_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/track"))
            .and(header("openpanel-client-id", "client-1"))
            .and(header("openpanel-client-secret", "secret-1"))
            .and(body_string_contains("User Signed In"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenPanel::with_base_url(
            "client-1".to_string(),
            Some("secret-1".to_string()),
            server.uri(),
        );

        client
            .track("User Signed In", serde_json::json!({ "channel": "login" }))
            .await
            .expect("track should succeed");
    }

    #[tokio::test]
    async fn track_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/track"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
            .mount(&server)
            .await;

        let client = OpenPanel::with_base_url("client-1".to_string(), None, server.uri());
        let result = client.track("User Signed In", serde_json::json!({})).await;

        assert!(matches!(result, Err(AnalyticsError::Api { .. })));
    }
}
