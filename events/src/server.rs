//! Server-side analytics.
//!
//! Credentials are checked once at setup; sends are fire-and-forget so
//! provider latency never delays a response.

use std::env;
use std::sync::Arc;

use crate::catalog::LogEvent;
use crate::openpanel::OpenPanel;

/// Deployment environment; decides whether events are transmitted or logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") => Self::Production,
            _ => Self::Development,
        }
    }
}

/// Cheaply cloneable analytics handle. Disabled when credentials are missing.
#[derive(Clone)]
pub struct Analytics {
    inner: Option<Arc<OpenPanel>>,
    environment: Environment,
}

impl Analytics {
    /// Build the analytics handle from `OPENPANEL_CLIENT_ID` and
    /// `OPENPANEL_SECRET_KEY`. Missing credentials yield a disabled handle so
    /// the application remains startable without the integration.
    pub fn from_env() -> Self {
        let client_id = env::var("OPENPANEL_CLIENT_ID")
            .ok()
            .filter(|v| !v.is_empty());
        let client_secret = env::var("OPENPANEL_SECRET_KEY")
            .ok()
            .filter(|v| !v.is_empty());

        match (client_id, client_secret) {
            (Some(id), Some(secret)) => Self {
                inner: Some(Arc::new(OpenPanel::new(id, Some(secret)))),
                environment: Environment::from_env(),
            },
            _ => {
                tracing::warn!("analytics disabled: OpenPanel credentials not configured");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self {
            inner: None,
            environment: Environment::Development,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Record an event. Never blocks the caller: outside production the event
    /// is written to the local log, in production the send is scheduled on
    /// the runtime and the caller moves on.
    pub fn track(&self, event: &LogEvent, properties: serde_json::Value) {
        let Some(client) = &self.inner else {
            return;
        };

        if self.environment != Environment::Production {
            tracing::debug!(
                event = event.name,
                channel = event.channel,
                %properties,
                "track"
            );
            return;
        }

        let client = Arc::clone(client);
        let name = event.name;
        let mut properties = properties;
        if let Some(map) = properties.as_object_mut() {
            map.insert("channel".to_string(), event.channel.into());
        }

        tokio::spawn(async move {
            if let Err(e) = client.track(name, properties).await {
                tracing::error!("analytics send failed: {:?}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn disabled_handle_tracks_inertly() {
        let analytics = Analytics::disabled();
        assert!(!analytics.is_enabled());

        // Must not panic and must not require a network.
        analytics.track(&catalog::SIGN_IN, serde_json::json!({ "user_id": "u1" }));
    }

    #[tokio::test]
    async fn development_events_are_not_transmitted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/track"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let analytics = Analytics {
            inner: Some(Arc::new(OpenPanel::with_base_url(
                "client-1".to_string(),
                Some("secret-1".to_string()),
                server.uri(),
            ))),
            environment: Environment::Development,
        };

        analytics.track(&catalog::SIGN_IN, serde_json::json!({ "user_id": "u1" }));

        // Give a stray spawn a chance to fire before the mock asserts.
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn production_events_are_sent_without_blocking() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/track"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let analytics = Analytics {
            inner: Some(Arc::new(OpenPanel::with_base_url(
                "client-1".to_string(),
                Some("secret-1".to_string()),
                server.uri(),
            ))),
            environment: Environment::Production,
        };

        analytics.track(&catalog::SIGN_IN, serde_json::json!({ "user_id": "u1" }));

        // The send is scheduled, not awaited; poll until it lands.
        for _ in 0..100 {
            if !server.received_requests().await.unwrap_or_default().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
