//! Transactional email glue (Resend).
//!
//! The mailer is optional: without `RESEND_API_KEY` every operation warns and
//! returns an inert success, so the application starts and runs without the
//! credential. Callers never see an error for missing configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// An outbound email.
#[derive(Debug, Clone, Serialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Delivery receipt. `id` is absent when the mailer is disabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendReceipt {
    pub id: Option<String>,
}

pub struct Mailer {
    inner: Option<ResendClient>,
}

impl Mailer {
    /// Build the mailer from `RESEND_API_KEY`. A missing key yields a
    /// disabled mailer.
    pub fn from_env() -> Self {
        match std::env::var("RESEND_API_KEY").ok().filter(|k| !k.is_empty()) {
            Some(api_key) => Self {
                inner: Some(ResendClient::new(api_key)),
            },
            None => {
                tracing::warn!("mailer disabled: RESEND_API_KEY not configured");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Send an email, or warn and succeed inertly when unconfigured.
    pub async fn send(&self, email: Email) -> Result<SendReceipt, MailerError> {
        match &self.inner {
            Some(client) => client.send(&email).await,
            None => {
                tracing::warn!(
                    subject = %email.subject,
                    "email not sent: RESEND_API_KEY not configured"
                );
                Ok(SendReceipt::default())
            }
        }
    }

    /// Remove a contact from an audience, or warn and succeed inertly when
    /// unconfigured.
    pub async fn remove_contact(
        &self,
        audience_id: &str,
        contact_id: &str,
    ) -> Result<(), MailerError> {
        match &self.inner {
            Some(client) => client.remove_contact(audience_id, contact_id).await,
            None => {
                tracing::warn!(
                    contact_id,
                    "contact not removed: RESEND_API_KEY not configured"
                );
                Ok(())
            }
        }
    }
}

struct ResendClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ResendClient {
    fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn send(&self, email: &Email) -> Result<SendReceipt, MailerError> {
        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    async fn remove_contact(
        &self,
        audience_id: &str,
        contact_id: &str,
    ) -> Result<(), MailerError> {
        let response = self
            .http
            .delete(format!(
                "{}/audiences/{}/contacts/{}",
                self.base_url, audience_id, contact_id
            ))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Api { status, body });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_email() -> Email {
        Email {
            from: "Acme <noreply@acme.test>".to_string(),
            to: vec!["person@example.com".to_string()],
            subject: "Welcome".to_string(),
            html: "<p>hi</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn disabled_send_returns_inert_receipt() {
        let mailer = Mailer::disabled();
        assert!(!mailer.is_enabled());

        let receipt = mailer.send(test_email()).await.expect("should not error");
        assert!(receipt.id.is_none());
    }

    #[tokio::test]
    async fn disabled_contact_removal_succeeds() {
        let mailer = Mailer::disabled();
        mailer
            .remove_contact("aud-1", "contact-1")
            .await
            .expect("should not error");
    }

    #[tokio::test]
    async fn send_forwards_to_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "id": "email-1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mailer = Mailer {
            inner: Some(ResendClient::with_base_url(
                "re_123".to_string(),
                server.uri(),
            )),
        };

        let receipt = mailer.send(test_email()).await.expect("send should succeed");
        assert_eq!(receipt.id.as_deref(), Some("email-1"));
    }

    #[tokio::test]
    async fn provider_error_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
            .mount(&server)
            .await;

        let mailer = Mailer {
            inner: Some(ResendClient::with_base_url(
                "re_123".to_string(),
                server.uri(),
            )),
        };

        let result = mailer.send(test_email()).await;
        assert!(matches!(result, Err(MailerError::Api { .. })));
    }

    #[tokio::test]
    async fn remove_contact_hits_audience_path() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/audiences/aud-1/contacts/contact-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mailer = Mailer {
            inner: Some(ResendClient::with_base_url(
                "re_123".to_string(),
                server.uri(),
            )),
        };

        mailer
            .remove_contact("aud-1", "contact-1")
            .await
            .expect("removal should succeed");
    }
}
