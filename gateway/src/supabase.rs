//! Thin client for the hosted Supabase project that owns sessions and
//! relational data.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed count response")]
    MalformedCount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}

/// Session material returned by the code exchange. Owned by the identity
/// provider; held only for the duration of the request.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: SessionUser,
}

/// Seam between the callback handler and the hosted auth/data APIs.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Exchange a one-time authorization code for a session.
    ///
    /// `Ok(None)` means the provider accepted the request but produced no
    /// session.
    async fn exchange_code(&self, code: &str) -> Result<Option<Session>, SupabaseError>;

    /// Number of teams the session's user belongs to.
    async fn team_membership_count(&self, session: &Session) -> Result<i64, SupabaseError>;
}

pub struct Supabase {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl Supabase {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        }
    }
}

#[derive(serde::Serialize)]
struct ExchangeRequest<'a> {
    auth_code: &'a str,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    access_token: Option<String>,
    user: Option<SessionUser>,
}

#[async_trait]
impl SessionStore for Supabase {
    async fn exchange_code(&self, code: &str) -> Result<Option<Session>, SupabaseError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/token?grant_type=pkce", self.base_url))
            .header("apikey", &self.anon_key)
            .json(&ExchangeRequest { auth_code: code })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api { status, body });
        }

        let exchange: ExchangeResponse = response.json().await?;

        match (exchange.access_token, exchange.user) {
            (Some(access_token), Some(user)) => Ok(Some(Session { access_token, user })),
            _ => Ok(None),
        }
    }

    async fn team_membership_count(&self, session: &Session) -> Result<i64, SupabaseError> {
        let filter = format!("eq.{}", session.user.id);
        let response = self
            .http
            .get(format!("{}/rest/v1/users_on_team", self.base_url))
            .query(&[("select", "user_id"), ("user_id", filter.as_str())])
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api { status, body });
        }

        // PostgREST reports the exact count after the slash: "0-0/3" or "*/0".
        response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or(SupabaseError::MalformedCount)
    }
}
