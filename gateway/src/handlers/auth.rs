//! Sign-in callback handling.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::cookies::{build_force_primary_cookie, build_preferred_provider_cookie};
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use events::catalog;

#[derive(Debug, Deserialize)]
pub struct AuthCallbackParams {
    pub code: Option<String>,
    pub client: Option<String>,
    pub return_to: Option<String>,
    pub provider: Option<String>,
}

/// Landing point for the identity provider's post-sign-in redirect.
///
/// Exchanges the one-time code for a session, records the sign-in, and sends
/// the user agent on to wherever it was headed. Exchange failures are logged
/// and tolerated: the user always ends up on a redirect, never an error page.
pub async fn auth_callback(
    State(state): State<AppState>,
    Query(params): Query<AuthCallbackParams>,
) -> Response {
    match handle_callback_inner(&state, params).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Auth callback error: {:?}", e);
            Redirect::temporary(&state.config.base_url).into_response()
        }
    }
}

async fn handle_callback_inner(
    state: &AppState,
    params: AuthCallbackParams,
) -> ApiResult<Response> {
    let origin = state.config.base_url.trim_end_matches('/');

    tracing::debug!(
        has_code = params.code.is_some(),
        client = params.client.as_deref(),
        return_to = params.return_to.as_deref(),
        provider = params.provider.as_deref(),
        "auth callback"
    );

    // The desktop client finishes sign-in through its own deep link.
    if params.client.as_deref() == Some("desktop") {
        let code = params.code.as_deref().unwrap_or_default();
        let target = format!("{}/verify?code={}", origin, urlencoding::encode(code));
        return Ok(Redirect::temporary(&target).into_response());
    }

    let mut pending_cookies = Vec::new();

    // Remember the chosen provider for the next sign-in, whatever happens below.
    if let Some(provider) = params.provider.as_deref() {
        pending_cookies.push(build_preferred_provider_cookie(provider));
    }

    if let Some(code) = params.code.as_deref() {
        tracing::debug!("exchanging code for session");

        match state.sessions.exchange_code(code).await {
            Ok(Some(session)) => {
                let user_id = session.user.id.clone();
                tracing::info!(
                    user_id = %user_id,
                    email = session.user.email.as_deref(),
                    "session established"
                );

                // The user record may not have replicated yet; tell downstream
                // reads to hit the primary for the next few seconds.
                pending_cookies.push(build_force_primary_cookie());

                state.analytics.track(
                    &catalog::SIGN_IN,
                    serde_json::json!({ "user_id": user_id }),
                );

                // An invite link wins over the no-teams branch: the user must
                // land on the teams page to accept or decline the invite.
                if params
                    .return_to
                    .as_deref()
                    .is_some_and(|r| r.starts_with("teams/invite/"))
                {
                    return redirect_with_cookies(
                        &format!("{}/teams", origin),
                        &pending_cookies,
                    );
                }

                match state.sessions.team_membership_count(&session).await {
                    Ok(0) => {
                        tracing::debug!(user_id = %user_id, "no teams, redirecting to team creation");
                        return redirect_with_cookies(
                            &format!("{}/teams/create", origin),
                            &pending_cookies,
                        );
                    }
                    Ok(count) => {
                        tracing::debug!(user_id = %user_id, count, "existing team memberships");
                    }
                    Err(e) => {
                        tracing::error!("team membership lookup failed: {:?}", e);
                    }
                }
            }
            Ok(None) => {
                tracing::warn!("code exchange produced no session");
            }
            Err(e) => {
                tracing::error!("code exchange failed: {:?}", e);
            }
        }
    } else {
        tracing::debug!("no authorization code in callback");
    }

    let target = match params.return_to.as_deref() {
        Some(return_to) => format!("{}/{}", origin, return_to),
        None => origin.to_string(),
    };

    redirect_with_cookies(&target, &pending_cookies)
}

fn redirect_with_cookies(target: &str, cookies: &[String]) -> ApiResult<Response> {
    let mut response = Redirect::temporary(target).into_response();

    for cookie in cookies {
        let value = HeaderValue::from_str(cookie)
            .map_err(|_| ApiError::BadRequest("invalid cookie value".to_string()))?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    Ok(response)
}
