//! Deployment base-URL resolution.

use std::env;

const LOCAL_DEFAULT: &str = "http://localhost:3001";

/// Base URL for the running deployment.
///
/// Prefers an explicit `PUBLIC_APP_URL`, then the platform-assigned
/// `VERCEL_URL` hostname, then the local development default.
pub fn deployment_url() -> String {
    resolve(env::var("PUBLIC_APP_URL").ok(), env::var("VERCEL_URL").ok())
}

fn resolve(explicit: Option<String>, platform_host: Option<String>) -> String {
    if let Some(url) = explicit.filter(|u| !u.is_empty()) {
        return url;
    }

    if let Some(host) = platform_host.filter(|h| !h.is_empty()) {
        return format!("https://{}", host);
    }

    LOCAL_DEFAULT.to_string()
}
