//! Cookie names and builders for the sign-in flow.

/// Records which provider the user last signed in with.
pub const PREFERRED_PROVIDER: &str = "preferred_signin_provider";

/// Tells downstream reads to hit the primary database while a freshly created
/// user record replicates.
pub const FORCE_PRIMARY: &str = "force_primary";

const ONE_YEAR_SECONDS: i64 = 365 * 24 * 60 * 60;
const FORCE_PRIMARY_SECONDS: i64 = 10;

/// Build the long-lived provider-preference cookie (one year).
pub fn build_preferred_provider_cookie(provider: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        PREFERRED_PROVIDER, provider, ONE_YEAR_SECONDS
    )
}

/// Build the short-lived force-primary flag (ten seconds).
///
/// Not HttpOnly: client-side data fetching reads it to route around
/// replication lag.
pub fn build_force_primary_cookie() -> String {
    format!(
        "{}=true; Path=/; SameSite=Lax; Max-Age={}",
        FORCE_PRIMARY, FORCE_PRIMARY_SECONDS
    )
}
