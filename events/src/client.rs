//! Client-surface analytics.
//!
//! Unlike the server variant, configuration is read on every call so the
//! module stays usable before any setup has run. Only the public client id is
//! required; no secret is transmitted.

use std::env;

use crate::catalog::LogEvent;
use crate::openpanel::OpenPanel;
use crate::server::Environment;

/// Record an event from a client-rendered surface.
///
/// Silently does nothing when `OPENPANEL_CLIENT_ID` is unset. Outside
/// production the event is diverted to the local log.
pub fn track(event: &LogEvent, properties: serde_json::Value) {
    let Some(client_id) = env::var("OPENPANEL_CLIENT_ID")
        .ok()
        .filter(|v| !v.is_empty())
    else {
        return;
    };

    if Environment::from_env() != Environment::Production {
        tracing::debug!(
            event = event.name,
            channel = event.channel,
            %properties,
            "track"
        );
        return;
    }

    let client = OpenPanel::new(client_id, None);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn unconfigured_track_is_inert() {
        std::env::remove_var("OPENPANEL_CLIENT_ID");

        // No runtime needed: the unconfigured path returns before any spawn.
        track(&catalog::SIGN_IN, serde_json::json!({ "source": "test" }));
    }
}
