//! Startup configuration.

use std::time::Duration;

use log::{info, warn};

use crate::settings::{self, SettingsProvider};

/// Used when neither the command line nor the settings name a server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Resolved startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server_url: String,
    pub timeout: Option<Duration>,
}

impl AppConfig {
    /// Resolves the configuration from the command line and stored settings.
    ///
    /// The server URL comes from the first argument, else the stored
    /// setting, else [`DEFAULT_SERVER_URL`]. The resolved URL is stored
    /// back so the next run reuses it.
    pub async fn resolve(
        mut args: impl Iterator<Item = String>,
        settings: Option<&SettingsProvider>,
    ) -> Self {
        let from_args = args.next();

        let mut stored_url = None;
        let mut timeout = None;
        if let Some(settings) = settings {
            match settings.get::<String>(settings::SERVER_URL).await {
                Ok(url) => stored_url = url,
                Err(e) => warn!("Ignoring stored server URL: {}", e),
            }
            match settings.get_or(settings::SERVER_TIMEOUT_SECS, 0u64).await {
                Ok(secs) => timeout = (secs > 0).then(|| Duration::from_secs(secs)),
                Err(e) => {
                    warn!("Dropping unreadable stored timeout: {}", e);
                    let _ = settings.delete(settings::SERVER_TIMEOUT_SECS).await;
                }
            }
        }

        let server_url = from_args
            .or(stored_url)
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        if let Some(settings) = settings
            && let Err(e) = settings.set(settings::SERVER_URL, &server_url).await
        {
            warn!("Could not store server URL: {}", e);
        }

        info!("Using server {} (timeout {:?})", server_url, timeout);
        Self {
            server_url,
            timeout,
        }
    }
}
