//! Authentication configuration

use serde::{Deserialize, Serialize};

/// Dashboard access control and observer settings.
///
/// The password itself never lives in the config file; only the name of the
/// environment variable holding it does.
///
/// # Example
///
/// ```toml
/// [auth]
/// require_session = true
/// password_env = "FLEETWATCH_PASSWORD"
/// observer_url = "https://observer.example.net"
/// app_id = "fleetwatch"
/// session_ttl_seconds = 86400
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Gate fleet endpoints behind a valid session
    pub require_session: bool,
    /// Environment variable holding the dashboard password
    pub password_env: String,
    /// Base URL of the remote approval authority
    pub observer_url: String,
    /// Application id sent when starting an approval session
    pub app_id: String,
    /// Account the approval request is raised for
    pub email: String,
    /// Lifetime of a locally issued session
    pub session_ttl_seconds: u64,
    /// Client-side poll cadence while waiting for approval
    pub poll_interval_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            require_session: true,
            password_env: "FLEETWATCH_PASSWORD".to_string(),
            observer_url: "http://localhost:9100".to_string(),
            app_id: "fleetwatch".to_string(),
            email: "operator@localhost".to_string(),
            session_ttl_seconds: 60 * 60 * 24,
            poll_interval_ms: 2000,
        }
    }
}

impl AuthConfig {
    /// Read the configured password from the environment.
    ///
    /// An unset or empty variable disables password login.
    pub fn password(&self) -> Option<String> {
        std::env::var(&self.password_env)
            .ok()
            .filter(|p| !p.is_empty())
    }
}
