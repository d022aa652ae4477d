//! Unlock command: client side of the approval flow against a dashboard.

use crate::api::auth::SESSION_COOKIE;
use crate::approval::{ApprovalError, ApprovalPoller, ApprovalStatus, ApprovalTicket, PollerState, StatusSource};
use crate::cli::{load_config, UnlockArgs};
use async_trait::async_trait;
use colored::Colorize;
use serde::Deserialize;
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Deserialize)]
struct PollReply {
    status: ApprovalStatus,
}

/// Talks to a running dashboard's `/auth` endpoint and keeps the session
/// cookie it hands out.
pub struct DashboardClient {
    client: reqwest::Client,
    base_url: String,
    session: Mutex<Option<String>>,
}

impl DashboardClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: Mutex::new(None),
        }
    }

    /// `POST /auth {"action":"unlock"}`
    pub async fn start(&self) -> Result<ApprovalTicket, ApprovalError> {
        let response = self
            .client
            .post(format!("{}/auth", self.base_url))
            .json(&json!({ "action": "unlock" }))
            .send()
            .await
            .map_err(|e| ApprovalError::ObserverUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApprovalError::ObserverUnreachable(format!(
                "dashboard returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ApprovalError::ObserverUnreachable(e.to_string()))
    }

    /// Session token captured from the approving poll, if any.
    pub fn session(&self) -> Option<String> {
        self.session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn capture_cookie(&self, headers: &reqwest::header::HeaderMap) {
        let token = headers
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.to_string());

        if let Some(token) = token {
            *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Some(token);
        }
    }
}

#[async_trait]
impl StatusSource for DashboardClient {
    /// `GET /auth?action=poll&session_id=...`. A 502 from the dashboard means
    /// it could not reach the observer; that is transient like any transport
    /// failure.
    async fn poll_status(&self, session_id: &str) -> Result<ApprovalStatus, ApprovalError> {
        let response = self
            .client
            .get(format!("{}/auth", self.base_url))
            .query(&[("action", "poll"), ("session_id", session_id)])
            .send()
            .await
            .map_err(|e| ApprovalError::ObserverUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApprovalError::ObserverUnreachable(format!(
                "dashboard returned {}",
                response.status()
            )));
        }

        self.capture_cookie(response.headers());

        let reply: PollReply = response
            .json()
            .await
            .map_err(|e| ApprovalError::ObserverUnreachable(e.to_string()))?;
        Ok(reply.status)
    }
}

/// Poll cadence: `--interval-ms` when given, else `auth.poll_interval_ms`.
pub fn poll_interval(args: &UnlockArgs) -> Result<Duration, Box<dyn std::error::Error>> {
    let millis = match args.interval_ms {
        Some(ms) => ms,
        None => load_config(&args.config)?.auth.poll_interval_ms,
    };
    Ok(Duration::from_millis(millis.max(1)))
}

/// Turn a finished poller into the command outcome.
///
/// `Approved` without a captured cookie is a failure: the dashboard hands out
/// one session per approval and will not issue another for the same code.
fn finish(
    state: PollerState,
    session: Option<String>,
) -> Result<String, Box<dyn std::error::Error>> {
    match (state, session) {
        (PollerState::Approved, Some(token)) => Ok(token),
        (PollerState::Approved, None) => Err(
            "approval was granted but its session was already redeemed; run unlock again".into(),
        ),
        (PollerState::Failed(reason), _) => Err(reason.into()),
        (PollerState::Idle | PollerState::AwaitingApproval { .. }, _) => {
            Err("approval flow ended unexpectedly".into())
        }
    }
}

/// Handle `fleetwatch unlock`.
pub async fn handle_unlock(args: &UnlockArgs) -> Result<(), Box<dyn std::error::Error>> {
    let interval = poll_interval(args)?;
    let client = DashboardClient::new(&args.url);
    let ticket = client.start().await?;

    println!("Approval code: {}", ticket.code.bold());
    if let Some(secs) = ticket.expires_in {
        println!("Waiting for approval (expires in {}s)...", secs);
    } else {
        println!("Waiting for approval...");
    }

    let mut poller = ApprovalPoller::new(client);
    poller.begin(ticket);
    let state = poller.run(interval).await.clone();

    let token = finish(state, poller.into_source().session())?;
    println!("{} Access approved", "✓".green());
    println!("Session: {}", token);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_dashboard_client_captures_session_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth"))
            .and(body_json(json!({"action": "unlock"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "session_id": "s1", "code": "ZX81", "expires_in": 120
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth"))
            .and(query_param("action", "poll"))
            .and(query_param("session_id", "s1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(
                        "set-cookie",
                        "fleetwatch_session=tok123; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=60",
                    )
                    .set_body_json(json!({"status": "approved"})),
            )
            .mount(&server)
            .await;

        let client = DashboardClient::new(&server.uri());
        let ticket = client.start().await.unwrap();
        assert_eq!(ticket.code, "ZX81");

        let mut poller = ApprovalPoller::new(client);
        poller.begin(ticket);
        assert_eq!(poller.step().await, &PollerState::Approved);
        assert_eq!(poller.into_source().session().as_deref(), Some("tok123"));
    }

    #[tokio::test]
    async fn test_dashboard_502_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(502).set_body_json(json!({"status": "error"})))
            .mount(&server)
            .await;

        let client = DashboardClient::new(&server.uri());
        assert!(matches!(
            client.poll_status("s1").await,
            Err(ApprovalError::ObserverUnreachable(_))
        ));
    }

    #[test]
    fn test_approved_without_session_is_an_error() {
        let err = finish(PollerState::Approved, None).unwrap_err();
        assert!(err.to_string().contains("already redeemed"));

        assert_eq!(
            finish(PollerState::Approved, Some("tok".to_string())).unwrap(),
            "tok"
        );
        assert_eq!(
            finish(PollerState::Failed("access denied".to_string()), None)
                .unwrap_err()
                .to_string(),
            "access denied"
        );
    }

    #[tokio::test]
    async fn test_dashboard_approved_poll_without_cookie_leaves_no_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "approved"})))
            .mount(&server)
            .await;

        let client = DashboardClient::new(&server.uri());
        assert_eq!(client.poll_status("s1").await.unwrap(), ApprovalStatus::Approved);
        assert!(finish(PollerState::Approved, client.session()).is_err());
    }

    fn unlock_args(interval_ms: Option<u64>, config: std::path::PathBuf) -> UnlockArgs {
        UnlockArgs {
            url: "http://localhost:8080".to_string(),
            interval_ms,
            config,
        }
    }

    #[test]
    fn test_poll_interval_from_config() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[auth]\npoll_interval_ms = 750\n").unwrap();

        let interval = poll_interval(&unlock_args(None, temp.path().to_path_buf())).unwrap();
        assert_eq!(interval, Duration::from_millis(750));
    }

    #[test]
    fn test_poll_interval_flag_wins_over_config() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[auth]\npoll_interval_ms = 750\n").unwrap();

        let interval = poll_interval(&unlock_args(Some(100), temp.path().to_path_buf())).unwrap();
        assert_eq!(interval, Duration::from_millis(100));
    }

    #[test]
    fn test_poll_interval_defaults_without_config_file() {
        let args = unlock_args(None, std::path::PathBuf::from("no-such-fleetwatch.toml"));
        assert_eq!(poll_interval(&args).unwrap(), Duration::from_millis(2000));
    }
}
