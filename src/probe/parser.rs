//! Best-effort extraction of a detail string from health responses.

use serde::Deserialize;

/// Fields commonly found on service health bodies.
///
/// `/health` endpoints tend to report `{"status": "ok"}`; Ollama's
/// `/api/tags` reports `{"models": [...]}`.
#[derive(Deserialize)]
struct HealthBody {
    #[serde(default)]
    status: Option<serde_json::Value>,
    #[serde(default)]
    models: Option<Vec<serde_json::Value>>,
}

/// Extract a short human-readable detail from a response body.
///
/// A non-empty string `status` wins; otherwise a `models` array is reported
/// as a count. Anything that is not a JSON object yields `None`.
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: HealthBody = serde_json::from_str(body).ok()?;

    if let Some(serde_json::Value::String(status)) = parsed.status {
        if !status.is_empty() {
            return Some(status);
        }
    }

    parsed.models.map(|models| match models.len() {
        1 => "1 model".to_string(),
        n => format!("{} models", n),
    })
}
