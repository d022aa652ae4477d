//! Live feed event decoding.

use serde::{Deserialize, Serialize};

/// Longest raw payload kept for events this crate does not understand.
pub const MAX_RAW_CHARS: usize = 200;

/// Fields shared by every recognised event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Model or engine that produced the event
    #[serde(default, alias = "engine", skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

/// One event from the upstream live stream, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    UserMsg(EventBody),
    AgentReply(EventBody),
    SwarmTurn(EventBody),
    SwarmEnd(EventBody),
    CriticAction(EventBody),
    Heartbeat(EventBody),
    /// Any other JSON object, kept as a truncated raw string
    #[serde(skip_deserializing)]
    Unparsed { kind: String, raw: String },
}

impl FeedEvent {
    pub fn kind(&self) -> &str {
        match self {
            FeedEvent::UserMsg(_) => "user_msg",
            FeedEvent::AgentReply(_) => "agent_reply",
            FeedEvent::SwarmTurn(_) => "swarm_turn",
            FeedEvent::SwarmEnd(_) => "swarm_end",
            FeedEvent::CriticAction(_) => "critic_action",
            FeedEvent::Heartbeat(_) => "heartbeat",
            FeedEvent::Unparsed { kind, .. } => kind,
        }
    }
}

/// Decode one line of an NDJSON or SSE stream.
///
/// SSE `data:` prefixes are stripped; blank lines, SSE comments and other SSE
/// fields yield `None`, as does anything that is not a JSON object.
pub fn decode(line: &str) -> Option<FeedEvent> {
    let line = line.trim();
    let payload = match line.strip_prefix("data:") {
        Some(data) => data.trim_start(),
        None if line.is_empty() || line.starts_with(':') => return None,
        None if line.starts_with("event:") || line.starts_with("id:") || line.starts_with("retry:") => {
            return None
        }
        None => line,
    };

    let value: serde_json::Value = serde_json::from_str(payload).ok()?;
    if !value.is_object() {
        return None;
    }

    match serde_json::from_value::<FeedEvent>(value.clone()) {
        Ok(event) => Some(event),
        Err(_) => {
            let kind = value
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or("event")
                .to_string();
            Some(FeedEvent::Unparsed {
                kind,
                raw: truncate_chars(&value.to_string(), MAX_RAW_CHARS),
            })
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_agent_reply_with_engine_alias() {
        let event = decode(
            r#"{"type":"agent_reply","agent":"klaus","engine":"llama3","content":"done","ts":"2026-03-01T12:00:00Z"}"#,
        )
        .unwrap();
        let FeedEvent::AgentReply(body) = event else {
            panic!("expected agent_reply");
        };
        assert_eq!(body.agent.as_deref(), Some("klaus"));
        assert_eq!(body.model.as_deref(), Some("llama3"));
        assert_eq!(body.content, "done");
    }

    #[test]
    fn test_decode_sse_data_line() {
        let event = decode("data: {\"type\":\"heartbeat\",\"content\":\"online\"}").unwrap();
        assert_eq!(event.kind(), "heartbeat");
    }

    #[test]
    fn test_sse_framing_lines_are_skipped() {
        assert_eq!(decode(""), None);
        assert_eq!(decode(": keepalive"), None);
        assert_eq!(decode("event: message"), None);
        assert_eq!(decode("id: 42"), None);
    }

    #[test]
    fn test_non_json_and_non_object_dropped() {
        assert_eq!(decode("hello world"), None);
        assert_eq!(decode("[1,2,3]"), None);
        assert_eq!(decode("\"heartbeat\""), None);
    }

    #[test]
    fn test_unknown_type_becomes_unparsed_and_truncated() {
        let long = "x".repeat(500);
        let line = format!(r#"{{"type":"tool_call","content":"{}"}}"#, long);
        let event = decode(&line).unwrap();

        let FeedEvent::Unparsed { kind, raw } = event else {
            panic!("expected unparsed");
        };
        assert_eq!(kind, "tool_call");
        assert_eq!(raw.chars().count(), MAX_RAW_CHARS);
    }

    #[test]
    fn test_missing_type_is_unparsed_event() {
        let event = decode(r#"{"content":"hi"}"#).unwrap();
        assert_eq!(event.kind(), "event");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ab", 5), "ab");
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let event = FeedEvent::UserMsg(EventBody {
            content: "ping".to_string(),
            ..Default::default()
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "user_msg");
        assert_eq!(json["content"], "ping");
    }
}
