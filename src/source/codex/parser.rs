//! OpenAI Codex CLI rollout record classification
//!
//! Every rollout line is a JSON object tagged by `type` (and `payload.type`
//! for events). Lines are classified into a closed set of records; anything
//! unknown or malformed becomes [`CodexRecord::Unrecognized`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::core::{RawUsage, TokenUsage};

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(rename = "type")]
    event_type: Option<String>,
    message: Option<String>,
    info: Option<TokenInfo>,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    total_token_usage: Option<RawUsage>,
    last_token_usage: Option<RawUsage>,
    model: Option<String>,
    model_name: Option<String>,
    metadata: Option<Metadata>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TurnContextPayload {
    model: Option<String>,
}

/// Session metadata written at the top of every rollout
#[derive(Debug, Clone, Default, Deserialize)]
pub(super) struct SessionMeta {
    pub(super) id: Option<String>,
    pub(super) timestamp: Option<String>,
    #[allow(dead_code)]
    pub(super) instructions: Option<String>,
    pub(super) cwd: Option<String>,
    #[allow(dead_code)]
    pub(super) originator: Option<String>,
}

/// Token-count event after normalization
#[derive(Debug, Clone, Default)]
pub(super) struct TokenCount {
    /// Usage since the previous event
    pub(super) last: Option<TokenUsage>,
    /// Running totals since session start
    pub(super) total: Option<TokenUsage>,
    /// Model named on the event itself
    pub(super) model: Option<String>,
}

#[derive(Debug, Clone)]
pub(super) enum CodexRecord {
    SessionMeta(SessionMeta),
    UserMessage(String),
    AgentMessage,
    TurnContext { model: Option<String> },
    TokenCount(TokenCount),
    Unrecognized,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn extract_model(payload: &EventPayload) -> Option<String> {
    if let Some(info) = &payload.info {
        let from_info = non_blank(&info.model)
            .or_else(|| non_blank(&info.model_name))
            .or_else(|| info.metadata.as_ref().and_then(|m| non_blank(&m.model)));
        if from_info.is_some() {
            return from_info;
        }
    }
    non_blank(&payload.model)
}

/// Timestamp stored on the line envelope
pub(super) fn line_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|ts| ts.parse::<DateTime<Utc>>().ok())
}

fn classify_event(payload: &Value) -> CodexRecord {
    let Ok(event) = EventPayload::deserialize(payload) else {
        return CodexRecord::Unrecognized;
    };
    match event.event_type.as_deref() {
        Some("user_message") => match event.message {
            Some(message) => CodexRecord::UserMessage(message),
            None => CodexRecord::Unrecognized,
        },
        Some("agent_message") => CodexRecord::AgentMessage,
        Some("token_count") => {
            let model = extract_model(&event);
            let Some(info) = event.info else {
                return CodexRecord::Unrecognized;
            };
            CodexRecord::TokenCount(TokenCount {
                last: info.last_token_usage.as_ref().map(RawUsage::normalize),
                total: info.total_token_usage.as_ref().map(RawUsage::normalize),
                model,
            })
        }
        _ => CodexRecord::Unrecognized,
    }
}

/// Classify one parsed rollout line
pub(super) fn classify(value: &Value) -> CodexRecord {
    let Some(entry_type) = value.get("type").and_then(Value::as_str) else {
        // Early rollouts start with a bare metadata object
        if value.get("id").is_some()
            && value.get("timestamp").is_some()
            && let Ok(meta) = SessionMeta::deserialize(value)
        {
            return CodexRecord::SessionMeta(meta);
        }
        return CodexRecord::Unrecognized;
    };
    let Some(payload) = value.get("payload") else {
        return CodexRecord::Unrecognized;
    };

    match entry_type {
        "session_meta" => match SessionMeta::deserialize(payload) {
            Ok(meta) => CodexRecord::SessionMeta(meta),
            Err(_) => CodexRecord::Unrecognized,
        },
        "turn_context" => match TurnContextPayload::deserialize(payload) {
            Ok(ctx) => CodexRecord::TurnContext {
                model: non_blank(&ctx.model),
            },
            Err(_) => CodexRecord::Unrecognized,
        },
        "event_msg" => classify_event(payload),
        _ => CodexRecord::Unrecognized,
    }
}
