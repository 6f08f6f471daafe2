//! Claude Code JSONL line decoding
//!
//! Lines become either a graph node, a summary keyed by its leaf, or nothing.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::core::{RawUsage, TokenUsage};

// ============================================================================
// Internal types for JSONL parsing
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLine {
    #[serde(rename = "type")]
    entry_type: Option<String>,
    uuid: Option<String>,
    parent_uuid: Option<String>,
    session_id: Option<String>,
    timestamp: Option<String>,
    is_sidechain: Option<bool>,
    is_meta: Option<bool>,
    cwd: Option<String>,
    request_id: Option<String>,
    message: Option<RawMessage>,
    tool_use_result: Option<Value>,
    leaf_uuid: Option<String>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    id: Option<String>,
    model: Option<String>,
    content: Option<Value>,
    usage: Option<RawUsage>,
}

// ============================================================================
// Public shapes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Role {
    User,
    Assistant,
    /// System and progress records: kept so parent chains stay connected
    Other,
}

/// Usage carried by one assistant record
#[derive(Debug, Clone)]
pub(super) struct NodeUsage {
    pub(super) message_id: Option<String>,
    pub(super) request_id: Option<String>,
    pub(super) model: Option<String>,
    pub(super) usage: TokenUsage,
}

/// One conversational record of the parent-pointer forest
#[derive(Debug, Clone)]
pub(super) struct MessageNode {
    pub(super) uuid: String,
    pub(super) parent_uuid: Option<String>,
    pub(super) session_id: Option<String>,
    pub(super) timestamp: Option<DateTime<Utc>>,
    pub(super) role: Role,
    pub(super) is_sidechain: bool,
    pub(super) is_meta: bool,
    pub(super) cwd: Option<String>,
    /// Plain text of `message.content`
    pub(super) text: Option<String>,
    pub(super) is_tool_result: bool,
    pub(super) usage: Option<NodeUsage>,
    /// Index of the file this node was read from
    pub(super) file: usize,
}

impl MessageNode {
    /// Key identifying one assistant turn across divergent histories
    pub(super) fn dedup_key(&self) -> String {
        let usage = self.usage.as_ref();
        let message_id = usage.and_then(|u| u.message_id.as_deref());
        let request_id = usage.and_then(|u| u.request_id.as_deref());
        match (message_id, request_id) {
            (Some(m), Some(r)) => format!("{m}:{r}"),
            (Some(m), None) => m.to_string(),
            (None, Some(r)) => r.to_string(),
            (None, None) => self.uuid.clone(),
        }
    }

    pub(super) fn is_conversational(&self) -> bool {
        matches!(self.role, Role::User | Role::Assistant)
    }
}

#[derive(Debug, Clone)]
pub(super) enum ClaudeLine {
    Node(MessageNode),
    Summary { leaf_uuid: String, summary: String },
    Ignored,
}

// ============================================================================
// Decoding
// ============================================================================

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Strip provider prefixes such as Bedrock's `anthropic.`
fn normalize_model_name(model: &str) -> String {
    let model = model.trim();
    model.strip_prefix("anthropic.").unwrap_or(model).to_string()
}

/// Text of a message body: either a plain string or the `text` blocks of a
/// content array joined by spaces
pub(super) fn extract_text(content: &Value) -> Option<String> {
    if let Some(s) = content.as_str() {
        return Some(s.to_string());
    }
    let texts: Vec<&str> = content
        .as_array()?
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect();
    (!texts.is_empty()).then(|| texts.join(" "))
}

fn has_tool_result_block(content: &Value) -> bool {
    content.as_array().is_some_and(|blocks| {
        blocks
            .iter()
            .any(|block| block.get("type").and_then(Value::as_str) == Some("tool_result"))
    })
}

/// Decode one line. `file` is the index of the file being read.
pub(super) fn parse_line(line: &str, file: usize) -> Result<ClaudeLine, serde_json::Error> {
    let raw: RawLine = serde_json::from_str(line)?;

    if raw.entry_type.as_deref() == Some("summary") {
        return Ok(match (non_empty(raw.leaf_uuid), raw.summary) {
            (Some(leaf_uuid), Some(summary)) => ClaudeLine::Summary { leaf_uuid, summary },
            _ => ClaudeLine::Ignored,
        });
    }

    let Some(uuid) = non_empty(raw.uuid) else {
        return Ok(ClaudeLine::Ignored);
    };

    let role = match raw.entry_type.as_deref() {
        Some("user") => Role::User,
        Some("assistant") => Role::Assistant,
        _ => Role::Other,
    };

    let (text, content_has_tool_result, usage) = match raw.message {
        Some(message) => {
            let content = message.content.as_ref();
            let usage = (role == Role::Assistant)
                .then_some(message.usage)
                .flatten()
                .map(|usage| NodeUsage {
                    message_id: non_empty(message.id),
                    request_id: non_empty(raw.request_id),
                    model: non_empty(message.model).map(|m| normalize_model_name(&m)),
                    usage: usage.normalize(),
                });
            (
                content.and_then(extract_text),
                content.is_some_and(has_tool_result_block),
                usage,
            )
        }
        None => (None, false, None),
    };

    Ok(ClaudeLine::Node(MessageNode {
        uuid,
        parent_uuid: non_empty(raw.parent_uuid),
        session_id: non_empty(raw.session_id),
        timestamp: raw
            .timestamp
            .as_deref()
            .and_then(|ts| ts.parse::<DateTime<Utc>>().ok()),
        role,
        is_sidechain: raw.is_sidechain.unwrap_or(false),
        is_meta: raw.is_meta.unwrap_or(false),
        cwd: non_empty(raw.cwd),
        text,
        is_tool_result: content_has_tool_result || raw.tool_use_result.is_some(),
        usage,
        file,
    }))
}

// ============================================================================
// Preview selection
// ============================================================================

const CAVEAT_PREFIX: &str = "Caveat:";
const INTERRUPTED_PREFIX: &str = "[Request interrupted by user";
const COMMAND_MARKERS: [&str; 2] = ["<command-name>", "<command-message>"];
const LOCAL_STDOUT_MARKER: &str = "<local-command-stdout>";

/// True when a user record is typed by a human rather than injected by the CLI
pub(super) fn is_user_authored(node: &MessageNode) -> bool {
    if node.role != Role::User || node.is_meta || node.is_tool_result {
        return false;
    }
    let Some(text) = node.text.as_deref() else {
        return false;
    };
    let text = text.trim_start();
    !(text.starts_with(CAVEAT_PREFIX)
        || text.starts_with(INTERRUPTED_PREFIX)
        || text.starts_with(LOCAL_STDOUT_MARKER)
        || COMMAND_MARKERS.iter().any(|marker| text.starts_with(marker)))
}
