use std::collections::BTreeMap;

use crate::core::{SessionInventory, SessionRecord};
use crate::error::AppError;

fn session_json(session: &SessionRecord, show_cost: bool) -> serde_json::Value {
    // Sorted so the output is stable across runs
    let models: BTreeMap<_, _> = session.models.iter().collect();

    let mut obj = serde_json::json!({
        "id": session.id,
        "source": session.source,
        "resume_target": session.resume_target,
        "path": session.path,
        "timestamp": session.timestamp.to_rfc3339(),
        "preview": session.preview,
        "summary": session.summary,
        "cwd": session.cwd,
        "primary_model": session.primary_model,
        "message_count": session.message_count,
        "usage": session.usage,
        "blended_tokens": session.blended_tokens,
        "models": models,
        "is_fork": session.is_fork,
        "branch": session.branch,
        "head_records": session.head_records,
    });
    if show_cost {
        obj["cost_usd"] = serde_json::json!(session.cost_usd);
    }
    obj
}

/// Render the inventory as pretty-printed JSON
pub(crate) fn output_inventory_json(
    inventory: &SessionInventory,
    show_cost: bool,
) -> Result<String, AppError> {
    let sessions: Vec<serde_json::Value> = inventory
        .sessions
        .iter()
        .map(|s| session_json(s, show_cost))
        .collect();

    let mut totals = serde_json::json!({
        "sessions": inventory.sessions.len(),
        "blended_tokens": inventory.total_blended_tokens,
    });
    if show_cost {
        totals["cost_usd"] = serde_json::json!(inventory.total_cost_usd);
    }

    let output = serde_json::json!({
        "sessions": sessions,
        "totals": totals,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}
