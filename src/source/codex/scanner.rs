//! Codex rollout discovery and streaming scan
//!
//! Rollouts live under `sessions/YYYY/MM/DD/rollout-<timestamp>-<uuid>.jsonl`.
//! The tree is walked newest first so that a scan ceiling or result limit
//! keeps the most recent sessions.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::{SessionRecord, SourceKind, TokenUsage, UsageAccumulator};
use crate::error::ScanError;
use crate::source::ScanOptions;
use crate::utils::preview_text;

use super::parser::{CodexRecord, SessionMeta, TokenCount, classify, line_timestamp};

/// Model attributed to usage when neither the event nor a turn context names one
pub(super) const FALLBACK_MODEL: &str = "gpt-5";

const ROLLOUT_PREFIX: &str = "rollout-";
const ROLLOUT_TIMESTAMP_LEN: usize = "2025-01-01T00-00-00".len();
const ROLLOUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

// ============================================================================
// Discovery
// ============================================================================

/// Subdirectories with purely numeric names, largest first
fn numeric_subdirs_desc(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let entries = fs::read_dir(dir).map_err(|e| ScanError::io(dir, e))?;
    let mut dirs: Vec<(u32, PathBuf)> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| {
            let name = entry.file_name();
            let number = name.to_str()?.parse::<u32>().ok()?;
            Some((number, entry.path()))
        })
        .collect();
    dirs.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(dirs.into_iter().map(|(_, path)| path).collect())
}

/// Timestamp and uuid embedded in a rollout file name
pub(super) fn parse_rollout_name(file_name: &str) -> Option<(NaiveDateTime, &str)> {
    let stem = file_name.strip_suffix(".jsonl").unwrap_or(file_name);
    let rest = stem.strip_prefix(ROLLOUT_PREFIX)?;
    if rest.len() < ROLLOUT_TIMESTAMP_LEN || !rest.is_char_boundary(ROLLOUT_TIMESTAMP_LEN) {
        return None;
    }
    let (ts, tail) = rest.split_at(ROLLOUT_TIMESTAMP_LEN);
    let ts = NaiveDateTime::parse_from_str(ts, ROLLOUT_TIMESTAMP_FORMAT).ok()?;
    let uuid = tail.strip_prefix('-').unwrap_or(tail);
    Some((ts, uuid))
}

/// Rollout files of one day directory, newest embedded timestamp first.
/// Files without a parseable timestamp come last.
fn rollout_files_desc(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let entries = fs::read_dir(dir).map_err(|e| ScanError::io(dir, e))?;
    let mut files: Vec<(Option<NaiveDateTime>, String, PathBuf)> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if !name.ends_with(".jsonl") {
                return None;
            }
            let ts = parse_rollout_name(&name).map(|(ts, _)| ts);
            Some((ts, name, entry.path()))
        })
        .collect();
    files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    Ok(files.into_iter().map(|(_, _, path)| path).collect())
}

fn subdirs_or_empty(dir: &Path) -> Vec<PathBuf> {
    numeric_subdirs_desc(dir).unwrap_or_else(|err| {
        warn!(error = %err, "skipping unreadable codex directory");
        Vec::new()
    })
}

// ============================================================================
// Scan
// ============================================================================

/// Walk the dated rollout tree under `root`, newest first.
///
/// Stops after `scan_ceiling` files were inspected or `limit` sessions were
/// produced. Unreadable files and incomplete sessions are skipped.
pub(crate) fn scan_codex_sessions(
    root: &Path,
    options: &ScanOptions,
) -> Result<Vec<SessionRecord>, ScanError> {
    let mut sessions = Vec::new();
    let mut inspected = 0usize;

    'walk: for year in numeric_subdirs_desc(root)? {
        for month in subdirs_or_empty(&year) {
            for day in subdirs_or_empty(&month) {
                let files = rollout_files_desc(&day).unwrap_or_else(|err| {
                    warn!(error = %err, "skipping unreadable codex day directory");
                    Vec::new()
                });
                for file in files {
                    if inspected >= options.scan_ceiling || options.limit_reached(sessions.len()) {
                        break 'walk;
                    }
                    inspected += 1;
                    match scan_rollout_file(&file, options.head_records) {
                        Ok(Some(session)) => sessions.push(session),
                        Ok(None) => {
                            debug!(file = %file.display(), "dropping incomplete codex session");
                        }
                        Err(err) => warn!(error = %err, "failed to scan codex rollout"),
                    }
                }
            }
        }
    }

    debug!(
        files = inspected,
        sessions = sessions.len(),
        "scanned codex rollouts"
    );
    Ok(sessions)
}

/// Fold state for one rollout file
#[derive(Debug, Default)]
struct RolloutState {
    meta: Option<SessionMeta>,
    meta_line_timestamp: Option<DateTime<Utc>>,
    first_user_message: Option<String>,
    message_count: usize,
    current_model: Option<String>,
    previous_totals: Option<TokenUsage>,
    usage: UsageAccumulator,
    head: Vec<Value>,
}

impl RolloutState {
    fn apply(&mut self, record: CodexRecord, line_ts: Option<DateTime<Utc>>) {
        match record {
            CodexRecord::SessionMeta(meta) => {
                if self.meta.is_none() {
                    self.meta = Some(meta);
                    self.meta_line_timestamp = line_ts;
                }
            }
            CodexRecord::UserMessage(message) => {
                self.message_count += 1;
                if self.first_user_message.is_none() {
                    self.first_user_message = preview_text(&message);
                }
            }
            CodexRecord::AgentMessage => self.message_count += 1,
            CodexRecord::TurnContext { model } => {
                if model.is_some() {
                    self.current_model = model;
                }
            }
            CodexRecord::TokenCount(count) => self.apply_token_count(count),
            CodexRecord::Unrecognized => {}
        }
    }

    fn apply_token_count(&mut self, count: TokenCount) {
        let TokenCount { last, total, model } = count;
        let delta = match (last, total) {
            (Some(last), total) => {
                if total.is_some() {
                    self.previous_totals = total;
                }
                last
            }
            (None, Some(total)) => {
                let delta = match &self.previous_totals {
                    Some(prev) => total.saturating_delta(prev),
                    None => total,
                };
                self.previous_totals = Some(total);
                delta
            }
            (None, None) => return,
        };

        if delta.is_zero() {
            return;
        }

        let model = model
            .or_else(|| self.current_model.clone())
            .unwrap_or_else(|| FALLBACK_MODEL.to_string());
        self.usage.add(&model, &delta);
    }

    fn finish(self, path: &Path) -> Option<SessionRecord> {
        let meta = self.meta?;
        let id = meta.id.filter(|id| !id.trim().is_empty())?;
        let timestamp = meta
            .timestamp
            .as_deref()
            .and_then(|ts| ts.parse::<DateTime<Utc>>().ok())
            .or(self.meta_line_timestamp)?;
        let first_message = self.first_user_message?;

        let mut session = SessionRecord::new(
            SourceKind::Codex,
            id.clone(),
            path.to_path_buf(),
            id,
            timestamp,
        )
        .with_first_message(first_message);
        session.cwd = meta.cwd;
        session.message_count = self.message_count;
        session.head_records = self.head;
        self.usage.apply_to(&mut session);
        Some(session)
    }
}

/// Stream one rollout file line by line into a draft session
pub(super) fn scan_rollout_file(
    path: &Path,
    head_records: usize,
) -> Result<Option<SessionRecord>, ScanError> {
    let file = File::open(path).map_err(|e| ScanError::io(path, e))?;
    let reader = BufReader::new(file);
    let mut state = RolloutState::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                debug!(file = %path.display(), line = line_no + 1, error = %err, "unreadable line");
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let value: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(err) => {
                debug!(file = %path.display(), line = line_no + 1, error = %err, "invalid JSON");
                continue;
            }
        };

        let record = classify(&value);
        let line_ts = line_timestamp(&value);
        if state.head.len() < head_records {
            state.head.push(value);
        }
        state.apply(record, line_ts);
    }

    Ok(state.finish(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const META: &str = r#"{"timestamp":"2025-09-01T10:00:00Z","type":"session_meta","payload":{"id":"sess-1","timestamp":"2025-09-01T10:00:00Z","cwd":"/work","originator":"codex_cli_rs"}}"#;
    const USER: &str = r#"{"timestamp":"2025-09-01T10:00:01Z","type":"event_msg","payload":{"type":"user_message","message":"  refactor   the\nparser "}}"#;

    fn write_rollout(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn total_event(input: u64, cached: u64, output: u64) -> String {
        format!(
            r#"{{"type":"event_msg","payload":{{"type":"token_count","info":{{"total_token_usage":{{"input_tokens":{input},"cached_input_tokens":{cached},"output_tokens":{output}}}}}}}}}"#
        )
    }

    #[test]
    fn parse_rollout_name_extracts_timestamp_and_uuid() {
        let (ts, uuid) =
            parse_rollout_name("rollout-2025-09-01T10-30-00-0199a3b4-1111-2222-3333-444455556666.jsonl")
                .unwrap();
        assert_eq!(ts.to_string(), "2025-09-01 10:30:00");
        assert_eq!(uuid, "0199a3b4-1111-2222-3333-444455556666");
        assert!(parse_rollout_name("notes.jsonl").is_none());
        assert!(parse_rollout_name("rollout-garbage.jsonl").is_none());
    }

    #[test]
    fn scan_file_builds_session_from_meta_and_first_user_message() {
        let tmp = TempDir::new().unwrap();
        let path = write_rollout(
            tmp.path(),
            "rollout.jsonl",
            &[
                META,
                r#"{"type":"turn_context","payload":{"model":"gpt-5-codex"}}"#,
                USER,
                r#"{"type":"event_msg","payload":{"type":"agent_message","message":"ok"}}"#,
                r#"{"type":"event_msg","payload":{"type":"user_message","message":"second"}}"#,
            ],
        );
        let session = scan_rollout_file(&path, 10).unwrap().unwrap();
        assert_eq!(session.id, "sess-1");
        assert_eq!(session.resume_target, "sess-1");
        assert_eq!(session.source, SourceKind::Codex);
        assert_eq!(session.preview, "refactor the parser");
        assert_eq!(session.fork_signature.as_deref(), Some("refactor the parser"));
        assert_eq!(session.cwd.as_deref(), Some("/work"));
        assert_eq!(session.message_count, 3);
        assert_eq!(session.head_records.len(), 5);
    }

    #[test]
    fn head_records_are_capped() {
        let tmp = TempDir::new().unwrap();
        let path = write_rollout(tmp.path(), "r.jsonl", &[META, USER, USER, USER]);
        let session = scan_rollout_file(&path, 2).unwrap().unwrap();
        assert_eq!(session.head_records.len(), 2);
    }

    #[test]
    fn session_without_meta_or_user_message_is_dropped() {
        let tmp = TempDir::new().unwrap();
        let no_meta = write_rollout(tmp.path(), "a.jsonl", &[USER]);
        assert!(scan_rollout_file(&no_meta, 10).unwrap().is_none());

        let no_user = write_rollout(tmp.path(), "b.jsonl", &[META]);
        assert!(scan_rollout_file(&no_user, 10).unwrap().is_none());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let path = write_rollout(tmp.path(), "r.jsonl", &[META, "{not json", "", USER]);
        let session = scan_rollout_file(&path, 10).unwrap().unwrap();
        assert_eq!(session.preview, "refactor the parser");
        assert_eq!(session.head_records.len(), 2);
    }

    #[test]
    fn cumulative_totals_become_deltas() {
        let tmp = TempDir::new().unwrap();
        let first = total_event(100, 20, 10);
        let second = total_event(250, 50, 30);
        let path = write_rollout(tmp.path(), "r.jsonl", &[META, USER, &first, &second]);
        let session = scan_rollout_file(&path, 10).unwrap().unwrap();
        assert_eq!(session.usage.input_tokens, 250);
        assert_eq!(session.usage.cached_input_tokens, 50);
        assert_eq!(session.usage.output_tokens, 30);
        assert_eq!(session.blended_tokens, 200 + 30);
    }

    #[test]
    fn regressing_totals_clamp_to_zero_and_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let first = total_event(100, 0, 10);
        let lower = total_event(50, 0, 5);
        let path = write_rollout(tmp.path(), "r.jsonl", &[META, USER, &first, &lower]);
        let session = scan_rollout_file(&path, 10).unwrap().unwrap();
        assert_eq!(session.usage.input_tokens, 100);
        assert_eq!(session.usage.output_tokens, 10);
    }

    #[test]
    fn last_usage_takes_precedence_over_totals() {
        let tmp = TempDir::new().unwrap();
        let event = r#"{"type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":900,"output_tokens":90},"last_token_usage":{"input_tokens":100,"output_tokens":10}}}}"#;
        let followup = total_event(1000, 0, 100);
        let path = write_rollout(tmp.path(), "r.jsonl", &[META, USER, event, &followup]);
        let session = scan_rollout_file(&path, 10).unwrap().unwrap();
        // 100 from the incremental snapshot, then 1000 - 900 from the totals
        assert_eq!(session.usage.input_tokens, 200);
        assert_eq!(session.usage.output_tokens, 20);
    }

    #[test]
    fn model_attribution_prefers_event_then_turn_context_then_fallback() {
        let tmp = TempDir::new().unwrap();
        let unnamed = r#"{"type":"event_msg","payload":{"type":"token_count","info":{"last_token_usage":{"input_tokens":10,"output_tokens":1}}}}"#;
        let named = r#"{"type":"event_msg","payload":{"type":"token_count","info":{"last_token_usage":{"input_tokens":50,"output_tokens":1},"model":"o3"}}}"#;
        let ctx = r#"{"type":"turn_context","payload":{"model":"gpt-5-codex"}}"#;
        let path = write_rollout(
            tmp.path(),
            "r.jsonl",
            &[META, USER, unnamed, ctx, unnamed, named],
        );
        let session = scan_rollout_file(&path, 10).unwrap().unwrap();
        assert_eq!(session.models[FALLBACK_MODEL].input_tokens, 10);
        assert_eq!(session.models["gpt-5-codex"].input_tokens, 10);
        assert_eq!(session.models["o3"].input_tokens, 50);
        assert_eq!(session.primary_model.as_deref(), Some("o3"));
    }

    #[test]
    fn zero_delta_events_contribute_nothing() {
        let tmp = TempDir::new().unwrap();
        let zero = r#"{"type":"event_msg","payload":{"type":"token_count","info":{"last_token_usage":{"input_tokens":0,"output_tokens":0}}}}"#;
        let path = write_rollout(tmp.path(), "r.jsonl", &[META, USER, zero]);
        let session = scan_rollout_file(&path, 10).unwrap().unwrap();
        assert!(session.models.is_empty());
        assert!(session.usage.is_zero());
        assert_eq!(session.primary_model, None);
    }

    #[test]
    fn huge_token_counts_saturate() {
        let tmp = TempDir::new().unwrap();
        let huge = r#"{"type":"event_msg","payload":{"type":"token_count","info":{"last_token_usage":{"input_tokens":10,"output_tokens":1e30}}}}"#;
        let path = write_rollout(tmp.path(), "r.jsonl", &[META, USER, huge, huge]);
        let session = scan_rollout_file(&path, 10).unwrap().unwrap();
        assert_eq!(session.usage.output_tokens, u64::MAX);
        assert_eq!(session.usage.input_tokens, 20);
        assert_eq!(session.blended_tokens, u64::MAX);
    }

    fn dated_rollout(root: &Path, date: (&str, &str, &str), time: &str, id: &str) {
        let dir = root.join(date.0).join(date.1).join(date.2);
        let name = format!("rollout-{}-{}-{}T{time}-{id}.jsonl", date.0, date.1, date.2);
        let meta = META.replace("sess-1", id);
        write_rollout(&dir, &name, &[&meta, USER]);
    }

    #[test]
    fn walk_is_newest_first_across_dated_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        dated_rollout(root, ("2024", "12", "31"), "23-00-00", "old");
        dated_rollout(root, ("2025", "01", "02"), "08-00-00", "morning");
        dated_rollout(root, ("2025", "01", "02"), "20-00-00", "evening");
        dated_rollout(root, ("2025", "01", "10"), "09-00-00", "newest");
        fs::create_dir_all(root.join("notes")).unwrap();

        let sessions = scan_codex_sessions(root, &ScanOptions::default()).unwrap();
        let ids: Vec<_> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["newest", "evening", "morning", "old"]);
    }

    #[test]
    fn scan_ceiling_and_limit_stop_the_walk() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        dated_rollout(root, ("2025", "01", "01"), "01-00-00", "a");
        dated_rollout(root, ("2025", "01", "01"), "02-00-00", "b");
        dated_rollout(root, ("2025", "01", "01"), "03-00-00", "c");

        let ceiling = ScanOptions {
            scan_ceiling: 2,
            ..Default::default()
        };
        let ids: Vec<_> = scan_codex_sessions(root, &ceiling)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["c", "b"]);

        let limited = ScanOptions {
            limit: Some(1),
            ..Default::default()
        };
        assert_eq!(scan_codex_sessions(root, &limited).unwrap().len(), 1);
    }

    #[test]
    fn missing_root_is_an_error_for_the_caller() {
        let tmp = TempDir::new().unwrap();
        assert!(scan_codex_sessions(&tmp.path().join("absent"), &ScanOptions::default()).is_err());
    }
}
