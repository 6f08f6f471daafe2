//! Claude Code transcript reconstruction
//!
//! All files of one invocation feed a single message graph. Each leaf is
//! replayed back to its root and becomes a session when it is admitted.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::{SessionRecord, SourceKind, UsageAccumulator};
use crate::error::ScanError;
use crate::source::ScanOptions;
use crate::utils::preview_text;

use super::graph::MessageGraph;
use super::parser::{ClaudeLine, MessageNode, is_user_authored, parse_line};

const SYNTHETIC_MODEL: &str = "<synthetic>";
const UNKNOWN_MODEL: &str = "unknown";

// ============================================================================
// File discovery
// ============================================================================

/// `<root>/<project>/*.jsonl`, sorted by path
pub(super) fn find_transcripts(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let pattern = format!(
        "{}/*/*.jsonl",
        glob::Pattern::escape(&root.to_string_lossy())
    );
    let paths = glob::glob(&pattern).map_err(|source| ScanError::Pattern {
        pattern: pattern.clone(),
        source,
    })?;
    let mut files: Vec<PathBuf> = paths.flatten().filter(|p| p.is_file()).collect();
    files.sort();
    Ok(files)
}

// ============================================================================
// Graph construction
// ============================================================================

fn read_into_graph(graph: &mut MessageGraph, path: &Path, file: usize) -> Result<(), ScanError> {
    let reader = BufReader::new(File::open(path).map_err(|e| ScanError::io(path, e))?);

    for (line_no, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                debug!(file = %path.display(), line = line_no + 1, error = %err, "unreadable line");
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line, file) {
            Ok(ClaudeLine::Node(node)) => graph.insert(node),
            Ok(ClaudeLine::Summary { leaf_uuid, summary }) => graph.add_summary(leaf_uuid, summary),
            Ok(ClaudeLine::Ignored) => {}
            Err(err) => {
                debug!(file = %path.display(), line = line_no + 1, error = %err, "invalid JSON");
            }
        }
    }
    Ok(())
}

// ============================================================================
// Session building
// ============================================================================

/// Dedup keys already credited to an earlier leaf
type ConsumedKeys = HashSet<String>;

/// Usage-bearing nodes of a transcript whose keys are still unclaimed
fn fresh_usage<'a>(
    graph: &'a MessageGraph,
    transcript: &[usize],
    consumed: &ConsumedKeys,
) -> Vec<(String, &'a MessageNode)> {
    let mut local = HashSet::new();
    let mut fresh = Vec::new();
    for &index in transcript {
        let node = graph.node(index);
        let Some(usage) = &node.usage else {
            continue;
        };
        if usage.model.as_deref() == Some(SYNTHETIC_MODEL) {
            continue;
        }
        let key = node.dedup_key();
        if consumed.contains(&key) || !local.insert(key.clone()) {
            continue;
        }
        fresh.push((key, node));
    }
    fresh
}

fn build_session(
    graph: &MessageGraph,
    files: &[PathBuf],
    leaf: usize,
    consumed: &mut ConsumedKeys,
) -> Option<SessionRecord> {
    let transcript = graph.transcript(leaf);
    let nodes: Vec<&MessageNode> = transcript.iter().map(|&i| graph.node(i)).collect();

    if nodes.iter().all(|node| node.is_sidechain) {
        return None;
    }

    let fresh = fresh_usage(graph, &transcript, consumed);
    if fresh.is_empty() {
        return None;
    }

    let preview = nodes
        .iter()
        .filter(|node| is_user_authored(node))
        .find_map(|node| node.text.as_deref().and_then(preview_text))?;

    let leaf_node = graph.node(leaf);
    let timestamp: DateTime<Utc> = leaf_node
        .timestamp
        .or_else(|| nodes.iter().filter_map(|node| node.timestamp).max())?;
    let path = files.get(leaf_node.file)?.clone();
    let resume_target = leaf_node.session_id.clone().or_else(|| {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
    })?;

    let mut usage = UsageAccumulator::new();
    for (key, node) in fresh {
        if let Some(node_usage) = &node.usage {
            let model = node_usage.model.as_deref().unwrap_or(UNKNOWN_MODEL);
            usage.add(model, &node_usage.usage);
        }
        consumed.insert(key);
    }

    let mut session = SessionRecord::new(
        SourceKind::Claude,
        leaf_node.uuid.clone(),
        path,
        resume_target,
        timestamp,
    )
    .with_first_message(preview);
    session.cwd = nodes.iter().find_map(|node| node.cwd.clone());
    session.summary = graph.summary_for(&leaf_node.uuid).map(str::to_string);
    session.message_count = nodes
        .iter()
        .filter(|node| node.is_conversational() && !node.is_sidechain)
        .count();
    usage.apply_to(&mut session);
    Some(session)
}

// ============================================================================
// Scan
// ============================================================================

/// Build one graph from every transcript under `roots` and turn its leaves
/// into sessions.
pub(crate) fn scan_claude_sessions(
    roots: &[PathBuf],
    options: &ScanOptions,
) -> Result<Vec<SessionRecord>, ScanError> {
    let mut files = Vec::new();
    for root in roots {
        files.extend(find_transcripts(root)?);
    }
    if files.len() > options.scan_ceiling {
        debug!(
            found = files.len(),
            ceiling = options.scan_ceiling,
            "claude transcript count exceeds scan ceiling"
        );
        files.truncate(options.scan_ceiling);
    }

    let mut graph = MessageGraph::new();
    for (index, path) in files.iter().enumerate() {
        if let Err(err) = read_into_graph(&mut graph, path, index) {
            warn!(error = %err, "failed to read claude transcript");
        }
    }

    let mut consumed = ConsumedKeys::new();
    let mut sessions = Vec::new();
    for leaf in graph.leaves() {
        if options.limit_reached(sessions.len()) {
            break;
        }
        match build_session(&graph, &files, leaf, &mut consumed) {
            Some(session) => sessions.push(session),
            None => debug!(leaf = %graph.node(leaf).uuid, "leaf not admitted"),
        }
    }

    debug!(
        files = files.len(),
        nodes = graph.len(),
        sessions = sessions.len(),
        "scanned claude transcripts"
    );
    Ok(sessions)
}
