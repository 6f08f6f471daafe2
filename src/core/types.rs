//! Core data types shared across all data sources
//!
//! Every scanner converts its native log format into these records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Which assistant produced a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SourceKind {
    Codex,
    Claude,
}

impl SourceKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            SourceKind::Codex => "codex",
            SourceKind::Claude => "claude",
        }
    }
}

/// Position of a session inside a fork group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum BranchMarker {
    #[default]
    None,
    /// Earliest member of the group, drawn at the bottom of the block
    Base,
    /// Most recent fork
    BranchFirst,
    BranchMid,
}

impl BranchMarker {
    pub(crate) fn glyph(self) -> &'static str {
        match self {
            BranchMarker::None => "",
            BranchMarker::Base => "└─",
            BranchMarker::BranchFirst => "┌─",
            BranchMarker::BranchMid => "├─",
        }
    }

    pub(crate) fn is_grouped(self) -> bool {
        self != BranchMarker::None
    }
}

/// Canonical token usage
///
/// `input_tokens` already contains both cache reads and cache writes;
/// `cached_input_tokens` and `cache_write_tokens` are the shares of it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct TokenUsage {
    pub(crate) input_tokens: u64,
    pub(crate) cached_input_tokens: u64,
    pub(crate) output_tokens: u64,
    pub(crate) reasoning_output_tokens: u64,
    pub(crate) total_tokens: u64,
    pub(crate) cache_write_tokens: u64,
}

impl TokenUsage {
    pub(crate) fn add(&mut self, other: &TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.cached_input_tokens = self
            .cached_input_tokens
            .saturating_add(other.cached_input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.reasoning_output_tokens = self
            .reasoning_output_tokens
            .saturating_add(other.reasoning_output_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
        self.cache_write_tokens = self.cache_write_tokens.saturating_add(other.cache_write_tokens);
    }

    /// Per-field `max(0, self - prev)`, used to turn cumulative snapshots into deltas
    pub(crate) fn saturating_delta(&self, prev: &TokenUsage) -> TokenUsage {
        TokenUsage {
            input_tokens: self.input_tokens.saturating_sub(prev.input_tokens),
            cached_input_tokens: self
                .cached_input_tokens
                .saturating_sub(prev.cached_input_tokens),
            output_tokens: self.output_tokens.saturating_sub(prev.output_tokens),
            reasoning_output_tokens: self
                .reasoning_output_tokens
                .saturating_sub(prev.reasoning_output_tokens),
            total_tokens: self.total_tokens.saturating_sub(prev.total_tokens),
            cache_write_tokens: self
                .cache_write_tokens
                .saturating_sub(prev.cache_write_tokens),
        }
    }

    /// Non-cached input + output + reasoning. Never negative, even when a
    /// malformed record reports more cached than total input, and clamped at
    /// `u64::MAX`.
    pub(crate) fn blended_tokens(&self) -> u64 {
        self.input_tokens
            .saturating_sub(self.cached_input_tokens)
            .saturating_add(self.output_tokens)
            .saturating_add(self.reasoning_output_tokens)
    }

    /// True when input, cached input, output and reasoning are all zero
    pub(crate) fn is_zero(&self) -> bool {
        self.input_tokens == 0
            && self.cached_input_tokens == 0
            && self.output_tokens == 0
            && self.reasoning_output_tokens == 0
    }

    /// Count used to rank models against each other
    pub(crate) fn ranking_tokens(&self) -> u64 {
        if self.total_tokens > 0 {
            self.total_tokens
        } else {
            self.input_tokens.saturating_add(self.output_tokens)
        }
    }
}

/// One reconstructed conversation
#[derive(Debug, Clone)]
pub(crate) struct SessionRecord {
    pub(crate) id: String,
    pub(crate) source: SourceKind,
    pub(crate) path: PathBuf,
    /// Identifier handed back to the originating CLI to resume
    pub(crate) resume_target: String,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) preview: String,
    pub(crate) cwd: Option<String>,
    pub(crate) summary: Option<String>,
    pub(crate) usage: TokenUsage,
    pub(crate) blended_tokens: u64,
    pub(crate) models: HashMap<String, TokenUsage>,
    pub(crate) primary_model: Option<String>,
    pub(crate) is_fork: bool,
    pub(crate) fork_signature: Option<String>,
    pub(crate) branch: BranchMarker,
    pub(crate) cost_usd: f64,
    pub(crate) message_count: usize,
    /// First parsed records of the file, kept for transcript consumers
    pub(crate) head_records: Vec<serde_json::Value>,
}

impl SessionRecord {
    pub(crate) fn new(
        source: SourceKind,
        id: String,
        path: PathBuf,
        resume_target: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        SessionRecord {
            id,
            source,
            path,
            resume_target,
            timestamp,
            preview: String::new(),
            cwd: None,
            summary: None,
            usage: TokenUsage::default(),
            blended_tokens: 0,
            models: HashMap::new(),
            primary_model: None,
            is_fork: false,
            fork_signature: None,
            branch: BranchMarker::None,
            cost_usd: 0.0,
            message_count: 0,
            head_records: Vec::new(),
        }
    }

    /// Set preview and fork signature from an already normalized first message
    pub(crate) fn with_first_message(mut self, first_message: String) -> Self {
        self.fork_signature = Some(first_message.clone());
        self.preview = first_message;
        self
    }
}

/// Result of one inventory pass
#[derive(Debug, Default)]
pub(crate) struct SessionInventory {
    pub(crate) sessions: Vec<SessionRecord>,
    pub(crate) total_blended_tokens: u64,
    pub(crate) total_cost_usd: f64,
}
