//! OpenAI Codex CLI data source
//!
//! Reads rollout logs from `$CODEX_HOME/sessions` (default `~/.codex/sessions`).
//! Token counts may be cumulative, so they are turned into deltas while streaming.

mod config;
mod parser;
mod scanner;

pub(crate) use config::CodexSource;
