//! Claude Code data source
//!
//! Reads JSONL logs from `<config dir>/projects/<project>/*.jsonl` and
//! rebuilds conversations from their parent links.

mod config;
mod graph;
mod parser;
mod scanner;

pub(crate) use config::ClaudeSource;
