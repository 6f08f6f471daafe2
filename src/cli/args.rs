//! CLI argument definitions
//!
//! Global CLI options and configuration merging logic.

use std::io::IsTerminal;

use clap::{Parser, ValueEnum};

use crate::config::{Config, ConfigColorMode};
use crate::source::{DEFAULT_HEAD_RECORDS, DEFAULT_SCAN_CEILING, ScanOptions, SourcePaths};

use super::commands::Commands;

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq)]
pub(crate) enum ColorMode {
    /// Auto-detect based on terminal (default)
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Parser)]
#[command(name = "ccresume")]
#[command(
    about = "Inventory of past Claude Code and Codex sessions, fork-aware and priced",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Which assistant to scan: all, claude (cc) or codex (cx)
    #[arg(short, long, global = true, value_name = "SOURCE")]
    pub(crate) source: Option<String>,

    /// Stop each source after this many sessions
    #[arg(short = 'n', long, global = true, value_name = "N")]
    pub(crate) limit: Option<usize>,

    /// Maximum number of transcript files inspected per source
    #[arg(long, global = true, value_name = "N")]
    pub(crate) scan_ceiling: Option<usize>,

    /// Output as JSON
    #[arg(short, long, global = true)]
    pub(crate) json: bool,

    /// Use offline cached pricing (skip fetching from LiteLLM)
    #[arg(short = 'O', long, global = true)]
    pub(crate) offline: bool,

    /// Skip pricing entirely
    #[arg(long, global = true)]
    pub(crate) no_cost: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub(crate) color: ColorMode,

    /// Disable colored output (shorthand for --color=never)
    #[arg(long, global = true)]
    pub(crate) no_color: bool,

    /// Compact table (fewer columns)
    #[arg(short = 'c', long, global = true)]
    pub(crate) compact: bool,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    pub(crate) debug: bool,

    /// Locale for number formatting (e.g., "en", "de", "fr")
    #[arg(long, global = true, value_name = "LOCALE")]
    pub(crate) locale: Option<String>,

    /// Records kept per Codex session, from the config file only
    #[arg(skip)]
    pub(crate) head_records: Option<usize>,

    /// Directory overrides, from the config file only
    #[arg(skip)]
    pub(crate) paths: SourcePaths,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        // For boolean flags, config only applies if CLI is false (default)
        if !self.offline && config.offline {
            self.offline = true;
        }
        if !self.no_cost && config.no_cost {
            self.no_cost = true;
        }
        if !self.no_color && config.no_color {
            self.no_color = true;
        }
        if !self.compact && config.compact {
            self.compact = true;
        }

        if let Some(color) = config.color
            && self.color == ColorMode::Auto
        {
            self.color = match color {
                ConfigColorMode::Auto => ColorMode::Auto,
                ConfigColorMode::Always => ColorMode::Always,
                ConfigColorMode::Never => ColorMode::Never,
            };
        }

        if self.source.is_none() {
            self.source = config.source.clone();
        }
        if self.limit.is_none() {
            self.limit = config.limit;
        }
        if self.scan_ceiling.is_none() {
            self.scan_ceiling = config.scan_ceiling;
        }
        if self.locale.is_none() {
            self.locale = config.locale.clone();
        }
        self.head_records = config.head_records;
        self.paths = SourcePaths {
            codex_home: config.codex_home.clone(),
            claude_dirs: config.claude_dirs.clone(),
        };

        self
    }

    pub(crate) fn use_color(&self) -> bool {
        if self.no_color {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        }
    }

    pub(crate) fn show_cost(&self) -> bool {
        !self.no_cost
    }

    pub(crate) fn source_selector(&self) -> &str {
        self.source.as_deref().unwrap_or(crate::source::ALL_SOURCES)
    }

    pub(crate) fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            scan_ceiling: self.scan_ceiling.unwrap_or(DEFAULT_SCAN_CEILING),
            head_records: self.head_records.unwrap_or(DEFAULT_HEAD_RECORDS),
            limit: self.limit,
        }
    }
}
