//! Claude Code data source configuration
//!
//! Defines the ClaudeSource implementation of the Source trait.

use std::env;
use std::path::PathBuf;

use crate::core::{SessionRecord, SourceKind};
use crate::error::ScanError;
use crate::source::{ScanOptions, Source};

use super::scanner::scan_claude_sessions;

const CLAUDE_CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

/// Claude data source
#[derive(Debug, Default)]
pub(crate) struct ClaudeSource {
    /// Config directories from the config file, used when the env var is unset
    dir_overrides: Vec<PathBuf>,
}

impl ClaudeSource {
    pub(crate) fn new(dir_overrides: Vec<PathBuf>) -> Self {
        Self { dir_overrides }
    }

    fn candidate_roots(&self) -> Vec<PathBuf> {
        let env_dirs = env::var(CLAUDE_CONFIG_DIR_ENV).ok();
        candidate_roots_from(env_dirs.as_deref(), &self.dir_overrides, dirs::home_dir())
    }
}

/// Project roots in priority order: every entry of the comma separated env
/// var, else the configured directories, else the two default locations
fn candidate_roots_from(
    env_dirs: Option<&str>,
    overrides: &[PathBuf],
    home: Option<PathBuf>,
) -> Vec<PathBuf> {
    let from_env: Vec<PathBuf> = env_dirs
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .collect();

    let config_dirs = if !from_env.is_empty() {
        from_env
    } else if !overrides.is_empty() {
        overrides.to_vec()
    } else {
        let Some(home) = home else {
            return Vec::new();
        };
        vec![home.join(".config").join("claude"), home.join(".claude")]
    };

    let mut roots: Vec<PathBuf> = Vec::with_capacity(config_dirs.len());
    for dir in config_dirs {
        let root = dir.join("projects");
        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    roots
}

impl Source for ClaudeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Claude
    }

    fn display_name(&self) -> &'static str {
        "Claude Code"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["cc"]
    }

    fn roots(&self) -> Vec<PathBuf> {
        self.candidate_roots()
            .into_iter()
            .filter(|root| root.is_dir())
            .collect()
    }

    fn scan(&self, options: &ScanOptions) -> Result<Vec<SessionRecord>, ScanError> {
        scan_claude_sessions(&self.roots(), options)
    }
}
