//! OpenAI Codex CLI data source configuration
//!
//! Defines the CodexSource implementation of the Source trait.

use std::env;
use std::path::{Path, PathBuf};

use crate::core::{SessionRecord, SourceKind};
use crate::error::ScanError;
use crate::source::{ScanOptions, Source};

use super::scanner::scan_codex_sessions;

const CODEX_HOME_ENV: &str = "CODEX_HOME";

/// Codex data source
#[derive(Debug, Default)]
pub(crate) struct CodexSource {
    /// Codex home from the config file, used when `CODEX_HOME` is unset
    home_override: Option<PathBuf>,
}

impl CodexSource {
    pub(crate) fn new(home_override: Option<PathBuf>) -> Self {
        Self { home_override }
    }

    fn sessions_dir(&self) -> Option<PathBuf> {
        let env_home = env::var_os(CODEX_HOME_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        sessions_dir_from(env_home, self.home_override.as_deref(), dirs::home_dir())
    }
}

/// `CODEX_HOME` wins over the configured home, which wins over `~/.codex`
fn sessions_dir_from(
    env_home: Option<PathBuf>,
    configured: Option<&Path>,
    user_home: Option<PathBuf>,
) -> Option<PathBuf> {
    let home = env_home
        .or_else(|| configured.map(Path::to_path_buf))
        .or_else(|| user_home.map(|h| h.join(".codex")))?;
    Some(home.join("sessions"))
}

impl Source for CodexSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Codex
    }

    fn display_name(&self) -> &'static str {
        "OpenAI Codex"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["cx"]
    }

    fn roots(&self) -> Vec<PathBuf> {
        self.sessions_dir()
            .filter(|dir| dir.is_dir())
            .into_iter()
            .collect()
    }

    fn scan(&self, options: &ScanOptions) -> Result<Vec<SessionRecord>, ScanError> {
        let mut sessions = Vec::new();
        for root in self.roots() {
            sessions.extend(scan_codex_sessions(&root, options)?);
        }
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_home_takes_precedence() {
        let dir = sessions_dir_from(
            Some("/env/codex".into()),
            Some(Path::new("/configured")),
            Some("/home/u".into()),
        );
        assert_eq!(dir, Some(PathBuf::from("/env/codex/sessions")));
    }

    #[test]
    fn configured_home_beats_default() {
        let dir = sessions_dir_from(None, Some(Path::new("/configured")), Some("/home/u".into()));
        assert_eq!(dir, Some(PathBuf::from("/configured/sessions")));
    }

    #[test]
    fn default_home_is_dot_codex() {
        let dir = sessions_dir_from(None, None, Some("/home/u".into()));
        assert_eq!(dir, Some(PathBuf::from("/home/u/.codex/sessions")));
        assert_eq!(sessions_dir_from(None, None, None), None);
    }

    #[test]
    fn source_identity() {
        let source = CodexSource::default();
        assert_eq!(source.name(), "codex");
        assert_eq!(source.aliases(), &["cx"]);
        assert_eq!(source.kind(), SourceKind::Codex);
    }
}
