//! Data source registry
//!
//! Builds the available data sources and resolves a selector by name/alias.

use std::path::PathBuf;

use super::claude::ClaudeSource;
use super::codex::CodexSource;
use super::BoxedSource;
use crate::error::AppError;

/// Selector matching every registered source
pub(crate) const ALL_SOURCES: &str = "all";

/// Directory overrides coming from the config file
#[derive(Debug, Clone, Default)]
pub(crate) struct SourcePaths {
    pub(crate) codex_home: Option<PathBuf>,
    pub(crate) claude_dirs: Vec<PathBuf>,
}

/// All registered data sources, Codex first
fn all_sources(paths: &SourcePaths) -> Vec<BoxedSource> {
    vec![
        Box::new(CodexSource::new(paths.codex_home.clone())),
        Box::new(ClaudeSource::new(paths.claude_dirs.clone())),
    ]
}

/// Resolve `all` or a source name/alias into the sources to scan
pub(crate) fn resolve_sources(
    selector: &str,
    paths: &SourcePaths,
) -> Result<Vec<BoxedSource>, AppError> {
    let selector = selector.trim().to_lowercase();
    let sources = all_sources(paths);
    if selector == ALL_SOURCES {
        return Ok(sources);
    }

    let matched: Vec<BoxedSource> = sources
        .into_iter()
        .filter(|s| s.name() == selector || s.aliases().contains(&selector.as_str()))
        .collect();
    if matched.is_empty() {
        return Err(AppError::UnknownSource { input: selector });
    }
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(selector: &str) -> Vec<&'static str> {
        resolve_sources(selector, &SourcePaths::default())
            .unwrap()
            .iter()
            .map(|s| s.name())
            .collect()
    }

    #[test]
    fn all_is_codex_then_claude() {
        assert_eq!(names("all"), vec!["codex", "claude"]);
    }

    #[test]
    fn resolve_by_name_and_alias() {
        assert_eq!(names("claude"), vec!["claude"]);
        assert_eq!(names("CC"), vec!["claude"]);
        assert_eq!(names("cx"), vec!["codex"]);
    }

    #[test]
    fn unknown_selector_is_an_error() {
        let err = resolve_sources("cursor", &SourcePaths::default())
            .err()
            .unwrap();
        assert!(matches!(err, AppError::UnknownSource { input } if input == "cursor"));
    }
}
