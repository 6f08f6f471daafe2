//! Unified inventory loader for all sources

use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, warn};

use crate::core::{SessionInventory, SessionRecord, detect_forks, order_sessions};
use crate::pricing::{PricingSource, annotate_costs};
use crate::source::{BoxedSource, ScanOptions, Source};

/// Scan one source. A failing source contributes nothing.
fn scan_source(source: &dyn Source, options: &ScanOptions) -> Vec<SessionRecord> {
    let start = Instant::now();
    let roots = source.roots();
    if roots.is_empty() {
        debug!(source = source.name(), "no data directory, skipping");
        return Vec::new();
    }

    match source.scan(options) {
        Ok(sessions) => {
            debug!(
                source = source.display_name(),
                sessions = sessions.len(),
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "scanned sessions"
            );
            sessions
        }
        Err(err) => {
            warn!(source = source.display_name(), error = %err, "scan failed, skipping source");
            Vec::new()
        }
    }
}

/// Scan every source, then mark forks, order and price the merged result.
///
/// Never fails: unusable sources and price lookups degrade to empty results.
pub(crate) fn load_inventory(
    sources: &[BoxedSource],
    options: &ScanOptions,
    pricing: &dyn PricingSource,
) -> SessionInventory {
    let per_source: Vec<Vec<SessionRecord>> = sources
        .par_iter()
        .map(|source| scan_source(source.as_ref(), options))
        .collect();

    let mut sessions: Vec<SessionRecord> = per_source.into_iter().flatten().collect();
    detect_forks(&mut sessions);
    let sessions = order_sessions(sessions);

    let start = Instant::now();
    let inventory = annotate_costs(sessions, pricing);
    debug!(
        sessions = inventory.sessions.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "priced sessions"
    );
    inventory
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BranchMarker, SourceKind, TokenUsage, UsageAccumulator};
    use crate::error::ScanError;
    use crate::pricing::NoPricing;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;

    struct FixedSource {
        kind: SourceKind,
        result: fn() -> Result<Vec<SessionRecord>, ScanError>,
    }

    impl Source for FixedSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        fn roots(&self) -> Vec<PathBuf> {
            vec![PathBuf::from("/fixture")]
        }

        fn scan(&self, _options: &ScanOptions) -> Result<Vec<SessionRecord>, ScanError> {
            (self.result)()
        }
    }

    fn record(source: SourceKind, id: &str, secs: i64, first: &str) -> SessionRecord {
        let mut r = SessionRecord::new(
            source,
            id.to_string(),
            PathBuf::from(id),
            id.to_string(),
            Utc.timestamp_opt(secs, 0).unwrap(),
        )
        .with_first_message(first.to_string());
        let mut acc = UsageAccumulator::new();
        acc.add(
            "gpt-5",
            &TokenUsage {
                input_tokens: 10,
                output_tokens: 1,
                ..Default::default()
            },
        );
        acc.apply_to(&mut r);
        r
    }

    fn codex_sessions() -> Result<Vec<SessionRecord>, ScanError> {
        Ok(vec![
            record(SourceKind::Codex, "s1", 100, "one"),
            record(SourceKind::Codex, "b", 70, "shared"),
        ])
    }

    fn claude_sessions() -> Result<Vec<SessionRecord>, ScanError> {
        Ok(vec![
            record(SourceKind::Claude, "a", 90, "shared"),
            record(SourceKind::Claude, "s2", 50, "two"),
        ])
    }

    fn failing() -> Result<Vec<SessionRecord>, ScanError> {
        Err(ScanError::io(
            "/fixture",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        ))
    }

    fn boxed(kind: SourceKind, result: fn() -> Result<Vec<SessionRecord>, ScanError>) -> BoxedSource {
        Box::new(FixedSource { kind, result })
    }

    #[test]
    fn merged_sources_are_fork_marked_and_ordered() {
        let sources = vec![
            boxed(SourceKind::Codex, codex_sessions),
            boxed(SourceKind::Claude, claude_sessions),
        ];
        let inventory = load_inventory(&sources, &ScanOptions::default(), &NoPricing);
        let ids: Vec<_> = inventory.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "a", "b", "s2"]);

        let a = &inventory.sessions[1];
        assert_eq!(a.branch, BranchMarker::BranchFirst);
        assert!(a.is_fork);
        let b = &inventory.sessions[2];
        assert_eq!(b.branch, BranchMarker::Base);
        assert!(!b.is_fork);
        assert_eq!(inventory.total_blended_tokens, 4 * 11);
    }

    #[test]
    fn failing_source_is_isolated() {
        let sources = vec![
            boxed(SourceKind::Codex, failing),
            boxed(SourceKind::Claude, claude_sessions),
        ];
        let inventory = load_inventory(&sources, &ScanOptions::default(), &NoPricing);
        assert_eq!(inventory.sessions.len(), 2);
        assert!(inventory.sessions.iter().all(|s| s.source == SourceKind::Claude));
    }

    #[test]
    fn rescanning_is_deterministic() {
        let sources = vec![
            boxed(SourceKind::Codex, codex_sessions),
            boxed(SourceKind::Claude, claude_sessions),
        ];
        let first = load_inventory(&sources, &ScanOptions::default(), &NoPricing);
        let second = load_inventory(&sources, &ScanOptions::default(), &NoPricing);
        let ids = |inv: &SessionInventory| -> Vec<String> {
            inv.sessions.iter().map(|s| s.id.clone()).collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }
}
