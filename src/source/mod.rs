//! Data source abstraction layer
//!
//! Each assistant (Claude Code, Codex) implements the Source trait to turn
//! its on-disk transcripts into draft session records.

pub(crate) mod claude;
pub(crate) mod codex;
pub(crate) mod loader;
pub(crate) mod registry;

use std::path::PathBuf;

use crate::core::{SessionRecord, SourceKind};
use crate::error::ScanError;

/// Hard cap on transcript files inspected per source
pub(crate) const DEFAULT_SCAN_CEILING: usize = 10_000;
/// Parsed records kept verbatim per Codex session
pub(crate) const DEFAULT_HEAD_RECORDS: usize = 10;

/// Bounds applied to a single scan
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScanOptions {
    /// Maximum number of files inspected
    pub(crate) scan_ceiling: usize,
    /// Maximum number of parsed records retained per session
    pub(crate) head_records: usize,
    /// Stop once this many sessions were produced
    pub(crate) limit: Option<usize>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            scan_ceiling: DEFAULT_SCAN_CEILING,
            head_records: DEFAULT_HEAD_RECORDS,
            limit: None,
        }
    }
}

impl ScanOptions {
    pub(crate) fn limit_reached(&self, produced: usize) -> bool {
        self.limit.is_some_and(|limit| produced >= limit)
    }
}

/// Data source trait - implemented by each assistant
pub(crate) trait Source: Send + Sync {
    /// Which assistant this source reads
    fn kind(&self) -> SourceKind;

    /// Unique name for this source (used on the command line)
    fn name(&self) -> &'static str {
        self.kind().label()
    }

    /// Display name for output
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Short aliases (e.g., "cc" for "claude")
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Existing root directories this source reads from
    fn roots(&self) -> Vec<PathBuf>;

    /// Scan every transcript under the roots into draft session records
    fn scan(&self, options: &ScanOptions) -> Result<Vec<SessionRecord>, ScanError>;
}

/// Box type for dynamic dispatch
pub(crate) type BoxedSource = Box<dyn Source>;

pub(crate) use loader::load_inventory;
pub(crate) use registry::{ALL_SOURCES, SourcePaths, resolve_sources};
