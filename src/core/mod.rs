//! Core module - shared types and reconciliation logic for all data sources

mod fork;
mod order;
mod types;
mod usage;

pub(crate) use fork::detect_forks;
pub(crate) use order::order_sessions;
pub(crate) use types::{BranchMarker, SessionInventory, SessionRecord, SourceKind, TokenUsage};
pub(crate) use usage::{RawUsage, UsageAccumulator};
