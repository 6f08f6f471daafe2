//! Fork detection
//!
//! A resumed conversation replays its opening message, so sessions that share
//! the same first user message are treated as branches of one conversation.

use std::collections::HashMap;

use crate::core::{BranchMarker, SessionRecord};

/// Mark fork groups in place.
///
/// Sessions are bucketed by exact fork signature. In a bucket with more than
/// one member the chronologically earliest session becomes the base; every
/// other member is a fork. Among forks, the most recent gets the branch-start
/// glyph and the rest get the continuation glyph. Ties keep input order.
pub(crate) fn detect_forks(sessions: &mut [SessionRecord]) {
    let groups: Vec<Vec<usize>> = {
        let mut buckets: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut bucket_order: Vec<&str> = Vec::new();
        for (idx, session) in sessions.iter().enumerate() {
            let Some(signature) = session.fork_signature.as_deref() else {
                continue;
            };
            buckets
                .entry(signature)
                .or_insert_with(|| {
                    bucket_order.push(signature);
                    Vec::new()
                })
                .push(idx);
        }
        bucket_order
            .into_iter()
            .filter_map(|signature| buckets.remove(signature))
            .collect()
    };

    for mut members in groups {
        if members.len() == 1 {
            let session = &mut sessions[members[0]];
            session.is_fork = false;
            session.branch = BranchMarker::None;
            continue;
        }

        members.sort_by_key(|&idx| sessions[idx].timestamp);
        let base = members[0];
        sessions[base].is_fork = false;
        sessions[base].branch = BranchMarker::Base;

        let mut forks = members[1..].to_vec();
        // Stable descending sort: equal timestamps keep their ascending order
        forks.sort_by(|&a, &b| sessions[b].timestamp.cmp(&sessions[a].timestamp));
        for (rank, idx) in forks.into_iter().enumerate() {
            let session = &mut sessions[idx];
            session.is_fork = true;
            session.branch = if rank == 0 {
                BranchMarker::BranchFirst
            } else {
                BranchMarker::BranchMid
            };
        }
    }
}
