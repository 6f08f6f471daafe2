//! Recency ordering that keeps fork groups contiguous

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::core::types::SessionRecord;

/// A fork group, members newest first
#[derive(Debug)]
struct ForkBlock {
    representative: DateTime<Utc>,
    members: Vec<SessionRecord>,
}

/// Produce one newest-first sequence in which every fork group is emitted as
/// a single block positioned by its most recent member. When a group and a
/// standalone session have the same time, the group goes first.
pub(crate) fn order_sessions(sessions: Vec<SessionRecord>) -> Vec<SessionRecord> {
    let total = sessions.len();
    let mut blocks: Vec<ForkBlock> = Vec::new();
    let mut block_index: HashMap<String, usize> = HashMap::new();
    let mut singles: Vec<SessionRecord> = Vec::new();

    for session in sessions {
        let signature = match (&session.fork_signature, session.branch.is_grouped()) {
            (Some(signature), true) => signature.clone(),
            _ => {
                singles.push(session);
                continue;
            }
        };
        let idx = *block_index.entry(signature).or_insert_with(|| {
            blocks.push(ForkBlock {
                representative: session.timestamp,
                members: Vec::new(),
            });
            blocks.len() - 1
        });
        let block = &mut blocks[idx];
        if session.timestamp > block.representative {
            block.representative = session.timestamp;
        }
        block.members.push(session);
    }

    for block in &mut blocks {
        block.members.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }
    blocks.sort_by(|a, b| b.representative.cmp(&a.representative));
    singles.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut ordered = Vec::with_capacity(total);
    let mut blocks = blocks.into_iter().peekable();
    let mut singles = singles.into_iter().peekable();
    loop {
        let take_block = match (blocks.peek(), singles.peek()) {
            (Some(block), Some(single)) => block.representative >= single.timestamp,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        if take_block {
            if let Some(block) = blocks.next() {
                ordered.extend(block.members);
            }
        } else if let Some(single) = singles.next() {
            ordered.push(single);
        }
    }
    ordered
}
