//! Parent-pointer forest of Claude Code messages
//!
//! Nodes live in an arena indexed by uuid. Parent ids are lookup keys only;
//! the child index is derived so leaf detection is a single map probe.

use std::collections::{HashMap, HashSet};

use super::parser::MessageNode;

#[derive(Debug, Default)]
pub(super) struct MessageGraph {
    nodes: Vec<MessageNode>,
    by_uuid: HashMap<String, usize>,
    /// parent uuid -> uuids naming it as parent
    children: HashMap<String, HashSet<String>>,
    /// leaf uuid -> summary text
    summaries: HashMap<String, String>,
}

impl MessageGraph {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Add a node. The first occurrence of a uuid wins.
    pub(super) fn insert(&mut self, node: MessageNode) {
        if self.by_uuid.contains_key(&node.uuid) {
            return;
        }
        if let Some(parent) = &node.parent_uuid {
            self.children
                .entry(parent.clone())
                .or_default()
                .insert(node.uuid.clone());
        }
        self.by_uuid.insert(node.uuid.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    pub(super) fn add_summary(&mut self, leaf_uuid: String, summary: String) {
        self.summaries.entry(leaf_uuid).or_insert(summary);
    }

    pub(super) fn summary_for(&self, leaf_uuid: &str) -> Option<&str> {
        self.summaries.get(leaf_uuid).map(String::as_str)
    }

    pub(super) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(super) fn node(&self, index: usize) -> &MessageNode {
        &self.nodes[index]
    }

    /// Nodes nobody names as parent, in first-seen order
    pub(super) fn leaves(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !self.children.contains_key(&node.uuid))
            .map(|(index, _)| index)
    }

    /// Walk from `leaf` to its root and return the chain root first.
    ///
    /// Stops at a missing parent or at the first uuid visited twice.
    pub(super) fn transcript(&self, leaf: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(leaf);

        while let Some(index) = current {
            let node = &self.nodes[index];
            if !seen.insert(node.uuid.as_str()) {
                tracing::debug!(uuid = %node.uuid, "parent chain cycles, truncating");
                break;
            }
            chain.push(index);
            current = node
                .parent_uuid
                .as_deref()
                .and_then(|parent| self.by_uuid.get(parent).copied());
        }

        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::claude::parser::{ClaudeLine, parse_line};

    fn node(uuid: &str, parent: Option<&str>) -> MessageNode {
        let parent = parent.map_or("null".to_string(), |p| format!("\"{p}\""));
        let line = format!(r#"{{"type":"user","uuid":"{uuid}","parentUuid":{parent}}}"#);
        match parse_line(&line, 0).unwrap() {
            ClaudeLine::Node(node) => node,
            other => panic!("expected node, got {other:?}"),
        }
    }

    fn uuids(graph: &MessageGraph, indices: &[usize]) -> Vec<String> {
        indices.iter().map(|&i| graph.node(i).uuid.clone()).collect()
    }

    #[test]
    fn leaves_are_nodes_without_children_in_insertion_order() {
        let mut graph = MessageGraph::new();
        graph.insert(node("root", None));
        graph.insert(node("a", Some("root")));
        graph.insert(node("b1", Some("a")));
        graph.insert(node("b2", Some("a")));
        let leaves: Vec<_> = graph.leaves().collect();
        assert_eq!(uuids(&graph, &leaves), vec!["b1", "b2"]);
    }

    #[test]
    fn transcript_is_root_first() {
        let mut graph = MessageGraph::new();
        graph.insert(node("root", None));
        graph.insert(node("a", Some("root")));
        graph.insert(node("b", Some("a")));
        let chain = graph.transcript(2);
        assert_eq!(uuids(&graph, &chain), vec!["root", "a", "b"]);
    }

    #[test]
    fn transcript_stops_at_missing_parent() {
        let mut graph = MessageGraph::new();
        graph.insert(node("orphan", Some("gone")));
        graph.insert(node("leaf", Some("orphan")));
        let chain = graph.transcript(1);
        assert_eq!(uuids(&graph, &chain), vec!["orphan", "leaf"]);
    }

    #[test]
    fn cyclic_chain_is_truncated() {
        let mut graph = MessageGraph::new();
        graph.insert(node("x", Some("y")));
        graph.insert(node("y", Some("x")));
        // Both nodes have children, so neither is a leaf
        assert_eq!(graph.leaves().count(), 0);
        let chain = graph.transcript(0);
        assert_eq!(uuids(&graph, &chain), vec!["y", "x"]);
    }

    #[test]
    fn first_occurrence_wins() {
        let mut graph = MessageGraph::new();
        graph.insert(node("dup", None));
        graph.insert(node("dup", Some("elsewhere")));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.node(0).parent_uuid, None);
    }

    #[test]
    fn summaries_are_keyed_by_leaf() {
        let mut graph = MessageGraph::new();
        graph.add_summary("leaf".into(), "first".into());
        graph.add_summary("leaf".into(), "second".into());
        assert_eq!(graph.summary_for("leaf"), Some("first"));
        assert_eq!(graph.summary_for("other"), None);
    }
}
