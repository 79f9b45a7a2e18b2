//! Report events and the node tree rebuilt from them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{NodeId, NodeKind, Status};

/// One line of a step report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ReportEvent {
    Start {
        id: NodeId,
        name: String,
        kind: NodeKind,
        has_stats: bool,
        parent: Option<NodeId>,
        time: i64,
    },
    Finish {
        id: NodeId,
        status: Status,
        time: i64,
    },
}

/// A node of the rebuilt report tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    /// `None` while the node was never finished.
    pub status: Option<Status>,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub children: Vec<ReportNode>,
}

/// Rebuild the node tree from report events.
///
/// Nodes whose parent is not part of the report (e.g. a root owned by the test
/// runner) become top-level nodes. Children keep start order. Malformed event
/// sequences are tolerated here; see [`check_nesting`].
pub fn build_tree(events: &[ReportEvent]) -> Vec<ReportNode> {
    let mut slots: Vec<Option<ReportNode>> = Vec::new();
    let mut parents: Vec<Option<usize>> = Vec::new();
    let mut index: HashMap<&NodeId, usize> = HashMap::new();

    for event in events {
        match event {
            ReportEvent::Start {
                id,
                name,
                kind,
                parent,
                time,
                ..
            } => {
                if index.contains_key(id) {
                    continue;
                }
                let parent_slot = parent.as_ref().and_then(|p| index.get(p).copied());
                index.insert(id, slots.len());
                parents.push(parent_slot);
                slots.push(Some(ReportNode {
                    id: id.clone(),
                    name: name.clone(),
                    kind: *kind,
                    status: None,
                    started_at: *time,
                    ended_at: None,
                    children: Vec::new(),
                }));
            }
            ReportEvent::Finish { id, status, time } => {
                if let Some(node) = index.get(id).and_then(|&slot| slots[slot].as_mut()) {
                    node.status = Some(*status);
                    node.ended_at = Some(*time);
                }
            }
        }
    }

    // Parents always precede their children, so attach from the back.
    let mut roots = Vec::new();
    for slot in (0..slots.len()).rev() {
        let Some(node) = slots[slot].take() else {
            continue;
        };
        match parents[slot].and_then(|parent| slots[parent].as_mut()) {
            Some(parent) => parent.children.insert(0, node),
            None => roots.insert(0, node),
        }
    }
    roots
}

/// Validate that start/finish events are strictly nested.
///
/// A parent id that never starts in the report is an external root (the node a
/// test runner owns) and is accepted while no reported node is open. Returns
/// error messages in event order; empty when the report is well formed.
pub fn check_nesting(events: &[ReportEvent]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut started: HashMap<&NodeId, bool> = HashMap::new();
    let mut open: Vec<&NodeId> = Vec::new();

    for event in events {
        match event {
            ReportEvent::Start { id, parent, .. } => {
                if started.contains_key(id) {
                    errors.push(format!("duplicate node id '{id}'"));
                    continue;
                }
                if let Some(parent) = parent {
                    match started.get(parent) {
                        Some(true) => errors.push(format!(
                            "node '{id}' started under finished node '{parent}'"
                        )),
                        Some(false) if open.last() != Some(&parent) => errors.push(format!(
                            "node '{id}' started under '{parent}' but innermost open node is '{}'",
                            open.last().map(|top| top.as_str()).unwrap_or("<none>")
                        )),
                        // Unknown parents are external roots, valid only at top level.
                        None if !open.is_empty() => errors.push(format!(
                            "node '{id}' started under external node '{parent}' while '{}' is open",
                            open.last().map(|top| top.as_str()).unwrap_or("<none>")
                        )),
                        _ => {}
                    }
                }
                started.insert(id, false);
                open.push(id);
            }
            ReportEvent::Finish { id, .. } => match started.get(id) {
                None => errors.push(format!("finish for unknown node '{id}'")),
                Some(true) => errors.push(format!("node '{id}' finished twice")),
                Some(false) => {
                    if open.last() != Some(&id) {
                        let top = open.last().map(|top| top.as_str()).unwrap_or("<none>");
                        errors.push(format!("node '{id}' finished while '{top}' is still open"));
                    }
                    open.retain(|candidate| *candidate != id);
                    started.insert(id, true);
                }
            },
        }
    }

    for id in open {
        errors.push(format!("node '{id}' never finished"));
    }
    errors
}

/// Whether any node in the tree finished as [`Status::Failed`].
pub fn has_failures(nodes: &[ReportNode]) -> bool {
    nodes
        .iter()
        .any(|node| node.status == Some(Status::Failed) || has_failures(&node.children))
}
