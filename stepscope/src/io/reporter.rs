//! Reporter abstraction for step reporting backends.
//!
//! The [`Reporter`] trait decouples step scopes from the backend that records
//! nodes (currently a JSON-lines file). Tests use a recording reporter that
//! keeps events in memory without touching disk.

use anyhow::Result;

use crate::core::types::{NodeId, NodeKind, Status};

/// Parameters for opening a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest<'a> {
    pub name: &'a str,
    /// Milliseconds since the Unix epoch.
    pub start_time: i64,
    pub kind: NodeKind,
    /// Whether the node counts towards the backend's test statistics.
    pub has_stats: bool,
    /// Node to attach under; `None` opens a top-level node.
    pub parent: Option<&'a NodeId>,
}

/// Parameters for closing a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseRequest<'a> {
    pub id: &'a NodeId,
    /// Milliseconds since the Unix epoch.
    pub end_time: i64,
    pub status: Status,
}

/// Abstraction over reporting backends.
///
/// Calls are synchronous and expected to be short. Transport failures are
/// returned to the caller, which logs them and keeps its own state consistent.
pub trait Reporter {
    /// Open a node and return the identifier the backend assigned to it.
    fn open_node(&self, request: &OpenRequest<'_>) -> Result<NodeId>;

    /// Close a previously opened node.
    fn close_node(&self, request: &CloseRequest<'_>) -> Result<()>;

    /// Transmit any pending data.
    fn flush(&self) -> Result<()>;
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
