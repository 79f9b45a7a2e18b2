//! Shared types for step reporting.
//!
//! These types define the contract between step scopes and reporters. The
//! serialized forms are wire-visible: reporters receive them verbatim and the
//! JSON-lines report stores them as-is.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Finishing status of a reported node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Passed,
    Failed,
    Stopped,
    Skipped,
    Interrupted,
    Cancelled,
    /// Status of a step that completes without error unless configured otherwise.
    #[default]
    Info,
    Warn,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Passed => "PASSED",
            Status::Failed => "FAILED",
            Status::Stopped => "STOPPED",
            Status::Skipped => "SKIPPED",
            Status::Interrupted => "INTERRUPTED",
            Status::Cancelled => "CANCELLED",
            Status::Info => "INFO",
            Status::Warn => "WARN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of node opened on the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeKind {
    /// Session root opened by [`crate::session::Session::start`].
    Test,
    /// Nested step opened by a step scope.
    Step,
}

/// Opaque node identifier handed out by a reporter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
