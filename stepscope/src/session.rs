//! Reporting session: the optional reporter plus the node cursor.
//!
//! A session is either local (no reporter; steps only log their names) or
//! reporting. In reporting mode the cursor holds the id of the node new steps
//! attach under. It starts at the session root and is moved by step scopes.
//!
//! Sessions are single-threaded: the cursor uses `RefCell`, so a session cannot
//! be shared across threads.

use std::cell::RefCell;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::types::{NodeId, NodeKind, Status};
use crate::io::config::StepsConfig;
use crate::io::jsonl::JsonlReporter;
use crate::io::reporter::{CloseRequest, OpenRequest, Reporter, timestamp_millis};
use crate::scope::StepScope;

struct Reporting {
    reporter: Box<dyn Reporter>,
    root: NodeId,
    /// Whether `finish` closes `root` (opened by [`Session::start`]).
    owns_root: bool,
    cursor: RefCell<NodeId>,
}

/// Session context passed to every step scope.
pub struct Session {
    reporting: Option<Reporting>,
}

impl Session {
    /// Session without a reporter.
    pub fn local() -> Self {
        Self { reporting: None }
    }

    /// Attach to a root node owned by the surrounding test runner.
    ///
    /// [`Session::finish`] flushes but does not close `root`.
    pub fn attach(reporter: impl Reporter + 'static, root: NodeId) -> Self {
        debug!(root = %root, "attached step session");
        Self {
            reporting: Some(Reporting {
                reporter: Box::new(reporter),
                cursor: RefCell::new(root.clone()),
                root,
                owns_root: false,
            }),
        }
    }

    /// Open a root node named `launch_name` and own it for the session lifetime.
    pub fn start(reporter: impl Reporter + 'static, launch_name: &str) -> Result<Self> {
        let root = reporter
            .open_node(&OpenRequest {
                name: launch_name,
                start_time: timestamp_millis(),
                kind: NodeKind::Test,
                has_stats: true,
                parent: None,
            })
            .with_context(|| format!("open session root '{launch_name}'"))?;
        debug!(root = %root, launch = launch_name, "started step session");
        Ok(Self {
            reporting: Some(Reporting {
                reporter: Box::new(reporter),
                cursor: RefCell::new(root.clone()),
                root,
                owns_root: true,
            }),
        })
    }

    /// Build a session from configuration: local when reporting is disabled,
    /// otherwise a JSON-lines report started under `launch_name`.
    pub fn from_config(cfg: &StepsConfig) -> Result<Self> {
        cfg.validate()?;
        if !cfg.enabled {
            debug!("step reporting disabled, using local session");
            return Ok(Self::local());
        }
        let reporter = JsonlReporter::create(&cfg.report_path)?;
        Self::start(reporter, &cfg.launch_name)
    }

    pub fn is_reporting(&self) -> bool {
        self.reporting.is_some()
    }

    pub fn reporter(&self) -> Option<&dyn Reporter> {
        self.reporting.as_ref().map(|r| r.reporter.as_ref())
    }

    /// Session root, `None` in local mode.
    pub fn root(&self) -> Option<&NodeId> {
        self.reporting.as_ref().map(|r| &r.root)
    }

    /// Node new steps attach under, `None` in local mode.
    pub fn cursor(&self) -> Option<NodeId> {
        self.reporting.as_ref().map(|r| r.cursor.borrow().clone())
    }

    /// Move the cursor. No-op in local mode.
    pub(crate) fn set_cursor(&self, id: NodeId) {
        if let Some(reporting) = &self.reporting {
            *reporting.cursor.borrow_mut() = id;
        }
    }

    /// Run `body` inside a step that finishes as [`Status::Info`] on success.
    pub fn step<T>(&self, name: impl Into<String>, body: impl FnOnce() -> Result<T>) -> Result<T> {
        StepScope::run(self, name, Status::default(), body)
    }

    /// Run `body` inside a step that finishes as `status` on success.
    pub fn step_with_status<T>(
        &self,
        name: impl Into<String>,
        status: Status,
        body: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        StepScope::run(self, name, status, body)
    }

    /// Tear the session down: close an owned root with `status`, then flush.
    pub fn finish(self, status: Status) -> Result<()> {
        let Some(reporting) = self.reporting else {
            return Ok(());
        };
        let cursor = reporting.cursor.borrow().clone();
        if cursor != reporting.root {
            warn!(cursor = %cursor, root = %reporting.root, "session finished with open steps");
        }
        let closed = if reporting.owns_root {
            reporting
                .reporter
                .close_node(&CloseRequest {
                    id: &reporting.root,
                    end_time: timestamp_millis(),
                    status,
                })
                .with_context(|| format!("close session root '{}'", reporting.root))
        } else {
            Ok(())
        };
        let flushed = reporting.reporter.flush().context("flush session report");
        closed.and(flushed)
    }
}
