//! Scoped acquisition of one reported step.
//!
//! Entering a [`StepScope`] opens a child node under the session cursor and
//! moves the cursor to it. Releasing closes the node, flushes the reporter and
//! restores the cursor to the value saved on entry. Release happens exactly
//! once: through [`StepScope::exit`], or on drop (including panic unwinding).

use std::thread;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::core::types::{NodeId, NodeKind, Status};
use crate::io::reporter::{CloseRequest, OpenRequest, timestamp_millis};
use crate::session::Session;

struct OpenNode {
    id: NodeId,
    /// Cursor value before this node was opened.
    parent: NodeId,
}

/// Guard for one open step. Local sessions hold no node.
pub struct StepScope<'s> {
    session: &'s Session,
    name: String,
    exit_status: Status,
    node: Option<OpenNode>,
    released: bool,
}

impl<'s> StepScope<'s> {
    /// Open a step named `name` that finishes as `exit_status` unless it fails.
    ///
    /// A reporter failure is returned before anything runs and leaves the
    /// cursor unchanged.
    pub fn enter(session: &'s Session, name: impl Into<String>, exit_status: Status) -> Result<Self> {
        let name = name.into();
        let (Some(reporter), Some(parent)) = (session.reporter(), session.cursor()) else {
            info!("{name}");
            return Ok(Self {
                session,
                name,
                exit_status,
                node: None,
                released: false,
            });
        };

        let id = reporter
            .open_node(&OpenRequest {
                name: &name,
                start_time: timestamp_millis(),
                kind: NodeKind::Step,
                has_stats: false,
                parent: Some(&parent),
            })
            .with_context(|| format!("open step '{name}'"))?;
        debug!(id = %id, parent = %parent, step = %name, "entered step");
        session.set_cursor(id.clone());

        Ok(Self {
            session,
            name,
            exit_status,
            node: Some(OpenNode { id, parent }),
            released: false,
        })
    }

    /// Run `body` inside a step.
    ///
    /// An error from `body` closes the step as [`Status::Failed`] and is returned
    /// unchanged. Otherwise a failure to close or flush the step is returned.
    pub fn run<T>(
        session: &'s Session,
        name: impl Into<String>,
        exit_status: Status,
        body: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let scope = Self::enter(session, name, exit_status)?;
        let outcome = body();
        let released = scope.exit(outcome.is_err());
        match outcome {
            Ok(value) => released.map(|()| value),
            Err(err) => Err(err),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reporter id of this step, `None` in local mode.
    pub fn id(&self) -> Option<&NodeId> {
        self.node.as_ref().map(|node| &node.id)
    }

    /// Release the step, forcing [`Status::Failed`] when `failed` is set.
    pub fn exit(mut self, failed: bool) -> Result<()> {
        self.release(failed)
    }

    fn release(&mut self, failed: bool) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        let (Some(node), Some(reporter)) = (self.node.take(), self.session.reporter()) else {
            return Ok(());
        };

        let status = if failed {
            Status::Failed
        } else {
            self.exit_status
        };
        let closed = reporter
            .close_node(&CloseRequest {
                id: &node.id,
                end_time: timestamp_millis(),
                status,
            })
            .with_context(|| format!("close step '{}'", self.name));
        let flushed = reporter
            .flush()
            .with_context(|| format!("flush step '{}'", self.name));
        // Restore unconditionally, after the reporter calls.
        self.session.set_cursor(node.parent);

        for err in [&closed, &flushed].into_iter().filter_map(|r| r.as_ref().err()) {
            warn!(step = %self.name, error = %format!("{err:#}"), "step release failed");
        }
        debug!(id = %node.id, status = %status, "exited step");
        closed.and(flushed)
    }
}

impl Drop for StepScope<'_> {
    fn drop(&mut self) {
        if !self.released {
            // Failures are already logged by `release`.
            let _ = self.release(thread::panicking());
        }
    }
}
