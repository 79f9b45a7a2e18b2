//! Test-only helpers: an in-memory recording reporter and fixtures.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use serde_json::{Value, json};
use tracing_subscriber::fmt::MakeWriter;

use crate::core::report::{ReportEvent, ReportNode, build_tree};
use crate::core::types::NodeId;
use crate::io::reporter::{CloseRequest, OpenRequest, Reporter};
use crate::session::Session;

#[derive(Debug, Default)]
struct MemoryState {
    events: Vec<ReportEvent>,
    next_id: u64,
    flushes: usize,
    fail_open: bool,
    fail_close: bool,
    fail_flush: bool,
}

/// Reporter that records events in memory.
///
/// Clones share state, so a test can keep a handle after moving one clone into
/// a [`Session`].
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in call order.
    pub fn events(&self) -> Vec<ReportEvent> {
        self.state.borrow().events.clone()
    }

    /// Tree rebuilt from the recorded events.
    pub fn tree(&self) -> Vec<ReportNode> {
        build_tree(&self.state.borrow().events)
    }

    /// Number of `flush` calls, including failed ones.
    pub fn flush_count(&self) -> usize {
        self.state.borrow().flushes
    }

    pub fn fail_open(&self, fail: bool) {
        self.state.borrow_mut().fail_open = fail;
    }

    pub fn fail_close(&self, fail: bool) {
        self.state.borrow_mut().fail_close = fail;
    }

    pub fn fail_flush(&self, fail: bool) {
        self.state.borrow_mut().fail_flush = fail;
    }
}

impl Reporter for MemoryReporter {
    fn open_node(&self, request: &OpenRequest<'_>) -> Result<NodeId> {
        let mut state = self.state.borrow_mut();
        if state.fail_open {
            return Err(anyhow!("scripted open failure"));
        }
        state.next_id += 1;
        let id = NodeId::new(format!("mem-{}", state.next_id));
        state.events.push(ReportEvent::Start {
            id: id.clone(),
            name: request.name.to_string(),
            kind: request.kind,
            has_stats: request.has_stats,
            parent: request.parent.cloned(),
            time: request.start_time,
        });
        Ok(id)
    }

    fn close_node(&self, request: &CloseRequest<'_>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_close {
            return Err(anyhow!("scripted close failure"));
        }
        state.events.push(ReportEvent::Finish {
            id: request.id.clone(),
            status: request.status,
            time: request.end_time,
        });
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.flushes += 1;
        if state.fail_flush {
            return Err(anyhow!("scripted flush failure"));
        }
        Ok(())
    }
}

/// Id of the test item a runner would own.
pub fn root_id() -> NodeId {
    NodeId::new("test-item")
}

/// Session attached to [`root_id`] that records into `reporter`.
pub fn attached_session(reporter: &MemoryReporter) -> Session {
    Session::attach(reporter.clone(), root_id())
}

/// An object argument with a `name` field.
pub fn named(name: &str) -> Value {
    json!({ "name": name })
}

/// Shared byte buffer that a test subscriber writes formatted events into.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `body` with a thread-local subscriber at INFO and above, returning its
/// result and the plain-text log lines it emitted.
pub fn capture_logs<R>(body: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, body);
    let bytes = buffer.0.lock().map(|bytes| bytes.clone()).unwrap_or_default();
    (result, String::from_utf8_lossy(&bytes).into_owned())
}
