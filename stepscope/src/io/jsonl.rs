//! JSON-lines file reporter.

use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::report::ReportEvent;
use crate::core::types::NodeId;
use crate::io::reporter::{CloseRequest, OpenRequest, Reporter};

/// Reporter that appends one JSON event per line to a file.
///
/// Events are buffered; [`Reporter::flush`] writes them through to disk.
#[derive(Debug)]
pub struct JsonlReporter {
    path: PathBuf,
    writer: RefCell<BufWriter<File>>,
    next_id: Cell<u64>,
}

impl JsonlReporter {
    /// Create (or truncate) the report file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create report dir {}", parent.display()))?;
        }
        let file =
            File::create(path).with_context(|| format!("create report {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: RefCell::new(BufWriter::new(file)),
            next_id: Cell::new(1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_event(&self, event: &ReportEvent) -> Result<()> {
        let mut line = serde_json::to_string(event).context("serialize report event")?;
        line.push('\n');
        self.writer
            .borrow_mut()
            .write_all(line.as_bytes())
            .with_context(|| format!("write report {}", self.path.display()))
    }
}

impl Reporter for JsonlReporter {
    fn open_node(&self, request: &OpenRequest<'_>) -> Result<NodeId> {
        let seq = self.next_id.get();
        self.next_id.set(seq + 1);
        let id = NodeId::new(format!("node-{seq}"));
        self.write_event(&ReportEvent::Start {
            id: id.clone(),
            name: request.name.to_string(),
            kind: request.kind,
            has_stats: request.has_stats,
            parent: request.parent.cloned(),
            time: request.start_time,
        })?;
        debug!(id = %id, name = request.name, "opened report node");
        Ok(id)
    }

    fn close_node(&self, request: &CloseRequest<'_>) -> Result<()> {
        self.write_event(&ReportEvent::Finish {
            id: request.id.clone(),
            status: request.status,
            time: request.end_time,
        })?;
        debug!(id = %request.id, status = %request.status, "closed report node");
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .borrow_mut()
            .flush()
            .with_context(|| format!("flush report {}", self.path.display()))
    }
}
