//! Inspection helpers for `stepscope render` and `stepscope check`.

use std::path::Path;

use anyhow::{Result, anyhow};

use crate::core::report::{ReportNode, build_tree, check_nesting};
use crate::core::types::Status;
use crate::io::report_log::read_events;

/// Result of checking a report file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Every node finished without failing.
    Clean { nodes: usize },
    /// Well-formed report with failed nodes, listed as `>`-separated name paths.
    Failed { failed: Vec<String> },
}

/// Render a report file as an indented outline.
pub fn render_report(path: &Path) -> Result<String> {
    let events = read_events(path)?;
    Ok(render_tree(&build_tree(&events)))
}

/// Check nesting of a report file and collect failed nodes.
pub fn check_report(path: &Path) -> Result<CheckOutcome> {
    let events = read_events(path)?;
    let errors = check_nesting(&events);
    if !errors.is_empty() {
        return Err(anyhow!("report nesting violations:\n- {}", errors.join("\n- ")));
    }
    let roots = build_tree(&events);
    let mut failed = Vec::new();
    let mut nodes = 0;
    for root in &roots {
        collect_failed(root, &mut Vec::new(), &mut failed, &mut nodes);
    }
    if failed.is_empty() {
        Ok(CheckOutcome::Clean { nodes })
    } else {
        Ok(CheckOutcome::Failed { failed })
    }
}

/// One line per node: two-space indent per depth, name, bracketed status.
pub fn render_tree(roots: &[ReportNode]) -> String {
    let mut lines = Vec::new();
    for root in roots {
        render_inner(root, 0, &mut lines);
    }
    lines.join("\n")
}

fn render_inner(node: &ReportNode, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let status = node.status.map(Status::as_str).unwrap_or("OPEN");
    lines.push(format!("{}- {} [{}]", indent, node.name, status));
    for child in &node.children {
        render_inner(child, depth + 1, lines);
    }
}

fn collect_failed<'a>(
    node: &'a ReportNode,
    path: &mut Vec<&'a str>,
    failed: &mut Vec<String>,
    nodes: &mut usize,
) {
    *nodes += 1;
    path.push(&node.name);
    if node.status == Some(Status::Failed) {
        failed.push(path.join(" > "));
    }
    for child in &node.children {
        collect_failed(child, path, failed, nodes);
    }
    path.pop();
}
