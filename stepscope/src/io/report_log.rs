//! Read JSON-lines step reports from disk.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::report::ReportEvent;

/// Load report events from `path`, skipping blank lines.
pub fn read_events(path: &Path) -> Result<Vec<ReportEvent>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read report {}", path.display()))?;
    parse_events(&contents).with_context(|| format!("parse report {}", path.display()))
}

fn parse_events(contents: &str) -> Result<Vec<ReportEvent>> {
    let mut events = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event: ReportEvent =
            serde_json::from_str(line).with_context(|| format!("line {}", index + 1))?;
        events.push(event);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Status;

    #[test]
    fn parse_skips_blank_lines() {
        let contents = "\n{\"event\":\"finish\",\"id\":\"n\",\"status\":\"WARN\",\"time\":3}\n\n";
        let events = parse_events(contents).expect("parse");
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            ReportEvent::Finish {
                status: Status::Warn,
                ..
            }
        ));
    }

    #[test]
    fn parse_error_names_line_number() {
        let contents = "{\"event\":\"finish\",\"id\":\"n\",\"status\":\"INFO\",\"time\":3}\nnot json\n";
        let err = parse_events(contents).expect_err("invalid");
        assert!(format!("{err:#}").contains("line 2"));
    }

    #[test]
    fn read_missing_file_fails_with_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = read_events(&temp.path().join("missing.jsonl")).expect_err("missing");
        assert!(format!("{err:#}").contains("missing.jsonl"));
    }
}
