//! I/O helpers: reporters, report files and configuration.

pub mod config;
pub mod jsonl;
pub mod report_log;
pub mod reporter;
