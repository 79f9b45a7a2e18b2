//! Deterministic, pure logic shared by the step engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod args;
pub mod path;
pub mod report;
pub mod resolve;
pub mod template;
pub mod types;
