//! Stable exit codes for stepscope CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid input, config or report, or other errors.
pub const INVALID: i32 = 1;
/// `stepscope check` found a step that finished as FAILED.
pub const FAILED: i32 = 2;
