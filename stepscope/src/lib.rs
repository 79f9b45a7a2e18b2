//! Named, nested test steps for step-reporting backends.
//!
//! A step wraps a sub-operation of a test and shows up as a nested node in a
//! report. Step names are templates resolved from the call's arguments
//! (`"Login as {user.name}"`), and a session-owned cursor keeps track of the
//! node new steps attach under so nesting survives failures.
//!
//! - **[`core`]**: Pure logic (template scanning, argument binding, name
//!   resolution, report trees). No I/O, fully testable in isolation.
//! - **[`io`]**: Reporters, report files and configuration.
//!
//! [`session`], [`scope`] and [`step`] tie the two together; [`inspect`]
//! backs the CLI commands.

pub mod core;
pub mod exit_codes;
pub mod inspect;
pub mod io;
pub mod logging;
pub mod scope;
pub mod session;
pub mod step;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
