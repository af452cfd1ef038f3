//! A small interactive shell: one command per line, two-stage pipelines,
//! background jobs.
//!
//! Each input line is parsed into a [`command::CommandRequest`], the target
//! executable is resolved against a colon-delimited search path (`MYPATH`,
//! defaulting to `/bin:.`), and the request is dispatched as a builtin
//! (`cd`, `exit`), a single child process, or a two-stage pipeline, in the
//! foreground or detached with `&`. Detached processes are tracked in a
//! [`jobs::JobTable`] and reaped, non-blocking, once per prompt cycle.
//!
//! The main entry point is [`Interpreter`], which owns the environment
//! captured at startup and the job table, and drives the interactive loop.

mod builtin;
pub mod command;
pub mod env;
mod external;
mod interpreter;
pub mod jobs;
pub mod parser;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
