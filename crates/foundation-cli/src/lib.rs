//! # foundation-cli
//!
//! Command-line front end for Foundation log queries.
//!
//! ```text
//! flags ─► QueryCommand::prepare ─► execute_search ─► present ─► stdout
//!            (sanitize + build)       (OpenObserve)     (format)
//! ```
//!
//! Connection settings come from `--url`, `--user`, `--password`, `--org`,
//! and `--timeout`, each backed by an `OPENOBSERVE_*` environment variable.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, QueryArgs};
pub use commands::{present, PresentOutcome, QueryCommand};
pub use error::CliError;
pub use output::{format_output, OutputFormat};
