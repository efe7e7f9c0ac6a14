//! CLI command implementations.
//!
//! - [`query`] - Log search and result presentation

pub mod query;

pub use query::{present, PresentOutcome, PreparedQuery, QueryCommand, NO_RESULTS};
