//! Formatting and error-handling helpers shared by the Foundation tools.
//!
//! - [`human`]: byte sizes, durations, grouped numbers, percentages, truncation
//! - [`resilience`]: error boundaries, rollback-on-failure, and policy-driven
//!   error handling
//!
//! ```
//! use foundation_format::{format_duration, format_size, truncate};
//!
//! assert_eq!(format_size(2048), "2.0 KB");
//! assert_eq!(format_duration(90.0), "1m 30s");
//! assert_eq!(truncate("connection refused", 10), "connect...");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod human;
pub mod resilience;

pub use human::{format_duration, format_number, format_percentage, format_size, truncate};
pub use resilience::{
    error_boundary, transactional, BoundaryPolicy, ErrorHandler, ErrorPolicy,
};
