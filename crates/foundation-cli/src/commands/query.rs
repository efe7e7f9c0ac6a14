//! Query command implementation.
//!
//! Sanitizes the filter flags, builds the SQL, runs it, and presents the
//! response.

use std::io::Write;

use foundation_query::{
    build_query, execute_search, require_current_trace, sanitize_size, SearchClient,
    SearchResponse, TimeRange, TraceContextSource,
};
use tracing::debug;

use crate::cli::{Format, QueryArgs};
use crate::error::CliError;
use crate::output::OutputFormat;

/// Message printed when a query matches nothing.
pub const NO_RESULTS: &str = "No logs found";

/// Rendered result of one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentOutcome {
    /// Text for stdout.
    pub stdout: String,
    /// Process exit code.
    pub exit_code: u8,
}

/// Render `response` for a human.
///
/// An empty response prints [`NO_RESULTS`]. Otherwise the rows are rendered
/// in `format`, followed by a count line unless the format is a summary.
///
/// # Errors
///
/// Returns `CliError::Format` if a row cannot be serialized.
pub fn present(response: &SearchResponse, format: Format) -> Result<PresentOutcome, CliError> {
    if response.is_empty() {
        return Ok(PresentOutcome {
            stdout: format!("{NO_RESULTS}\n"),
            exit_code: 0,
        });
    }

    let output = OutputFormat::new(format);
    let mut stdout = output.render(response)?;
    stdout.push('\n');
    if !output.is_summary() {
        stdout.push_str(&format!(
            "\nFound {} logs, showing {}\n",
            response.total,
            response.hits.len()
        ));
    }
    Ok(PresentOutcome {
        stdout,
        exit_code: 0,
    })
}

/// A validated query ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    /// SQL text.
    pub sql: String,
    /// Time window.
    pub range: TimeRange,
    /// Row cap.
    pub size: u32,
}

/// Handler for the query command.
pub struct QueryCommand<C> {
    client: Option<C>,
}

impl<C: SearchClient> QueryCommand<C> {
    /// Creates a query handler.
    ///
    /// Without a client, one is built from the `OPENOBSERVE_*` environment
    /// at execution time.
    #[must_use]
    pub const fn new(client: Option<C>) -> Self {
        Self { client }
    }

    /// Validate `args` and build the SQL.
    ///
    /// `--sql` is used verbatim. Otherwise the trace id comes from `tracer`
    /// when `--current-trace` is set, and every filter is sanitized.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidInput` for a rejected filter,
    /// `QueryError::InvalidTimeSpec` for a bad `--last`, or
    /// `QueryError::NoActiveTrace` when no trace is active.
    pub fn prepare<T: TraceContextSource>(
        &self,
        args: &QueryArgs,
        tracer: &T,
    ) -> Result<PreparedQuery, CliError> {
        let range = TimeRange::parse_last(&args.last)?;
        let size = sanitize_size(args.size)?;

        let sql = if let Some(sql) = &args.sql {
            sql.clone()
        } else {
            let trace_id = if args.current_trace {
                Some(require_current_trace(tracer)?)
            } else {
                args.trace_id.clone()
            };
            build_query(
                trace_id.as_deref(),
                args.level.as_deref(),
                args.service.as_deref(),
                &args.stream,
                args.size,
            )?
        };

        Ok(PreparedQuery {
            sql,
            range,
            size: size.get(),
        })
    }

    /// Executes the query command, returning the exit code.
    ///
    /// # Errors
    ///
    /// Returns error if validation, the search, or writing fails.
    pub async fn execute<W: Write, T: TraceContextSource>(
        &self,
        out: &mut W,
        args: &QueryArgs,
        tracer: &T,
    ) -> Result<u8, CliError> {
        let query = self.prepare(args, tracer)?;
        debug!(sql = %query.sql, range = ?query.range, size = query.size, "running query");

        let response =
            execute_search(&query.sql, &query.range, query.size, self.client.as_ref()).await?;
        let outcome = present(&response, args.format)?;
        out.write_all(outcome.stdout.as_bytes())?;
        out.flush()?;
        Ok(outcome.exit_code)
    }
}
