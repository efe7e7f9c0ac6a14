//! Command-line argument parsing with clap.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use foundation_query::config::{
    DEFAULT_ORGANIZATION, ENV_ORG, ENV_PASSWORD, ENV_STREAM, ENV_TIMEOUT_SECS, ENV_URL, ENV_USER,
};
use foundation_query::types::{DEFAULT_SIZE, DEFAULT_STREAM};
use foundation_query::OpenObserveConfig;

/// Foundation - query structured logs in OpenObserve.
#[derive(Parser, Debug, Clone)]
#[command(name = "foundation")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// OpenObserve base URL.
    #[arg(long, env = ENV_URL, global = true)]
    pub url: Option<String>,

    /// OpenObserve user.
    #[arg(long, env = ENV_USER, global = true)]
    pub user: Option<String>,

    /// OpenObserve password.
    #[arg(long, env = ENV_PASSWORD, global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// OpenObserve organization.
    #[arg(long, env = ENV_ORG, global = true, default_value = DEFAULT_ORGANIZATION)]
    pub org: String,

    /// Request timeout in seconds.
    #[arg(
        long,
        env = ENV_TIMEOUT_SECS,
        global = true,
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Connection settings from flags and their environment fallbacks.
    ///
    /// Returns `None` unless URL, user, and password are all set.
    #[must_use]
    pub fn openobserve_config(&self) -> Option<OpenObserveConfig> {
        let url = non_empty(self.url.as_deref())?;
        let user = non_empty(self.user.as_deref())?;
        let password = non_empty(self.password.as_deref())?;
        Some(
            OpenObserveConfig::new(url, user, password)
                .with_organization(&self.org)
                .with_timeout(Duration::from_secs(self.timeout)),
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Pretty JSON per row.
    Json,
    /// One line per row: timestamp, level, service, message.
    #[default]
    Log,
    /// Aligned columns.
    Table,
    /// Comma-separated values with a header row.
    Csv,
    /// Counts per level and service.
    Summary,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Search logs.
    Query(QueryArgs),
}

/// Arguments for the query command.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Raw SQL sent as-is, bypassing the filter flags.
    ///
    /// The stream is whatever the SQL names in its FROM clause; `--stream`
    /// is not applied.
    #[arg(long, conflicts_with_all = ["current_trace", "trace_id", "level", "service"])]
    pub sql: Option<String>,

    /// Filter by the trace active in the current context.
    #[arg(long, conflicts_with = "trace_id")]
    pub current_trace: bool,

    /// Filter by trace id.
    #[arg(long)]
    pub trace_id: Option<String>,

    /// Filter by level (TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL).
    #[arg(long)]
    pub level: Option<String>,

    /// Filter by service name.
    #[arg(long)]
    pub service: Option<String>,

    /// Lookback window, e.g. `15m`, `1h`, `7d`.
    #[arg(long, default_value = "1h")]
    pub last: String,

    /// Stream to query.
    #[arg(long, env = ENV_STREAM, default_value = DEFAULT_STREAM)]
    pub stream: String,

    /// Maximum rows to return (1-10000).
    #[arg(short = 'n', long, default_value_t = DEFAULT_SIZE, allow_negative_numbers = true)]
    pub size: i64,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Log)]
    pub format: Format,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn query_args(cli: Cli) -> QueryArgs {
        match cli.command {
            Commands::Query(args) => args,
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn query_defaults() {
        let cli = Cli::try_parse_from(["foundation", "query"]).expect("parse");
        assert_eq!(cli.org, "default");
        assert_eq!(cli.timeout, 30);
        let args = query_args(cli);
        assert_eq!(args.last, "1h");
        assert_eq!(args.size, 100);
        assert_eq!(args.format, Format::Log);
        assert!(!args.current_trace);
        assert!(args.sql.is_none());
    }

    #[test]
    fn query_parses_filters() {
        let cli = Cli::try_parse_from([
            "foundation", "query", "--trace-id", "abc-123", "--level", "ERROR", "--service",
            "api", "-n", "20", "-f", "table", "--last", "30m",
        ])
        .expect("parse");
        let args = query_args(cli);
        assert_eq!(args.trace_id.as_deref(), Some("abc-123"));
        assert_eq!(args.level.as_deref(), Some("ERROR"));
        assert_eq!(args.service.as_deref(), Some("api"));
        assert_eq!(args.size, 20);
        assert_eq!(args.format, Format::Table);
        assert_eq!(args.last, "30m");
    }

    #[test]
    fn sql_conflicts_with_filters() {
        let err = Cli::try_parse_from(["foundation", "query", "--sql", "SELECT 1", "--level", "INFO"]);
        assert!(err.is_err());
    }

    #[test]
    fn current_trace_conflicts_with_trace_id() {
        let err = Cli::try_parse_from([
            "foundation", "query", "--current-trace", "--trace-id", "abc",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn global_flags_build_config() {
        let cli = Cli::try_parse_from([
            "foundation", "--url", "http://o2:5080", "--user", "u", "--password", "p",
            "--org", "acme", "--timeout", "5", "query",
        ])
        .expect("parse");
        let config = cli.openobserve_config().expect("config");
        assert_eq!(config.url, "http://o2:5080");
        assert_eq!(config.organization, "acme");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn missing_credentials_yield_no_config() {
        let cli = Cli::try_parse_from(["foundation", "--url", "http://o2:5080", "--user", "", "query"])
            .expect("parse");
        assert!(cli.openobserve_config().is_none());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = Cli::try_parse_from(["foundation", "--timeout", "0", "query"]);
        assert!(err.is_err());
        assert!(Cli::try_parse_from(["foundation", "--timeout", "1", "query"]).is_ok());
    }

    #[test]
    fn sql_help_says_stream_comes_from_sql() {
        let mut command = Cli::command();
        let query = command.find_subcommand_mut("query").expect("query subcommand");
        let sql = query
            .get_arguments()
            .find(|arg| arg.get_id() == "sql")
            .expect("sql argument");
        let help = sql
            .get_long_help()
            .or_else(|| sql.get_help())
            .map(ToString::to_string)
            .unwrap_or_default();
        assert!(help.contains("--stream"));
    }
}
