//! Foundation CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use foundation_cli::cli::{Cli, Commands};
use foundation_cli::commands::QueryCommand;
use foundation_query::{AmbientTraceContext, OpenObserveClient};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` wins, then `--verbose`, then `warn`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<u8, foundation_cli::CliError> {
    let mut stdout = io::stdout().lock();
    let client = cli.openobserve_config().map(OpenObserveClient::new).transpose()?;
    let tracer = AmbientTraceContext::new();

    match &cli.command {
        Commands::Query(args) => {
            let cmd = QueryCommand::new(client);
            cmd.execute(&mut stdout, args, &tracer).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_without_configuration_fails() {
        let cli = Cli::parse_from([
            "foundation", "--url", "", "--user", "", "--password", "", "query",
        ]);
        let result = run(cli).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn run_rejects_injection_before_connecting() {
        let cli = Cli::parse_from([
            "foundation", "--url", "http://127.0.0.1:9", "--user", "u", "--password", "p",
            "query", "--service", "api' OR '1'='1",
        ]);
        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().starts_with("invalid service"));
    }
}
