//! bundkit CLI - query German public APIs and print one JSON document
//!
//! Exactly one line of compact JSON goes to stdout per invocation: the
//! shaped result (exit 0) or `{"error": ...}` (exit 1). Diagnostics go to
//! stderr through tracing.

use std::ffi::OsString;
use std::io::{self, Write};
use std::time::Duration;

use bundkit::{Service, Tool};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use serde_json::{json, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// bundkit - compact JSON from German government and utility APIs
#[derive(Parser, Debug)]
#[command(name = "bundkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    service: Option<Service>,

    /// Custom User-Agent
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Send requests to this base URL instead of the upstream host
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds (default depends on the service)
    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Log to stderr (-v debug, -vv trace); RUST_LOG is used otherwise
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();
    let cli = match Cli::try_parse_from(args.iter().cloned()) {
        Ok(cli) => cli,
        Err(err) => exit_on_parse_error(err, &args),
    };

    init_tracing(cli.verbose);
    let tool = build_tool(&cli);

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(tool.llmtxt());
        std::process::exit(0);
    }

    let Some(service) = cli.service.as_ref() else {
        fail(&error_document(
            "Missing service. Run 'bundkit --help' for the list of services.",
        ));
    };

    debug!(service = service.name(), "Running");

    match tool.execute(service).await {
        Ok(value) => writeln_safe(&value.to_string()),
        Err(e) => {
            debug!(error = ?e, "Request failed");
            fail(&e.to_document());
        }
    }
}

fn build_tool(cli: &Cli) -> Tool {
    let mut builder = Tool::builder();
    if let Some(ua) = &cli.user_agent {
        builder = builder.user_agent(ua);
    }
    if let Some(base) = &cli.base_url {
        builder = builder.base_url(base);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("bundkit=debug,bundkit_cli=debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Help and version print normally; every other parse failure becomes an
/// error document so stdout always carries JSON.
fn exit_on_parse_error(err: clap::Error, args: &[OsString]) -> ! {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            std::process::exit(0);
        }
        _ => fail(&parse_error_document(&err, args)),
    }
}

fn parse_error_document(err: &clap::Error, args: &[OsString]) -> Value {
    let message = match err.kind() {
        // Rendered as the service's help page, which has no error line
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand | ErrorKind::MissingSubcommand => {
            missing_subcommand_message(args)
        }
        _ => parse_error_message(err),
    };
    error_document(&message)
}

/// Names the service that was given without an operation
fn missing_subcommand_message(args: &[OsString]) -> String {
    let command = Cli::command();
    let service = args
        .iter()
        .skip(1)
        .filter_map(|arg| arg.to_str())
        .find(|arg| command.find_subcommand(arg).is_some());
    match service {
        Some(name) => format!(
            "Missing subcommand for '{0}'. Run 'bundkit {0} --help'.",
            name
        ),
        None => "Missing subcommand. Run 'bundkit --help'.".to_string(),
    }
}

/// First line of clap's rendered error, without the `error: ` prefix
fn parse_error_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.trim_start_matches("error:").trim().to_string()
}

fn error_document(message: &str) -> Value {
    json!({ "error": message })
}

fn fail(document: &Value) -> ! {
    writeln_safe(&document.to_string());
    std::process::exit(1);
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
