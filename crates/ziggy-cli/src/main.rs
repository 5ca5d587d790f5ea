mod command_flows;
mod completion;
mod dispatch;
mod render;

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;
use ziggy_core::{ZiggyError, DEV_SENTINEL};

use crate::dispatch::run_cli;
use crate::render::{StatusLevel, TerminalRenderer};

const LOG_ENV: &str = "ZIGGY_LOG";
const EXIT_USAGE: u8 = 1;
const EXIT_ENVIRONMENT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "ziggy", version)]
#[command(about = "Install and switch between Zig compiler releases", long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Log diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Network timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List installed entries or the versions published for this platform
    List {
        #[arg(value_enum)]
        mode: ListMode,
    },
    /// Show the primary compiler, or make VERSION primary
    Primary { version: Option<String> },
    /// Download and unpack VERSION
    Install {
        #[arg(default_value = DEV_SENTINEL)]
        version: String,
    },
    /// Replace the installed development build with the newest one
    Upgrade,
    /// Remove an installed VERSION
    Destroy { version: String },
    /// Print the ziggy version
    Version,
    /// Print a shell completion script
    Completions { shell: Shell },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ListMode {
    Installed,
    Supported,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return ExitCode::from(exit_for_parse_error(&err)),
    };
    init_tracing(cli.verbose);

    match run_cli(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            TerminalRenderer::current().print_status(StatusLevel::Error, &describe_error(&err));
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn exit_for_parse_error(err: &clap::Error) -> u8 {
    let _ = err.print();
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        _ => EXIT_USAGE,
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Context messages down to the first library error. That error already
/// renders its own source, so deeper causes would repeat it.
fn describe_error(err: &anyhow::Error) -> String {
    let mut parts = Vec::new();
    for cause in err.chain() {
        parts.push(cause.to_string());
        if cause.is::<ZiggyError>() {
            break;
        }
    }
    parts.join(": ")
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ZiggyError>())
        .map(ZiggyError::exit_code)
        .unwrap_or(EXIT_ENVIRONMENT)
}
