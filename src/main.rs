use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mscript::commands::{self, LogSuccess};
use mscript::output::Format;
use mscript::{diagnostics, info, watch};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "MSCRIPT_LOG";

#[derive(Parser)]
#[command(name = "mscript", version, about = "Extract data entries from mscript files")]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read every script under a directory and report which ones fail
    Check {
        /// File or directory to check.
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Output syntax reference, configuration, and current state
    Info {
        /// Output as JSON instead of markdown.
        #[arg(long)]
        json: bool,
    },
    /// Print the line extraction starts on
    Locate {
        /// Script to inspect.
        file: PathBuf,
    },
    /// Read a script and print its entries
    Read {
        /// Script to read.
        file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Append a success line to the script after a clean read.
        #[arg(long)]
        log: bool,
    },
    /// Read a script, then re-read it whenever it changes
    Watch {
        /// Script to watch.
        file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

/// Install the stderr log subscriber, filtered by `MSCRIPT_LOG` (default `mscript=warn`).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| return EnvFilter::new("mscript=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { path, format } => commands::check(&path, format),
        Commands::Info { json } => {
            info::run(json);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Locate { file } => commands::locate(&file).map(|()| return ExitCode::SUCCESS),
        Commands::Read { file, format, log } => {
            let mode = if log { LogSuccess::Always } else { LogSuccess::FromConfig };
            commands::read(&file, format, mode).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Watch { file, format } => watch::run(&file, format),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            mscript::exit_code(&e)
        },
    };
}
