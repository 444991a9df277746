//! Classroom: in-memory class and task registry over HTTP.
//!
//! # Usage
//!
//! ```text
//! classroom serve [--listen <addr>] [--request-timeout-secs <n>] [--log-json]
//! classroom class list|show|create|update|delete|tasks
//! classroom task list|show|create|update|delete|close|open
//! ```
//!
//! Client commands talk to `--server` (or `CLASSROOM_URL`) and accept `--json`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use classroom_server::config::{DEFAULT_SERVER_URL, ENV_SERVER_URL};
use classroom_server::ApiClient;
use commands::{class::ClassCommand, serve::ServeArgs, task::TaskCommand, Output};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "classroom",
    version,
    about = "Run and query an in-memory registry of classes and tasks",
    long_about = None,
)]
struct Cli {
    /// Base URL of a running classroom server.
    #[arg(long, global = true, env = ENV_SERVER_URL, default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Emit machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server in the foreground.
    Serve(ServeArgs),

    /// Manage classes.
    Class {
        #[command(subcommand)]
        command: ClassCommand,
    },

    /// Manage tasks and their open/closed state.
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output { json: cli.json };
    match cli.command {
        Commands::Serve(args) => args.run(),
        Commands::Class { command } => {
            commands::class::run(command, &ApiClient::new(cli.server), output)
        }
        Commands::Task { command } => {
            commands::task::run(command, &ApiClient::new(cli.server), output)
        }
    }
}
