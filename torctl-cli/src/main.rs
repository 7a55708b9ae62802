//! torctl — talk to a running Tor daemon over its control port.
//!
//! # Usage
//!
//! ```text
//! torctl [--control ADDR] [--cookie-file PATH] [--verify-server-hash] [--json] <COMMAND>
//! torctl protocol-info
//! torctl info version traffic/read
//! torctl raw GETCONF SocksPort
//! torctl events CIRC STATUS_CLIENT
//! torctl signal NEWNYM
//! ```

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{
    events::EventsArgs, info::InfoArgs, raw::RawArgs, signal::SignalArgs, ConnectArgs, Output,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "torctl",
    version,
    about = "Query and control a Tor daemon through its control port",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    connect: ConnectArgs,

    /// Emit machine-readable JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show supported authentication methods and the cookie path (no login).
    ProtocolInfo,

    /// Authenticate and read GETINFO keys.
    Info(InfoArgs),

    /// Authenticate and send one command line verbatim.
    Raw(RawArgs),

    /// Authenticate, subscribe, and print events until interrupted.
    Events(EventsArgs),

    /// Authenticate and send a SIGNAL.
    Signal(SignalArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.connect.client_config()?;
    let output = Output { json: cli.json };
    match cli.command {
        Commands::ProtocolInfo => commands::protocol_info::run(&config, output).await,
        Commands::Info(args) => args.run(&config, output).await,
        Commands::Raw(args) => args.run(&config, output).await,
        Commands::Events(args) => args.run(&config, output).await,
        Commands::Signal(args) => args.run(&config, output).await,
    }
}

/// Diagnostics go to stderr so stdout stays parseable.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
