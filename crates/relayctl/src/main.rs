//! relayctl - transport binary provisioning and tunnel service builder
//!
//! This is the main entry point for the relayctl command-line interface.

mod cli;
mod commands;
mod context;
mod output;
mod version;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{BinariesCommands, Cli, Commands, TunnelCommands};
use context::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Commands::Version(args) = &cli.command {
        return commands::version::run(args);
    }

    let ctx = AppContext::load(cli.config.as_deref(), cli.quiet)?;

    let result = match cli.command {
        Commands::Version(_) => Ok(()),
        Commands::Binaries(cmd) => match cmd {
            BinariesCommands::List => commands::binaries::list(&ctx),
            BinariesCommands::Install(args) => commands::binaries::install(&ctx, args).await,
            BinariesCommands::Adopt(args) => commands::binaries::adopt(&ctx, args),
        },
        Commands::Update(args) => commands::update::run(&ctx, args).await,
        Commands::Upgrade(args) => commands::upgrade::run(&ctx, args).await,
        Commands::Tunnel(cmd) => match cmd {
            TunnelCommands::Render(args) => commands::tunnel::render(&ctx, args),
            TunnelCommands::Regenerate(args) => commands::tunnel::regenerate(&ctx, args).await,
        },
    };

    ctx.report_diagnostics();
    result
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
