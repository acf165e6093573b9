//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// relayctl - provision and update relay transport binaries
#[derive(Parser, Debug)]
#[command(name = "relayctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to runtime.yaml
    #[arg(short, long, global = true, env = "RELAYCTL_RUNTIME_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Transport binary management
    #[command(subcommand)]
    Binaries(BinariesCommands),

    /// Update transport binaries to their pinned versions
    Update(UpdateArgs),

    /// Upgrade relayctl itself
    Upgrade(UpgradeArgs),

    /// Tunnel service definitions
    #[command(subcommand)]
    Tunnel(TunnelCommands),
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum BinariesCommands {
    /// Show support, location and version of every binary
    List,

    /// Install binaries that are not present yet
    Install(InstallArgs),

    /// Copy an existing executable into the managed directory
    Adopt(AdoptArgs),
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Binaries to install (dnstt-server, slipstream-server, ssserver, microsocks)
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub binaries: Vec<String>,

    /// Install every binary supported on this platform
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct AdoptArgs {
    /// Binary type
    pub binary: String,

    /// Path to the executable
    pub path: Utf8PathBuf,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Show the update plan without changing anything
    #[arg(long)]
    pub check: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Check for updates only
    #[arg(long)]
    pub check: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand, Debug)]
pub enum TunnelCommands {
    /// Print the service definition a tunnel would get
    Render(TunnelArgs),

    /// Rebuild and replace a tunnel's service definition
    Regenerate(TunnelArgs),
}

#[derive(Args, Debug)]
pub struct TunnelArgs {
    /// Tunnel tag
    pub tag: String,

    /// Listen address
    #[arg(long, default_value = "127.0.0.1")]
    pub bind_address: String,

    /// Listen port (defaults to the tunnel's configured port)
    #[arg(long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_requires_names_or_all() {
        assert!(Cli::try_parse_from(["relayctl", "binaries", "install"]).is_err());
        assert!(Cli::try_parse_from(["relayctl", "binaries", "install", "--all"]).is_ok());
        assert!(
            Cli::try_parse_from(["relayctl", "binaries", "install", "ssserver", "--all"]).is_err()
        );
    }

    #[test]
    fn test_tunnel_bind_defaults() {
        let cli = Cli::try_parse_from(["relayctl", "tunnel", "render", "edge"]).unwrap();
        match cli.command {
            Commands::Tunnel(TunnelCommands::Render(args)) => {
                assert_eq!(args.tag, "edge");
                assert_eq!(args.bind_address, "127.0.0.1");
                assert_eq!(args.port, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["relayctl", "update", "--check", "-vv", "-c", "/tmp/r.yaml"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref().map(|p| p.as_str()), Some("/tmp/r.yaml"));
        assert!(matches!(cli.command, Commands::Update(UpdateArgs { check: true, .. })));
    }
}
