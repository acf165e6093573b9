//! Tunnel service commands

use anyhow::{Context, Result};
use relayctl_core::{BackendConfig, RelayConfig, ServiceDescriptor, TunnelConfig};
use relayctl_transport::BindOptions;

use crate::cli::TunnelArgs;
use crate::context::AppContext;
use crate::output;

fn bind_options(args: &TunnelArgs) -> BindOptions {
    BindOptions {
        address: args.bind_address.clone(),
        port: args.port,
    }
}

fn lookup<'a>(
    relay: &'a RelayConfig,
    tag: &str,
) -> Result<(&'a TunnelConfig, &'a BackendConfig)> {
    let tunnel = relay.tunnel(tag)?;
    let backend = relay.backend_for(tunnel)?;
    Ok((tunnel, backend))
}

fn print_descriptor(descriptor: &ServiceDescriptor) {
    output::kv("Service", &descriptor.name);
    output::kv("Command", &descriptor.exec_start);
    output::kv("Config", &descriptor.config_dir.display().to_string());
    if descriptor.binds_privileged_port {
        output::kv("Privileged port", "yes");
    }
}

/// Show the unit a tunnel would get, without installing it
pub fn render(ctx: &AppContext, args: TunnelArgs) -> Result<()> {
    let relay = ctx.relay_config()?;
    let (tunnel, backend) = lookup(&relay, &args.tag)?;

    let descriptor = ctx
        .transport_builder()?
        .build(tunnel, backend, &bind_options(&args))
        .with_context(|| format!("Failed to build service for tunnel {}", tunnel.tag))?;

    output::header(&format!("Tunnel {}", tunnel.tag));
    print_descriptor(&descriptor);
    println!();
    println!("{}", ctx.services().render_unit(&descriptor));
    Ok(())
}

/// Rebuild a tunnel's service, e.g. to move it on or off port 53
pub async fn regenerate(ctx: &AppContext, args: TunnelArgs) -> Result<()> {
    let relay = ctx.relay_config()?;
    let (tunnel, backend) = lookup(&relay, &args.tag)?;

    let builder = ctx.transport_builder()?;
    let services = ctx.services();

    let spinner = output::spinner(&format!("Regenerating {}...", tunnel.tag));
    let result = builder
        .regenerate(services.as_ref(), tunnel, backend, &bind_options(&args))
        .await;
    spinner.finish_and_clear();

    let descriptor =
        result.with_context(|| format!("Failed to regenerate tunnel {}", tunnel.tag))?;

    output::success(&format!("Regenerated {}", descriptor.name));
    print_descriptor(&descriptor);
    Ok(())
}
