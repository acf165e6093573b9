//! Binaries commands

use anyhow::{anyhow, Context, Result};
use relayctl_binaries::{BinaryType, Error as BinaryError, VersionManifest};
use tabled::{settings::Style as TableStyle, Table, Tabled};

use crate::cli::{AdoptArgs, InstallArgs};
use crate::context::AppContext;
use crate::output;

#[derive(Tabled)]
struct BinaryRow {
    #[tabled(rename = "binary")]
    name: String,
    #[tabled(rename = "supported")]
    supported: String,
    #[tabled(rename = "source")]
    origin: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "installed")]
    installed: String,
    #[tabled(rename = "pinned")]
    pinned: String,
}

pub fn list(ctx: &AppContext) -> Result<()> {
    let store = ctx.store()?;
    let manifest = VersionManifest::load(&ctx.config.paths.manifest)?;
    let platform = *store.platform();

    let rows: Vec<BinaryRow> = store
        .catalog()
        .iter()
        .map(|def| {
            let (origin, path) = match store.resolve_path(def.binary_type) {
                Ok(resolved) => (
                    resolved.origin.to_string(),
                    resolved.path.display().to_string(),
                ),
                Err(BinaryError::NotInstalled { .. }) => ("-".to_string(), "-".to_string()),
                Err(e) => ("error".to_string(), e.to_string()),
            };

            BinaryRow {
                name: def.binary_type.to_string(),
                supported: if def.available_on(&platform) { "yes" } else { "no" }.to_string(),
                origin,
                path,
                installed: manifest
                    .get(def.binary_type)
                    .unwrap_or("-")
                    .to_string(),
                pinned: if def.pinned_version.is_empty() {
                    "-".to_string()
                } else {
                    def.pinned_version.clone()
                },
            }
        })
        .collect();

    output::header(&format!("Transport binaries ({})", platform));
    println!("{}", Table::new(&rows).with(TableStyle::rounded()));
    Ok(())
}

pub async fn install(ctx: &AppContext, args: InstallArgs) -> Result<()> {
    let store = ctx.store()?;

    let targets: Vec<BinaryType> = if args.all {
        store
            .catalog()
            .iter()
            .filter(|def| def.available_on(store.platform()))
            .map(|def| def.binary_type)
            .collect()
    } else {
        args.binaries
            .iter()
            .map(|name| name.parse::<BinaryType>())
            .collect::<relayctl_binaries::Result<_>>()?
    };

    let mut failures = 0;
    for binary in targets {
        match store.ensure_installed(binary).await {
            Ok(resolved) => output::success(&format!(
                "{} ({}): {}",
                binary,
                resolved.origin,
                resolved.path.display()
            )),
            Err(e) => {
                failures += 1;
                output::error(&format!("{}", e));
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{} binaries failed to install", failures));
    }
    Ok(())
}

pub fn adopt(ctx: &AppContext, args: AdoptArgs) -> Result<()> {
    let binary: BinaryType = args.binary.parse()?;
    let store = ctx.store()?;

    let dest = store
        .copy_to_dir(args.path.as_std_path(), binary)
        .with_context(|| format!("Failed to adopt {} from {}", binary, args.path))?;

    output::success(&format!("Adopted {} at {}", binary, dest.display()));
    output::info("Run 'relayctl update' to let relayctl manage its version");
    Ok(())
}
