//! Upgrade command

use anyhow::{anyhow, Result};
use dialoguer::Confirm;
use relayctl_update::{platform_asset, ReleaseChecker, SelfUpdater, VERSION};

use crate::cli::UpgradeArgs;
use crate::context::AppContext;
use crate::output;

pub async fn run(ctx: &AppContext, args: UpgradeArgs) -> Result<()> {
    let checker = ReleaseChecker::new(&ctx.config)?;

    output::info(&format!("Current version: {}", VERSION));

    let spinner = output::spinner("Checking for updates...");
    let update = checker.check_update(VERSION).await;
    spinner.finish_and_clear();

    let release = match update? {
        Some(release) => release,
        None => {
            output::success("Already on the latest version");
            return Ok(());
        }
    };

    output::success(&format!("Update available: {}", release.tag_name));
    if let Some(date) = &release.published_at {
        output::kv("Published", date.get(..10).unwrap_or(date));
    }

    if args.check {
        output::info("Run 'relayctl upgrade' to install the update");
        return Ok(());
    }

    let platform = ctx.platform()?;
    let asset = platform_asset(&release, &platform).ok_or_else(|| {
        anyhow!(
            "Release {} has no asset for {}",
            release.tag_name,
            platform
        )
    })?;

    let updater = SelfUpdater::new(
        &ctx.config.network.user_agent,
        &ctx.config.paths.self_install_path,
    )?
    .with_progress(!args.yes);

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Replace {} with {}?",
                updater.binary_path().display(),
                release.tag_name
            ))
            .default(true)
            .interact()?;

        if !confirmed {
            output::info("Upgrade cancelled");
            return Ok(());
        }
    }

    let path = updater.apply(asset).await?;
    output::success(&format!(
        "Upgraded to {} at {}",
        release.version(),
        path.display()
    ));
    Ok(())
}
