//! Update command

use anyhow::{anyhow, Result};
use dialoguer::Confirm;
use relayctl_update::{DependencyIndex, UpdateOrchestrator, UpdatePlan, UpdateReport};

use crate::cli::UpdateArgs;
use crate::context::AppContext;
use crate::output;

pub async fn run(ctx: &AppContext, args: UpdateArgs) -> Result<()> {
    let services = ctx.services();
    let dependents = DependencyIndex::new(ctx.tunnel_source(), services.clone(), ctx.name_prefix())
        .with_diagnostics(ctx.diagnostics.clone());

    let orchestrator = UpdateOrchestrator::new(
        ctx.store()?,
        services,
        dependents,
        &ctx.config.paths.manifest,
    );

    let spinner = output::spinner("Comparing installed binaries...");
    let plan = orchestrator.plan().await;
    spinner.finish_and_clear();
    let plan = plan?;

    print_plan(&plan);

    if plan.pending.is_empty() {
        if !plan.invalid.is_empty() {
            return Err(anyhow!("{} binaries could not be evaluated", plan.invalid.len()));
        }
        output::success("All managed binaries are up to date");
        return Ok(());
    }

    if args.check {
        output::info("Run 'relayctl update' to apply these updates");
        return Ok(());
    }

    if !args.yes {
        let drained = plan.services_to_drain();
        let prompt = if drained.is_empty() {
            format!("Update {} binaries?", plan.pending.len())
        } else {
            format!(
                "Update {} binaries and restart {} services?",
                plan.pending.len(),
                drained.len()
            )
        };

        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;

        if !confirmed {
            output::info("Update cancelled");
            return Ok(());
        }
    }

    let report = orchestrator.run().await?;
    print_report(&report);

    if !report.is_success() {
        return Err(anyhow!("Update finished with errors: {}", report.summary()));
    }
    Ok(())
}

fn print_plan(plan: &UpdatePlan) {
    if !plan.pending.is_empty() {
        output::header("Pending updates");
        for pending in &plan.pending {
            println!(
                "  {}",
                output::version_change(
                    pending.binary.as_str(),
                    pending.installed.as_deref(),
                    &pending.target
                )
            );
            if pending.dependents_unknown {
                output::warning("Dependent services could not be determined");
            } else if !pending.dependents.is_empty() {
                output::kv("Restarts", &pending.dependents.join(", "));
            }
        }
    }

    for skipped in &plan.skipped {
        output::info(&format!("Skipping {} ({})", skipped.binary, skipped.reason));
    }

    for invalid in &plan.invalid {
        output::error(&format!("{}: {}", invalid.binary, invalid.error));
    }
}

fn print_report(report: &UpdateReport) {
    for updated in &report.updated {
        output::success(&output::version_change(
            updated.binary.as_str(),
            updated.from.as_deref(),
            &updated.to,
        ));
    }

    for failure in &report.failed {
        output::error(&format!("{}: {}", failure.binary, failure.error));
    }

    for failure in &report.stop_failures {
        output::warning(&format!("Could not stop {}: {}", failure.service, failure.error));
    }

    for failure in &report.restart_failures {
        output::error(&format!("Could not restart {}: {}", failure.service, failure.error));
    }

    if let Some(error) = &report.commit_error {
        output::error(&format!(
            "Version manifest not written, updated binaries will be offered again: {}",
            error
        ));
    }

    if !report.dependents_unknown.is_empty() {
        let names: Vec<String> = report
            .dependents_unknown
            .iter()
            .map(|b| b.to_string())
            .collect();
        output::warning(&format!(
            "Dependents unknown for {}; running services may still use the old binary",
            names.join(", ")
        ));
    }

    println!();
    output::info(&report.summary());
}
