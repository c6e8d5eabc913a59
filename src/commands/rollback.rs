use anyhow::Result;
use console::style;
use log::info;
use std::fs;

use super::print_warning;
use crate::block::{self, RollbackOutcome};
use crate::context::RuntimeContext;
use crate::install_config::InstallConfig;
use crate::platform::Environment;
use crate::ui::Prompter;

pub fn cmd_rollback(
    ctx: &RuntimeContext,
    ui: &mut dyn Prompter,
    env: &Environment,
    existing: Option<&InstallConfig>,
) -> Result<()> {
    // The recorded startup file wins: the shell may have changed since the install
    let startup = match existing {
        Some(record) => record.startup_file.clone(),
        None => env.shell.shell.startup_file(&ctx.home),
    };

    let has_block = fs::read_to_string(&startup)
        .map(|content| block::has_block(&content))
        .unwrap_or(false);
    let has_backup = block::latest_backup(&startup)?.is_some();
    // The logger creates the state directory, so it is no evidence of an install
    let has_record = existing.is_some() || ctx.install_config.exists();
    if !has_block && !has_backup && !has_record {
        info!("Nothing to roll back for {}", startup.display());
        println!();
        println!(
            "  {} sfm is not installed for {}, nothing to roll back",
            style("◦").dim(),
            ctx.display(&startup)
        );
        println!();
        return Ok(());
    }

    let outcome = block::rollback(
        ui,
        &startup,
        &ctx.state_dir,
        &ctx.install_config,
        &ctx.home,
    )?;

    println!();
    match outcome {
        RollbackOutcome::Cancelled => {
            println!("  {} Rollback cancelled, nothing changed", style("◦").dim());
        }
        RollbackOutcome::RolledBack => {
            println!("  {} sfm has been rolled back", style("●").green());
            println!(
                "  {} Open a new shell to drop the loaded functions and aliases",
                style("◦").dim()
            );
        }
        RollbackOutcome::RolledBackWithErrors(errors) => {
            print_warning("Rollback finished with errors:");
            for e in &errors {
                println!("      {}", style(e).dim());
            }
            if ctx.log_file.exists() {
                println!(
                    "  {} Details in {}",
                    style("◦").dim(),
                    ctx.display(&ctx.log_file)
                );
            }
        }
    }
    println!();
    Ok(())
}
