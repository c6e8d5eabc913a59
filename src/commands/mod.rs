//! The setup session: what happens between argument parsing and exit.

pub mod completions;
pub mod install;
pub mod rollback;

use anyhow::Result;
use console::style;
use log::{info, warn};

use crate::context::RuntimeContext;
use crate::install_config::InstallConfig;
use crate::platform::Environment;
use crate::settings::Settings;
use crate::ui::Prompter;

const EXISTING_CHOICES: [&str; 3] = ["Update", "Rollback", "Abort"];

/// Run one session: rollback when asked to, otherwise install or act on an existing install.
pub fn cmd_setup(
    ctx: &RuntimeContext,
    ui: &mut dyn Prompter,
    settings: &Settings,
    env: &Environment,
    uninstall: bool,
) -> Result<()> {
    let existing = InstallConfig::load(&ctx.install_config)?;

    if uninstall {
        return rollback::cmd_rollback(ctx, ui, env, existing.as_ref());
    }

    let Some(existing) = existing else {
        return install::cmd_install(ctx, ui, settings, env, None);
    };

    info!(
        "Existing install for {} from {}",
        existing.shell, existing.install_date
    );
    let prompt = format!(
        "sfm is already installed for {} (since {}). What would you like to do?",
        existing.shell,
        existing.install_date.format("%Y-%m-%d")
    );
    match ui.choose(&prompt, &EXISTING_CHOICES, 0)? {
        Some(0) => install::cmd_install(ctx, ui, settings, env, Some(&existing)),
        Some(1) => rollback::cmd_rollback(ctx, ui, env, Some(&existing)),
        _ => {
            info!("Aborted at existing-install menu");
            println!();
            println!("  {} Aborted, nothing changed", style("◦").dim());
            println!();
            Ok(())
        }
    }
}

/// Print a warning and record it in the log.
pub(crate) fn print_warning(message: &str) {
    warn!("{}", message);
    println!("  {} {}", style("●").yellow(), message);
}
