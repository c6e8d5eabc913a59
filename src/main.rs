mod block;
mod cli;
mod commands;
mod context;
mod defaults;
mod deps;
mod generator;
mod install_config;
mod logging;
mod platform;
mod settings;
mod templates;
mod ui;
mod utils;
mod validate;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use console::style;
use log::{error, warn};

use context::RuntimeContext;
use platform::Environment;
use settings::Settings;
use ui::Prompter;

fn main() {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    if let Some(shell) = cli.completions {
        if let Err(e) = commands::completions::cmd_completions(shell) {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
        return;
    }

    let ctx = match RuntimeContext::new(cli.batch, cli.yes) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    let logged = logging::init_logging(&ctx.log_file, cli.verbose);

    let settings = load_settings();
    let mut ui = ui::select_prompter(cli.ui.unwrap_or(settings.ui), ctx.batch, ctx.assume_yes);
    let env = Environment::detect(cli.shell.as_deref());

    let result = commands::cmd_setup(&ctx, ui.as_mut(), &settings, &env, cli.uninstall);

    if let Err(e) = result {
        report_failure(&ctx, ui.as_mut(), &e, logged);
        std::process::exit(1);
    }
}

/// Broken settings never stop a run: warn and continue with defaults.
fn load_settings() -> Settings {
    match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Using default settings: {:#}", e);
            eprintln!(
                "  {} Using default settings: {:#}",
                style("!").yellow(),
                e
            );
            Settings::default()
        }
    }
}

fn report_failure(ctx: &RuntimeContext, ui: &mut dyn Prompter, err: &anyhow::Error, logged: bool) {
    error!("{:#}", err);
    eprintln!();
    eprintln!("{} {:#}", style("error:").red().bold(), err);

    if !logged || !ctx.log_file.exists() {
        return;
    }
    eprintln!(
        "  {} Details in {}",
        style("◦").dim(),
        ctx.display(&ctx.log_file)
    );

    if ctx.batch {
        return;
    }
    if let Err(e) = offer_log_tail(ctx, ui) {
        eprintln!("  {} Cannot show the log: {:#}", style("!").yellow(), e);
    }
}

fn offer_log_tail(ctx: &RuntimeContext, ui: &mut dyn Prompter) -> Result<()> {
    let prompt = format!("Show the last {} log lines?", defaults::LOG_TAIL_LINES);
    if !ui.confirm(&prompt, false)? {
        return Ok(());
    }

    log::logger().flush();
    eprintln!();
    for line in utils::tail_lines(&ctx.log_file, defaults::LOG_TAIL_LINES)? {
        eprintln!("  {}", style(line).dim());
    }
    eprintln!();
    Ok(())
}
