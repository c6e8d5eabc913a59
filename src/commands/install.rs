use anyhow::{Context, Result};
use console::style;
use log::info;
use std::fs;
use std::path::Path;

use super::print_warning;
use crate::block::{self, ReconcileOutcome};
use crate::context::RuntimeContext;
use crate::deps;
use crate::generator::{self, CustomFunction, FunctionFeature, GeneratedArtifact};
use crate::install_config::InstallConfig;
use crate::platform::{Environment, has_executable};
use crate::settings::Settings;
use crate::templates::{self, AliasGroup, BuiltinKey, FunctionKey};
use crate::ui::{ChecklistItem, Prompter};
use crate::utils;
use crate::validate::{self, SyntaxCheck};

/// Fresh install, or update when `previous` is the existing record.
pub fn cmd_install(
    ctx: &RuntimeContext,
    ui: &mut dyn Prompter,
    settings: &Settings,
    env: &Environment,
    previous: Option<&InstallConfig>,
) -> Result<()> {
    print_environment(ctx, env);

    let (default_functions, default_aliases) = match previous {
        Some(previous) => (previous.functions.clone(), previous.aliases.clone()),
        None => (settings.function_defaults(), settings.alias_defaults()),
    };

    let Some(builtins) = select_functions(ui, &default_functions)? else {
        return cancelled();
    };
    let mut functions: Vec<FunctionFeature> =
        builtins.iter().copied().map(FunctionFeature::Builtin).collect();
    if !ctx.batch {
        let customs = collect_custom_functions(ui, &functions)?;
        functions.extend(customs);
    }
    let Some(aliases) = select_aliases(ui, &default_aliases)? else {
        return cancelled();
    };

    if functions.is_empty() && aliases.is_empty() {
        info!("Nothing selected");
        println!();
        println!("  {} Nothing selected, nothing to install", style("◦").dim());
        println!();
        return Ok(());
    }
    info!(
        "Selected functions: [{}], aliases: [{}]",
        functions.iter().map(|f| f.name()).collect::<Vec<_>>().join(", "),
        aliases.iter().map(|g| g.as_str()).collect::<Vec<_>>().join(", ")
    );

    if settings.install_dependencies {
        ensure_dependencies(ctx, ui, env, &builtins, &aliases)?;
    }

    let family = env.family();
    let paths = ctx.artifact_paths(family);
    let artifacts = [
        generator::render_functions(family, &functions, &paths.functions)?,
        generator::render_aliases(family, &aliases, &paths.aliases)?,
    ];
    fs::create_dir_all(&ctx.state_dir)
        .with_context(|| format!("Failed to create {}", ctx.state_dir.display()))?;
    for artifact in &artifacts {
        utils::write_atomic(&artifact.path, &artifact.content)?;
        info!("Wrote {}", artifact.path.display());
        println!("  {} Wrote {}", style("●").green(), ctx.display(&artifact.path));
    }

    if settings.syntax_check {
        check_artifacts(ctx, env, &artifacts);
    }

    let startup = env.shell.shell.startup_file(&ctx.home);
    if let Some(previous) = previous
        && previous.startup_file != startup
    {
        leave_previous_startup(ctx, ui, &previous.startup_file)?;
    }

    let outcome = block::reconcile(ui, &startup, family, &paths)?;

    InstallConfig::now(
        env.shell.shell,
        &startup,
        &paths.functions,
        &paths.aliases,
        builtins,
        aliases,
    )
    .save(&ctx.install_config)?;
    info!("Install recorded in {}", ctx.install_config.display());

    print_summary(ctx, ui, env, &startup, &artifacts, &outcome)
}

fn cancelled() -> Result<()> {
    info!("Selection cancelled");
    println!();
    println!("  {} Cancelled, nothing changed", style("◦").dim());
    println!();
    Ok(())
}

fn print_environment(ctx: &RuntimeContext, env: &Environment) {
    println!();
    println!("  {}", style("sfm setup").bold());
    println!();
    println!("  {} System: {}", style("◦").dim(), env.distro.pretty_name);
    println!(
        "  {} Shell: {} ({})",
        style("◦").dim(),
        style(env.shell.shell).cyan(),
        ctx.display(&env.shell.shell.startup_file(&ctx.home))
    );
    match env.shell.unrecognized.as_deref() {
        Some("") => print_warning(&format!(
            "$SHELL is not set, configuring {}",
            env.shell.shell
        )),
        Some(raw) => print_warning(&format!(
            "Shell '{}' is not supported, configuring {} instead",
            raw, env.shell.shell
        )),
        None => {}
    }
    if env.package_manager.is_none() {
        print_warning("No supported package manager found, missing tools cannot be installed");
    } else {
        println!(
            "  {} Package manager: {}",
            style("◦").dim(),
            env.package_manager.name
        );
    }
    if env.is_root {
        println!("  {} Running as root", style("◦").dim());
    }
    info!(
        "Environment: distro={} ({}), shell={}, package manager={}, root={}",
        env.distro.distro.family_name(),
        env.distro.pretty_name,
        env.shell.shell,
        env.package_manager.name,
        env.is_root
    );
    println!();
}

fn select_functions(
    ui: &mut dyn Prompter,
    defaults: &[FunctionKey],
) -> Result<Option<Vec<FunctionKey>>> {
    let items: Vec<ChecklistItem> = FunctionKey::ALL
        .iter()
        .map(|key| {
            ChecklistItem::new(
                key.as_str(),
                templates::describe(BuiltinKey::Function(*key)),
                defaults.contains(key),
            )
        })
        .collect();
    let selected = ui.checklist("Select shell functions to install", &items)?;
    Ok(selected.map(|indices| indices.into_iter().map(|i| FunctionKey::ALL[i]).collect()))
}

fn select_aliases(
    ui: &mut dyn Prompter,
    defaults: &[AliasGroup],
) -> Result<Option<Vec<AliasGroup>>> {
    let items: Vec<ChecklistItem> = AliasGroup::ALL
        .iter()
        .map(|group| {
            ChecklistItem::new(
                group.as_str(),
                templates::describe(BuiltinKey::Aliases(*group)),
                defaults.contains(group),
            )
        })
        .collect();
    let selected = ui.checklist("Select alias groups to install", &items)?;
    Ok(selected.map(|indices| indices.into_iter().map(|i| AliasGroup::ALL[i]).collect()))
}

/// Ask for custom functions until the user declines. A cancelled prompt ends the loop.
fn collect_custom_functions(
    ui: &mut dyn Prompter,
    selected: &[FunctionFeature],
) -> Result<Vec<FunctionFeature>> {
    let mut customs: Vec<FunctionFeature> = Vec::new();
    let mut question = "Add a custom function?";

    while ui.confirm(question, false)? {
        question = "Add another custom function?";

        let Some(name) = ui.prompt_text("Function name", None)? else {
            break;
        };
        let taken = selected
            .iter()
            .chain(customs.iter())
            .any(|f| f.name() == name.trim());
        if taken {
            print_warning(&format!("A function named '{}' is already selected", name.trim()));
            continue;
        }
        let Some(description) = ui.prompt_text("Description", Some(""))? else {
            break;
        };
        let Some(command) = ui.prompt_text("Command", None)? else {
            break;
        };

        match CustomFunction::new(name, description, command) {
            Ok(custom) => {
                info!("Custom function '{}': {}", custom.name, custom.command);
                println!("  {} Added {}", style("●").green(), style(&custom.name).bold());
                customs.push(FunctionFeature::Custom(custom));
            }
            Err(e) => print_warning(&e.to_string()),
        }
    }
    Ok(customs)
}

fn ensure_dependencies(
    ctx: &RuntimeContext,
    ui: &mut dyn Prompter,
    env: &Environment,
    functions: &[FunctionKey],
    aliases: &[AliasGroup],
) -> Result<()> {
    let required = deps::required_executables(functions, aliases);
    let missing = deps::missing_executables(&required, has_executable);
    if missing.is_empty() {
        return Ok(());
    }

    let list = missing.join(", ");
    if env.package_manager.is_none() {
        print_warning(&format!("Missing tools: {} (install them manually)", list));
        return Ok(());
    }

    let prompt = format!(
        "Install missing tools ({}) with {}?",
        list, env.package_manager.name
    );
    if !ui.confirm(&prompt, true)? {
        info!("Dependency install declined: {}", list);
        return Ok(());
    }

    match deps::install_packages(&env.package_manager, &missing, env.is_root, &ctx.log_file) {
        Ok(true) => println!("  {} Installed {}", style("●").green(), list),
        Ok(false) => print_warning(&format!(
            "Could not install {}, see {}",
            list,
            ctx.display(&ctx.log_file)
        )),
        Err(e) => print_warning(&format!("Could not install {}: {:#}", list, e)),
    }
    Ok(())
}

fn check_artifacts(
    ctx: &RuntimeContext,
    env: &Environment,
    artifacts: &[GeneratedArtifact],
) {
    for artifact in artifacts {
        match validate::validate_syntax(&artifact.path, env.shell.shell) {
            SyntaxCheck::Ok | SyntaxCheck::Skipped => {}
            SyntaxCheck::SyntaxError(detail) => {
                print_warning(&format!(
                    "Syntax check failed for {}",
                    ctx.display(&artifact.path)
                ));
                for line in detail.lines() {
                    println!("      {}", style(line).dim());
                }
            }
        }
    }
}

/// The shell changed since the last install: offer to clean the old startup file.
fn leave_previous_startup(
    ctx: &RuntimeContext,
    ui: &mut dyn Prompter,
    old_startup: &Path,
) -> Result<()> {
    let content = match fs::read_to_string(old_startup) {
        Ok(content) => content,
        Err(_) => return Ok(()),
    };
    if !block::has_block(&content) {
        return Ok(());
    }

    let prompt = format!("Remove the sfm block from {}?", ctx.display(old_startup));
    if ui.confirm(&prompt, true)? && block::remove_block(old_startup)? {
        println!(
            "  {} Removed sfm from {}",
            style("●").green(),
            ctx.display(old_startup)
        );
    }
    Ok(())
}

fn print_summary(
    ctx: &RuntimeContext,
    ui: &mut dyn Prompter,
    env: &Environment,
    startup: &Path,
    artifacts: &[GeneratedArtifact],
    outcome: &ReconcileOutcome,
) -> Result<()> {
    let mut body = String::new();
    for artifact in artifacts {
        body.push_str(&format!("Generated: {}\n", ctx.display(&artifact.path)));
    }

    match outcome {
        ReconcileOutcome::Applied { backup, replaced } => {
            body.push_str(&format!(
                "{} {}\n",
                if *replaced { "Updated" } else { "Configured" },
                ctx.display(startup)
            ));
            body.push_str(&format!("Backup: {}\n", ctx.display(backup)));
            body.push_str(&format!(
                "\nReload your shell to use it:\n    {}\n",
                env.shell.shell.reload_command(startup)
            ));
        }
        ReconcileOutcome::Skipped { lines } => {
            body.push_str(&format!("\nAdd these lines to {}:\n", ctx.display(startup)));
            for line in lines {
                body.push_str(&format!("    {}\n", line));
            }
        }
    }

    body.push_str(&format!(
        "\nCustomize: {} {}\n",
        ctx.editor,
        ctx.display(&artifacts[0].path)
    ));
    body.push_str(&format!("Log: {}", ctx.display(&ctx.log_file)));

    info!("Install finished");
    ui.show_message("sfm is installed", &body)
}
