//! Tools the generated functions and aliases call, and installing the missing ones.

use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::OpenOptions;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use crate::defaults;
use crate::platform::PackageManager;
use crate::templates::{self, AliasGroup, BuiltinKey, FunctionKey};
use crate::ui::Spinner;

/// Executables required by the selection, in first-use order without duplicates.
pub fn required_executables(functions: &[FunctionKey], aliases: &[AliasGroup]) -> Vec<&'static str> {
    let keys = functions
        .iter()
        .map(|k| BuiltinKey::Function(*k))
        .chain(aliases.iter().map(|g| BuiltinKey::Aliases(*g)));

    let mut required = Vec::new();
    for key in keys {
        let Some(template) = templates::lookup(key) else {
            continue;
        };
        for exe in template.requires {
            if !required.contains(exe) {
                required.push(*exe);
            }
        }
    }
    required
}

pub fn missing_executables(
    required: &[&'static str],
    probe: impl Fn(&str) -> bool,
) -> Vec<&'static str> {
    required.iter().copied().filter(|exe| !probe(exe)).collect()
}

/// Run the install command, appending its output to the log. Returns whether it succeeded.
pub fn install_packages(
    manager: &PackageManager,
    packages: &[&str],
    as_root: bool,
    log_file: &Path,
) -> Result<bool> {
    let Some(command) = manager.install_command(packages, as_root) else {
        warn!("No package manager available to install {}", packages.join(" "));
        return Ok(false);
    };
    run_logged(&command, &format!("Installing {}", packages.join(", ")), log_file)
}

/// `sh -c command` with stdout and stderr appended to `log_file`, polled while a spinner
/// runs on stderr.
fn run_logged(command: &str, label: &str, log_file: &Path) -> Result<bool> {
    run_logged_with(defaults::SHELL, command, label, log_file)
}

/// A program that cannot be started is a failed install, not an error.
fn run_logged_with(program: &str, command: &str, label: &str, log_file: &Path) -> Result<bool> {
    info!("Running: {}", command);

    let log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open {}", log_file.display()))?;
    let log_err = log
        .try_clone()
        .with_context(|| format!("Failed to open {}", log_file.display()))?;

    let spawned = Command::new(program)
        .args([defaults::SHELL_CMD_FLAG, command])
        .stdin(Stdio::inherit())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_err))
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            warn!("Failed to start {}: {}", program, e);
            return Ok(false);
        }
    };

    let mut spinner = Spinner::new();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                spinner.tick(label);
                thread::sleep(Duration::from_millis(defaults::INSTALL_POLL_INTERVAL_MS));
            }
            Err(e) => {
                spinner.finish();
                return Err(e).context("Failed to wait for install command");
            }
        }
    };
    spinner.finish();

    if status.success() {
        info!("Install command finished");
    } else {
        warn!("Install command exited with {}", status);
    }
    Ok(status.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_executables() {
        let required = required_executables(
            &[FunctionKey::Extract, FunctionKey::Mkcd, FunctionKey::Myip],
            &[AliasGroup::Git, AliasGroup::Navigation],
        );
        assert_eq!(required, vec!["tar", "unzip", "curl", "git"]);
        assert!(required_executables(&[FunctionKey::Mkcd], &[]).is_empty());
    }

    #[test]
    fn test_missing_executables() {
        let present = |exe: &str| exe == "tar";
        assert_eq!(
            missing_executables(&["tar", "unzip", "curl"], present),
            vec!["unzip", "curl"]
        );
    }

    #[test]
    fn test_no_manager_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("setup.log");
        assert!(!install_packages(&PackageManager::NONE, &["curl"], false, &log).unwrap());
    }

    #[test]
    fn test_run_logged_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("setup.log");

        assert!(run_logged("echo fetched; echo warned >&2", "Installing", &log).unwrap());
        assert!(!run_logged("exit 3", "Installing", &log).unwrap());

        let content = std::fs::read_to_string(&log).unwrap();
        assert!(content.contains("fetched"));
        assert!(content.contains("warned"));
    }

    #[test]
    fn test_unstartable_installer_is_a_failed_install() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("setup.log");
        assert!(!run_logged_with("sfm-no-such-shell", "true", "Installing", &log).unwrap());
    }
}
