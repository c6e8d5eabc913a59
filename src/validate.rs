//! Advisory syntax check of generated files with the target shell's parser.

use log::{info, warn};
use std::path::Path;
use std::process::Command;

use crate::platform::{Shell, has_executable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxCheck {
    Ok,
    /// No checker available for this shell
    Skipped,
    SyntaxError(String),
}

/// Binary used to parse files for `shell`, if any.
///
/// zsh files are close enough to bash for `bash -n` to catch the usual mistakes when zsh
/// itself is not installed. fish is not checked.
fn checker_for(shell: Shell, probe: impl Fn(&str) -> bool) -> Option<&'static str> {
    match shell {
        Shell::Bash => probe("bash").then_some("bash"),
        Shell::Zsh if probe("zsh") => Some("zsh"),
        Shell::Zsh => probe("bash").then_some("bash"),
        Shell::Fish => None,
    }
}

/// Parse `path` with the shell's checker. Never fails: a checker that cannot be started
/// counts as no checker.
pub fn validate_syntax(path: &Path, shell: Shell) -> SyntaxCheck {
    if shell == Shell::Fish {
        return SyntaxCheck::Ok;
    }

    let Some(checker) = checker_for(shell, has_executable) else {
        warn!("No syntax checker for {}, skipping {}", shell, path.display());
        return SyntaxCheck::Skipped;
    };
    run_checker(checker, path)
}

fn run_checker(checker: &str, path: &Path) -> SyntaxCheck {
    let output = match Command::new(checker).arg("-n").arg(path).output() {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to run {} -n {}: {}", checker, path.display(), e);
            return SyntaxCheck::Skipped;
        }
    };

    if output.status.success() {
        info!("{} -n {}: ok", checker, path.display());
        SyntaxCheck::Ok
    } else {
        let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("{} -n {} failed: {}", checker, path.display(), detail);
        SyntaxCheck::SyntaxError(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_selection() {
        let all = |_: &str| true;
        let only_bash = |name: &str| name == "bash";
        let none = |_: &str| false;

        assert_eq!(checker_for(Shell::Bash, all), Some("bash"));
        assert_eq!(checker_for(Shell::Zsh, all), Some("zsh"));
        assert_eq!(checker_for(Shell::Zsh, only_bash), Some("bash"));
        assert_eq!(checker_for(Shell::Zsh, none), None);
        assert_eq!(checker_for(Shell::Fish, all), None);
    }

    #[test]
    fn test_fish_is_always_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("functions.fish");
        std::fs::write(&path, "function broken\n").unwrap();
        assert_eq!(validate_syntax(&path, Shell::Fish), SyntaxCheck::Ok);
    }

    #[test]
    fn test_bash_check() {
        if !has_executable("bash") {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.sh");
        let bad = dir.path().join("bad.sh");
        std::fs::write(&good, "mkcd() {\n    mkdir -p \"$1\" && cd \"$1\"\n}\n").unwrap();
        std::fs::write(&bad, "mkcd() {\n    if then\n").unwrap();

        assert_eq!(validate_syntax(&good, Shell::Bash), SyntaxCheck::Ok);
        assert!(matches!(
            validate_syntax(&bad, Shell::Bash),
            SyntaxCheck::SyntaxError(_)
        ));
    }

    #[test]
    fn test_checker_that_cannot_start_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("functions.sh");
        std::fs::write(&path, "mkcd() { :; }\n").unwrap();
        assert_eq!(
            run_checker("sfm-no-such-checker", &path),
            SyntaxCheck::Skipped
        );
    }
}
