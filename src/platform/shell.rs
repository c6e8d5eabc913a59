//! Shell identification and per-shell file locations

use log::warn;
use std::fmt;
use std::path::{Path, PathBuf};

/// Config syntax dialect shared by a group of shells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellFamily {
    /// bash and zsh
    PosixLike,
    /// fish
    StructuredScript,
}

impl ShellFamily {
    pub const ALL: [ShellFamily; 2] = [ShellFamily::PosixLike, ShellFamily::StructuredScript];

    /// File extension of generated artifacts
    pub fn extension(self) -> &'static str {
        match self {
            ShellFamily::PosixLike => "sh",
            ShellFamily::StructuredScript => "fish",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShellFamily::PosixLike => "posix",
            ShellFamily::StructuredScript => "fish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    /// Parse a shell name or path (`zsh`, `/usr/bin/zsh`, `-bash`).
    pub fn from_name(raw: &str) -> Option<Self> {
        let name = Path::new(raw.trim())
            .file_name()
            .and_then(|n| n.to_str())?
            .trim_start_matches('-')
            .to_lowercase();

        match name.as_str() {
            "bash" => Some(Shell::Bash),
            "zsh" => Some(Shell::Zsh),
            "fish" => Some(Shell::Fish),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
        }
    }

    pub fn family(self) -> ShellFamily {
        match self {
            Shell::Bash | Shell::Zsh => ShellFamily::PosixLike,
            Shell::Fish => ShellFamily::StructuredScript,
        }
    }

    /// Startup file sfm wires its managed block into.
    pub fn startup_file(self, home: &Path) -> PathBuf {
        match self {
            Shell::Bash => home.join(".bashrc"),
            Shell::Zsh => home.join(".zshrc"),
            Shell::Fish => home.join(".config").join("fish").join("config.fish"),
        }
    }

    /// Command the user runs to pick up changes in the current session.
    pub fn reload_command(self, startup_file: &Path) -> String {
        match self {
            Shell::Bash | Shell::Fish => format!("source {}", startup_file.display()),
            Shell::Zsh => "exec zsh".to_string(),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of shell detection. `unrecognized` holds the raw value when detection fell back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedShell {
    pub shell: Shell,
    pub unrecognized: Option<String>,
}

/// Detect the target shell from an explicit override or `$SHELL`.
pub fn detect_shell(override_name: Option<&str>) -> DetectedShell {
    let env_shell = std::env::var("SHELL").ok();
    detect_shell_from(override_name, env_shell.as_deref())
}

/// Unknown values never fail the run: they fall back to bash with a warning.
pub fn detect_shell_from(override_name: Option<&str>, env_shell: Option<&str>) -> DetectedShell {
    let (raw, origin) = match override_name {
        Some(name) => (name, "--shell"),
        None => (env_shell.unwrap_or(""), "$SHELL"),
    };

    match Shell::from_name(raw) {
        Some(shell) => DetectedShell {
            shell,
            unrecognized: None,
        },
        None => {
            warn!(
                "Unrecognized shell '{}' from {}, falling back to {}",
                raw,
                origin,
                Shell::Bash
            );
            DetectedShell {
                shell: Shell::Bash,
                unrecognized: Some(raw.to_string()),
            }
        }
    }
}
