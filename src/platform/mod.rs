//! Environment probing: shell, package manager, distribution and executables.
//!
//! Nothing in here mutates state; every probe can be repeated freely.

mod distro;
mod shell;

pub use distro::{Distro, DistroInfo};
pub use shell::{DetectedShell, Shell, ShellFamily, detect_shell};

use log::{debug, warn};

use crate::defaults::{PACKAGE_MANAGERS, PackageManagerCandidate};

/// Check whether an executable is reachable through `$PATH`.
pub fn has_executable(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Whether the current process runs as root.
#[cfg(unix)]
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}

/// Detected package manager and its install command prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageManager {
    pub name: &'static str,
    pub install_cmd: &'static str,
}

impl PackageManager {
    /// Sentinel for "no supported package manager found".
    pub const NONE: PackageManager = PackageManager {
        name: "none",
        install_cmd: "",
    };

    pub fn is_none(&self) -> bool {
        self.install_cmd.is_empty()
    }

    /// Full install command for `packages`, without `sudo` when already root.
    pub fn install_command(&self, packages: &[&str], as_root: bool) -> Option<String> {
        if self.is_none() || packages.is_empty() {
            return None;
        }

        let prefix = if as_root {
            self.install_cmd
                .strip_prefix(crate::defaults::SUDO_PREFIX)
                .unwrap_or(self.install_cmd)
        } else {
            self.install_cmd
        };
        Some(format!("{} {}", prefix, packages.join(" ")))
    }
}

impl From<&PackageManagerCandidate> for PackageManager {
    fn from(candidate: &PackageManagerCandidate) -> Self {
        Self {
            name: candidate.name,
            install_cmd: candidate.install_cmd,
        }
    }
}

/// Detect the package manager by priority order, not by detection order.
pub fn detect_package_manager() -> PackageManager {
    detect_package_manager_with(has_executable)
}

pub fn detect_package_manager_with(probe: impl Fn(&str) -> bool) -> PackageManager {
    match PACKAGE_MANAGERS.iter().find(|c| probe(c.executable)) {
        Some(candidate) => {
            debug!("Detected package manager: {}", candidate.name);
            candidate.into()
        }
        None => {
            warn!("No supported package manager found; dependency installation disabled");
            PackageManager::NONE
        }
    }
}

/// Everything sfm learns about the machine before asking questions.
#[derive(Debug, Clone)]
pub struct Environment {
    pub distro: DistroInfo,
    pub shell: DetectedShell,
    pub package_manager: PackageManager,
    pub is_root: bool,
}

impl Environment {
    pub fn detect(shell_override: Option<&str>) -> Self {
        Self {
            distro: DistroInfo::detect(),
            shell: detect_shell(shell_override),
            package_manager: detect_package_manager(),
            is_root: is_root(),
        }
    }

    pub fn family(&self) -> ShellFamily {
        self.shell.shell.family()
    }
}
