//! Centralized default values for package managers, file layout and markers.
//!
//! Edit these tables to add new package managers or change where sfm writes its files.
//! Marker lines must never change: rollback relies on them across versions.

/// A package manager candidate probed during environment detection.
pub struct PackageManagerCandidate {
    /// Manager name shown to the user (e.g., "apt", "pacman")
    pub name: &'static str,
    /// Executable whose presence on PATH identifies the manager
    pub executable: &'static str,
    /// Install command prefix; package names are appended space-separated.
    pub install_cmd: &'static str,
}

/// Known package managers in priority order. Detection returns the first entry whose
/// executable exists, regardless of how many are installed.
pub const PACKAGE_MANAGERS: &[PackageManagerCandidate] = &[
    PackageManagerCandidate {
        name: "apt",
        executable: "apt-get",
        install_cmd: "sudo apt-get install -y",
    },
    PackageManagerCandidate {
        name: "dnf",
        executable: "dnf",
        install_cmd: "sudo dnf install -y",
    },
    PackageManagerCandidate {
        name: "yum",
        executable: "yum",
        install_cmd: "sudo yum install -y",
    },
    PackageManagerCandidate {
        name: "pacman",
        executable: "pacman",
        install_cmd: "sudo pacman -S --noconfirm --needed",
    },
    PackageManagerCandidate {
        name: "zypper",
        executable: "zypper",
        install_cmd: "sudo zypper install -y",
    },
    PackageManagerCandidate {
        name: "apk",
        executable: "apk",
        install_cmd: "sudo apk add",
    },
    PackageManagerCandidate {
        name: "xbps",
        executable: "xbps-install",
        install_cmd: "sudo xbps-install -y",
    },
    PackageManagerCandidate {
        name: "portage",
        executable: "emerge",
        install_cmd: "sudo emerge",
    },
    PackageManagerCandidate {
        name: "homebrew",
        executable: "brew",
        install_cmd: "brew install",
    },
];

/// Managed block delimiters in the shell startup file.
pub const BLOCK_BEGIN: &str = "# >>> sfm managed block >>>";
pub const BLOCK_END: &str = "# <<< sfm managed block <<<";

/// Backup snapshot naming: `<startup_file>.sfm-backup-<timestamp>[-<n>]`
pub const BACKUP_INFIX: &str = ".sfm-backup-";
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S-%3f";

/// State directory layout, relative to the home directory
pub const STATE_DIR_NAME: &str = ".sfm";
pub const FUNCTIONS_STEM: &str = "functions";
pub const ALIASES_STEM: &str = "aliases";
pub const INSTALL_CONFIG_FILE: &str = "config";
pub const LOG_FILE: &str = "setup.log";

/// Log line timestamp
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of log lines offered after a fatal error
pub const LOG_TAIL_LINES: usize = 20;

/// Shell execution
pub const SHELL: &str = "sh";
pub const SHELL_CMD_FLAG: &str = "-c";

/// Privilege escalation prefix stripped from install commands when running as root
pub const SUDO_PREFIX: &str = "sudo ";

/// Interval between liveness checks of the package install subprocess
pub const INSTALL_POLL_INTERVAL_MS: u64 = 100;

/// Editor shown in the closing summary when `$EDITOR` is unset
pub const DEFAULT_EDITOR: &str = "vim";
