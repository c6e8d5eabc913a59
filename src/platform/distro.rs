//! Linux distribution detection

use std::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distro {
    Debian,   // Debian, Ubuntu, Mint, Pop!_OS, etc.
    Fedora,   // Fedora, RHEL, CentOS, Rocky, Alma
    Arch,     // Arch, Manjaro, EndeavourOS
    OpenSUSE, // openSUSE Leap/Tumbleweed
    Alpine,   // Alpine Linux
    Void,     // Void Linux
    NixOS,    // NixOS
    Gentoo,   // Gentoo
    Unknown,
}

impl Distro {
    pub fn family_name(self) -> &'static str {
        match self {
            Distro::Debian => "debian",
            Distro::Fedora => "fedora",
            Distro::Arch => "arch",
            Distro::OpenSUSE => "opensuse",
            Distro::Alpine => "alpine",
            Distro::Void => "void",
            Distro::NixOS => "nixos",
            Distro::Gentoo => "gentoo",
            Distro::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistroInfo {
    pub distro: Distro,
    /// `PRETTY_NAME` from os-release, falling back to the OS name
    pub pretty_name: String,
}

impl DistroInfo {
    pub fn detect() -> Self {
        // /etc/os-release is the most reliable source, /usr/lib/os-release the fallback
        for path in ["/etc/os-release", "/usr/lib/os-release"] {
            if let Ok(content) = fs::read_to_string(path) {
                return parse_os_release(&content);
            }
        }

        Self {
            distro: Distro::Unknown,
            pretty_name: std::env::consts::OS.to_string(),
        }
    }
}

fn os_release_value<'a>(content: &'a str, key: &str) -> Option<&'a str> {
    content
        .lines()
        .find_map(|l| l.strip_prefix(key)?.strip_prefix('='))
        .map(|v| v.trim().trim_matches('"').trim_matches('\''))
}

pub fn parse_os_release(content: &str) -> DistroInfo {
    let id = os_release_value(content, "ID").map(str::to_lowercase);
    let id_like = os_release_value(content, "ID_LIKE").map(str::to_lowercase);
    let pretty_name = os_release_value(content, "PRETTY_NAME")
        .or_else(|| os_release_value(content, "NAME"))
        .unwrap_or("Linux")
        .to_string();

    DistroInfo {
        distro: classify(id.as_deref(), id_like.as_deref()),
        pretty_name,
    }
}

fn classify(id: Option<&str>, id_like: Option<&str>) -> Distro {
    let Some(id) = id else {
        return Distro::Unknown;
    };

    match id {
        "debian" | "ubuntu" | "linuxmint" | "pop" | "elementary" | "zorin" | "kali" => {
            return Distro::Debian;
        }
        "fedora" | "rhel" | "centos" | "rocky" | "almalinux" => return Distro::Fedora,
        "arch" | "manjaro" | "endeavouros" | "garuda" => return Distro::Arch,
        "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" | "sles" => {
            return Distro::OpenSUSE;
        }
        "alpine" => return Distro::Alpine,
        "void" => return Distro::Void,
        "nixos" => return Distro::NixOS,
        "gentoo" => return Distro::Gentoo,
        _ => {}
    }

    // Derivatives only carry the parent in ID_LIKE
    if let Some(like) = id_like {
        if like.contains("debian") || like.contains("ubuntu") {
            return Distro::Debian;
        }
        if like.contains("fedora") || like.contains("rhel") {
            return Distro::Fedora;
        }
        if like.contains("arch") {
            return Distro::Arch;
        }
        if like.contains("suse") {
            return Distro::OpenSUSE;
        }
    }

    Distro::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_os_release_ubuntu() {
        let content = "NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\nPRETTY_NAME=\"Ubuntu 24.04.1 LTS\"\n";
        let info = parse_os_release(content);
        assert_eq!(info.distro, Distro::Debian);
        assert_eq!(info.pretty_name, "Ubuntu 24.04.1 LTS");
    }

    #[test]
    fn test_parse_os_release_derivative_via_id_like() {
        let content = "ID=cachyos\nID_LIKE=\"arch\"\nNAME=\"CachyOS Linux\"\n";
        let info = parse_os_release(content);
        assert_eq!(info.distro, Distro::Arch);
        assert_eq!(info.pretty_name, "CachyOS Linux");
    }

    #[test]
    fn test_parse_os_release_ignores_prefixed_keys() {
        // VERSION_ID must not be mistaken for ID
        let content = "VERSION_ID=\"40\"\nID=fedora\n";
        assert_eq!(parse_os_release(content).distro, Distro::Fedora);
    }

    #[test]
    fn test_parse_os_release_unknown() {
        let info = parse_os_release("");
        assert_eq!(info.distro, Distro::Unknown);
        assert_eq!(info.pretty_name, "Linux");
    }
}
