//! Template registry for the built-in functions and alias groups.
//!
//! Every built-in key has exactly one entry carrying both the POSIX-like body (bash, zsh)
//! and the fish body. A key is only offered for selection through [`FunctionKey::ALL`] and
//! [`AliasGroup::ALL`], and the registry test enumerates both lists, so a key without a
//! registry entry cannot ship unnoticed.

use std::fmt;
use std::str::FromStr;

use crate::platform::ShellFamily;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKey {
    Extract,
    Mkcd,
    Psgrep,
    Backup,
    Myip,
    Portcheck,
}

impl FunctionKey {
    pub const ALL: [FunctionKey; 6] = [
        FunctionKey::Extract,
        FunctionKey::Mkcd,
        FunctionKey::Psgrep,
        FunctionKey::Backup,
        FunctionKey::Myip,
        FunctionKey::Portcheck,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FunctionKey::Extract => "extract",
            FunctionKey::Mkcd => "mkcd",
            FunctionKey::Psgrep => "psgrep",
            FunctionKey::Backup => "backup",
            FunctionKey::Myip => "myip",
            FunctionKey::Portcheck => "portcheck",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AliasGroup {
    Navigation,
    Safety,
    LsVariants,
    Git,
    SystemMonitoring,
    Network,
}

impl AliasGroup {
    pub const ALL: [AliasGroup; 6] = [
        AliasGroup::Navigation,
        AliasGroup::Safety,
        AliasGroup::LsVariants,
        AliasGroup::Git,
        AliasGroup::SystemMonitoring,
        AliasGroup::Network,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AliasGroup::Navigation => "navigation",
            AliasGroup::Safety => "safety",
            AliasGroup::LsVariants => "ls-variants",
            AliasGroup::Git => "git",
            AliasGroup::SystemMonitoring => "system-monitoring",
            AliasGroup::Network => "network",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature '{0}'")]
pub struct UnknownFeature(pub String);

impl FromStr for FunctionKey {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

impl FromStr for AliasGroup {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AliasGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry key: one built-in function or one alias group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKey {
    Function(FunctionKey),
    Aliases(AliasGroup),
}

impl fmt::Display for BuiltinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltinKey::Function(k) => write!(f, "function '{}'", k),
            BuiltinKey::Aliases(g) => write!(f, "alias group '{}'", g),
        }
    }
}

pub struct Template {
    pub key: BuiltinKey,
    /// One-line description, shown in selection lists and fish `--description`
    pub description: &'static str,
    /// Executables the generated code calls that may be missing on a fresh system
    pub requires: &'static [&'static str],
    posix: &'static str,
    fish: &'static str,
}

impl Template {
    pub fn body(&self, family: ShellFamily) -> &'static str {
        match family {
            ShellFamily::PosixLike => self.posix,
            ShellFamily::StructuredScript => self.fish,
        }
    }
}

/// Look up the registry entry for a key.
pub fn lookup(key: BuiltinKey) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.key == key)
}

/// Short description for selection lists; empty when the key is unregistered.
pub fn describe(key: BuiltinKey) -> &'static str {
    lookup(key).map(|t| t.description).unwrap_or("")
}

const TEMPLATES: &[Template] = &[
    // Functions
    Template {
        key: BuiltinKey::Function(FunctionKey::Extract),
        description: "Extract any common archive format by file extension",
        requires: &["tar", "unzip"],
        posix: r#"# Extract any common archive format by file extension
extract() {
    if [ -z "$1" ]; then
        echo "usage: extract <archive>" >&2
        return 1
    fi
    if [ ! -f "$1" ]; then
        echo "extract: '$1' is not a file" >&2
        return 1
    fi
    case "$1" in
        *.tar.bz2|*.tbz2) tar xjf "$1" ;;
        *.tar.gz|*.tgz)   tar xzf "$1" ;;
        *.tar.xz|*.txz)   tar xJf "$1" ;;
        *.tar.zst)        tar --zstd -xf "$1" ;;
        *.tar)            tar xf "$1" ;;
        *.bz2)            bunzip2 "$1" ;;
        *.gz)             gunzip "$1" ;;
        *.xz)             unxz "$1" ;;
        *.zip)            unzip "$1" ;;
        *.rar)            unrar x "$1" ;;
        *.7z)             7z x "$1" ;;
        *.Z)              uncompress "$1" ;;
        *)
            echo "extract: unsupported archive '$1'" >&2
            return 1
            ;;
    esac
}
"#,
        fish: r#"function extract --description 'Extract any common archive format by file extension'
    if test (count $argv) -eq 0
        echo "usage: extract <archive>" >&2
        return 1
    end
    if not test -f $argv[1]
        echo "extract: '$argv[1]' is not a file" >&2
        return 1
    end
    switch $argv[1]
        case '*.tar.bz2' '*.tbz2'
            tar xjf $argv[1]
        case '*.tar.gz' '*.tgz'
            tar xzf $argv[1]
        case '*.tar.xz' '*.txz'
            tar xJf $argv[1]
        case '*.tar.zst'
            tar --zstd -xf $argv[1]
        case '*.tar'
            tar xf $argv[1]
        case '*.bz2'
            bunzip2 $argv[1]
        case '*.gz'
            gunzip $argv[1]
        case '*.xz'
            unxz $argv[1]
        case '*.zip'
            unzip $argv[1]
        case '*.rar'
            unrar x $argv[1]
        case '*.7z'
            7z x $argv[1]
        case '*.Z'
            uncompress $argv[1]
        case '*'
            echo "extract: unsupported archive '$argv[1]'" >&2
            return 1
    end
end
"#,
    },
    Template {
        key: BuiltinKey::Function(FunctionKey::Mkcd),
        description: "Create a directory (with parents) and cd into it",
        requires: &[],
        posix: r#"# Create a directory (with parents) and cd into it
mkcd() {
    if [ -z "$1" ]; then
        echo "usage: mkcd <dir>" >&2
        return 1
    fi
    mkdir -p -- "$1" && cd -- "$1"
}
"#,
        fish: r#"function mkcd --description 'Create a directory (with parents) and cd into it'
    if test (count $argv) -eq 0
        echo "usage: mkcd <dir>" >&2
        return 1
    end
    mkdir -p -- $argv[1]; and cd $argv[1]
end
"#,
    },
    Template {
        key: BuiltinKey::Function(FunctionKey::Psgrep),
        description: "Search running processes by name",
        requires: &[],
        posix: r#"# Search running processes by name
psgrep() {
    if [ -z "$1" ]; then
        echo "usage: psgrep <pattern>" >&2
        return 1
    fi
    ps aux | grep -i -- "$1" | grep -v grep
}
"#,
        fish: r#"function psgrep --description 'Search running processes by name'
    if test (count $argv) -eq 0
        echo "usage: psgrep <pattern>" >&2
        return 1
    end
    ps aux | grep -i -- $argv[1] | grep -v grep
end
"#,
    },
    Template {
        key: BuiltinKey::Function(FunctionKey::Backup),
        description: "Copy a file or directory to a timestamped .bak",
        requires: &[],
        posix: r#"# Copy a file or directory to a timestamped .bak
backup() {
    if [ -z "$1" ]; then
        echo "usage: backup <path>" >&2
        return 1
    fi
    cp -a -- "$1" "$1.bak.$(date +%Y%m%d-%H%M%S)"
}
"#,
        fish: r#"function backup --description 'Copy a file or directory to a timestamped .bak'
    if test (count $argv) -eq 0
        echo "usage: backup <path>" >&2
        return 1
    end
    cp -a -- $argv[1] $argv[1].bak.(date +%Y%m%d-%H%M%S)
end
"#,
    },
    Template {
        key: BuiltinKey::Function(FunctionKey::Myip),
        description: "Show public and local IP addresses",
        requires: &["curl"],
        posix: r#"# Show public and local IP addresses
myip() {
    printf 'public: %s\n' "$(curl -fsS --max-time 5 https://ifconfig.me 2>/dev/null || echo unavailable)"
    if command -v ip >/dev/null 2>&1; then
        printf 'local:  %s\n' "$(ip -4 -o addr show scope global | awk '{print $4}' | cut -d/ -f1 | tr '\n' ' ')"
    fi
}
"#,
        fish: r#"function myip --description 'Show public and local IP addresses'
    set -l public (curl -fsS --max-time 5 https://ifconfig.me 2>/dev/null; or echo unavailable)
    printf 'public: %s\n' $public
    if command -q ip
        printf 'local:  %s\n' (string join ' ' (ip -4 -o addr show scope global | awk '{print $4}' | cut -d/ -f1))
    end
end
"#,
    },
    Template {
        key: BuiltinKey::Function(FunctionKey::Portcheck),
        description: "Show which process listens on a port",
        requires: &[],
        posix: r#"# Show which process listens on a port
portcheck() {
    if [ -z "$1" ]; then
        echo "usage: portcheck <port>" >&2
        return 1
    fi
    if command -v ss >/dev/null 2>&1; then
        ss -tulpn 2>/dev/null | grep -E ":$1([^0-9]|$)" || echo "nothing listening on port $1"
    elif command -v lsof >/dev/null 2>&1; then
        lsof -nP -i ":$1" || echo "nothing listening on port $1"
    else
        echo "portcheck: neither ss nor lsof is installed" >&2
        return 1
    fi
}
"#,
        fish: r#"function portcheck --description 'Show which process listens on a port'
    if test (count $argv) -eq 0
        echo "usage: portcheck <port>" >&2
        return 1
    end
    if command -q ss
        ss -tulpn 2>/dev/null | grep -E ":$argv[1]([^0-9]|\$)"; or echo "nothing listening on port $argv[1]"
    else if command -q lsof
        lsof -nP -i ":$argv[1]"; or echo "nothing listening on port $argv[1]"
    else
        echo "portcheck: neither ss nor lsof is installed" >&2
        return 1
    end
end
"#,
    },
    // Alias groups
    Template {
        key: BuiltinKey::Aliases(AliasGroup::Navigation),
        description: "Quick parent-directory hops (.., ..., ....)",
        requires: &[],
        posix: r#"# Navigation
alias ..='cd ..'
alias ...='cd ../..'
alias ....='cd ../../..'
alias .....='cd ../../../..'
"#,
        fish: r#"# Navigation
alias .. 'cd ..'
alias ... 'cd ../..'
alias .... 'cd ../../..'
alias ..... 'cd ../../../..'
"#,
    },
    Template {
        key: BuiltinKey::Aliases(AliasGroup::Safety),
        description: "Ask before overwriting or deleting (rm, cp, mv, ln)",
        requires: &[],
        posix: r#"# Safety
alias rm='rm -i'
alias cp='cp -i'
alias mv='mv -i'
alias ln='ln -i'
"#,
        fish: r#"# Safety
alias rm 'rm -i'
alias cp 'cp -i'
alias mv 'mv -i'
alias ln 'ln -i'
"#,
    },
    Template {
        key: BuiltinKey::Aliases(AliasGroup::LsVariants),
        description: "Common ls shortcuts (ll, la, l, lt)",
        requires: &[],
        posix: r#"# ls variants
alias ll='ls -alF'
alias la='ls -A'
alias l='ls -CF'
alias lt='ls -ltrh'
"#,
        fish: r#"# ls variants
alias ll 'ls -alF'
alias la 'ls -A'
alias l 'ls -CF'
alias lt 'ls -ltrh'
"#,
    },
    Template {
        key: BuiltinKey::Aliases(AliasGroup::Git),
        description: "Short git commands (gs, ga, gc, gp, gl, gd, gco, gb)",
        requires: &["git"],
        posix: r#"# Git
alias gs='git status'
alias ga='git add'
alias gc='git commit'
alias gp='git push'
alias gl='git log --oneline --graph --decorate'
alias gd='git diff'
alias gco='git checkout'
alias gb='git branch'
"#,
        fish: r#"# Git
alias gs 'git status'
alias ga 'git add'
alias gc 'git commit'
alias gp 'git push'
alias gl 'git log --oneline --graph --decorate'
alias gd 'git diff'
alias gco 'git checkout'
alias gb 'git branch'
"#,
    },
    Template {
        key: BuiltinKey::Aliases(AliasGroup::SystemMonitoring),
        description: "Human-readable disk and memory usage, top processes",
        requires: &[],
        posix: r#"# System monitoring
alias df='df -h'
alias du1='du -h --max-depth=1'
alias free='free -h'
alias psmem='ps aux --sort=-%mem | head -n 11'
alias pscpu='ps aux --sort=-%cpu | head -n 11'
"#,
        fish: r#"# System monitoring
alias df 'df -h'
alias du1 'du -h --max-depth=1'
alias free 'free -h'
alias psmem 'ps aux --sort=-%mem | head -n 11'
alias pscpu 'ps aux --sort=-%cpu | head -n 11'
"#,
    },
    Template {
        key: BuiltinKey::Aliases(AliasGroup::Network),
        description: "Listening ports, quick ping, local addresses",
        requires: &[],
        posix: r#"# Network
alias ports='ss -tulpn'
alias listening='ss -ltn'
alias ping5='ping -c 5'
alias localip='hostname -I'
"#,
        fish: r#"# Network
alias ports 'ss -tulpn'
alias listening 'ss -ltn'
alias ping5 'ping -c 5'
alias localip 'hostname -I'
"#,
    },
];
