use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::templates::{AliasGroup, FunctionKey};
use crate::ui::UiKind;

/// User preferences from `<config_dir>/sfm/settings.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Preferred interface: auto, rich, whiptail or plain
    #[serde(default)]
    pub ui: UiKind,

    /// Functions pre-checked on a fresh install
    #[serde(default = "default_functions")]
    pub default_functions: Vec<String>,

    /// Alias groups pre-checked on a fresh install
    #[serde(default = "default_aliases")]
    pub default_aliases: Vec<String>,

    /// Offer to install missing tools the selected features call
    #[serde(default = "default_true")]
    pub install_dependencies: bool,

    /// Run the shell's own syntax check on generated files
    #[serde(default = "default_true")]
    pub syntax_check: bool,
}

fn default_true() -> bool {
    true
}

fn default_functions() -> Vec<String> {
    FunctionKey::ALL.iter().map(|k| k.as_str().to_string()).collect()
}

fn default_aliases() -> Vec<String> {
    AliasGroup::ALL.iter().map(|g| g.as_str().to_string()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ui: UiKind::Auto,
            default_functions: default_functions(),
            default_aliases: default_aliases(),
            install_dependencies: true,
            syntax_check: true,
        }
    }
}

/// Parse known keys, skipping (and warning about) the rest.
fn parse_keys<T: FromStr>(names: &[String], what: &str) -> Vec<T> {
    names
        .iter()
        .filter_map(|name| match name.parse() {
            Ok(key) => Some(key),
            Err(_) => {
                warn!("Ignoring unknown {} '{}' in settings", what, name);
                None
            }
        })
        .collect()
}

impl Settings {
    pub fn function_defaults(&self) -> Vec<FunctionKey> {
        parse_keys(&self.default_functions, "function")
    }

    pub fn alias_defaults(&self) -> Vec<AliasGroup> {
        parse_keys(&self.default_aliases, "alias group")
    }

    /// Load settings from the user config directory, writing defaults on first use.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let settings: Settings = toml::from_str(&content)
                .with_context(|| format!("Invalid settings in {}", path.display()))?;
            Ok(settings)
        } else {
            let settings = Settings::default();
            settings.save_to(path)?;
            Ok(settings)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn settings_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join("sfm").join("settings.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sfm").join("settings.toml");

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "ui = \"plain\"\nsyntax_check = false\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.ui, UiKind::Plain);
        assert!(!settings.syntax_check);
        assert!(settings.install_dependencies);
        assert_eq!(settings.function_defaults(), FunctionKey::ALL.to_vec());
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let settings = Settings {
            default_functions: vec!["mkcd".into(), "teleport".into()],
            default_aliases: vec!["git".into(), "ls-variants".into()],
            ..Settings::default()
        };
        assert_eq!(settings.function_defaults(), vec![FunctionKey::Mkcd]);
        assert_eq!(
            settings.alias_defaults(),
            vec![AliasGroup::Git, AliasGroup::LsVariants]
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "ui = [").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
