//! Record of the last successful install, `key=value` per line.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, Timelike};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

use crate::platform::{Shell, ShellFamily};
use crate::templates::{AliasGroup, FunctionKey};
use crate::utils;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstallConfigError {
    #[error("install record is missing '{0}'")]
    MissingKey(&'static str),

    #[error("install record has an invalid {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallConfig {
    pub shell: Shell,
    pub family: ShellFamily,
    pub functions_file: PathBuf,
    pub aliases_file: PathBuf,
    pub startup_file: PathBuf,
    pub install_date: NaiveDateTime,
    /// Built-in functions selected last time, pre-checked on update
    pub functions: Vec<FunctionKey>,
    pub aliases: Vec<AliasGroup>,
}

fn join_keys<T: std::fmt::Display>(keys: &[T]) -> String {
    keys.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn split_keys<T: std::str::FromStr>(value: Option<&str>) -> Vec<T> {
    value
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse() {
            Ok(key) => Some(key),
            Err(_) => {
                warn!("Ignoring unknown feature '{}' in install record", s);
                None
            }
        })
        .collect()
}

impl InstallConfig {
    /// Record for an install happening now.
    pub fn now(
        shell: Shell,
        startup_file: &Path,
        functions_file: &Path,
        aliases_file: &Path,
        functions: Vec<FunctionKey>,
        aliases: Vec<AliasGroup>,
    ) -> Self {
        let now = Local::now().naive_local();
        Self {
            shell,
            family: shell.family(),
            functions_file: functions_file.to_path_buf(),
            aliases_file: aliases_file.to_path_buf(),
            startup_file: startup_file.to_path_buf(),
            // Second precision so the record survives a write/read cycle unchanged
            install_date: now.with_nanosecond(0).unwrap_or(now),
            functions,
            aliases,
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::from("# sfm install record\n");
        let mut put = |key: &str, value: &str| {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        };
        put("shell", self.shell.name());
        put("family", self.family.as_str());
        put("functions_file", &self.functions_file.display().to_string());
        put("aliases_file", &self.aliases_file.display().to_string());
        put("startup_file", &self.startup_file.display().to_string());
        put("install_date", &self.install_date.format(DATE_FORMAT).to_string());
        put("functions", &join_keys(&self.functions));
        put("aliases", &join_keys(&self.aliases));
        out
    }

    pub fn parse(text: &str) -> Result<Self, InstallConfigError> {
        let entries: Vec<(&str, &str)> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| l.split_once('='))
            .map(|(k, v)| (k.trim(), v.trim()))
            .collect();
        // Last assignment wins, like sourcing the file would
        let get = |key: &str| entries.iter().rev().find(|(k, _)| *k == key).map(|(_, v)| *v);
        let require = |key: &'static str| get(key).ok_or(InstallConfigError::MissingKey(key));

        let shell_name = require("shell")?;
        let shell = Shell::from_name(shell_name).ok_or_else(|| InstallConfigError::InvalidValue {
            key: "shell",
            value: shell_name.to_string(),
        })?;

        let family = match get("family") {
            Some(value) => ShellFamily::ALL
                .into_iter()
                .find(|f| f.as_str() == value)
                .ok_or_else(|| InstallConfigError::InvalidValue {
                    key: "family",
                    value: value.to_string(),
                })?,
            None => shell.family(),
        };

        let date = require("install_date")?;
        let install_date = NaiveDateTime::parse_from_str(date, DATE_FORMAT).map_err(|_| {
            InstallConfigError::InvalidValue {
                key: "install_date",
                value: date.to_string(),
            }
        })?;

        Ok(Self {
            shell,
            family,
            functions_file: PathBuf::from(require("functions_file")?),
            aliases_file: PathBuf::from(require("aliases_file")?),
            startup_file: PathBuf::from(require("startup_file")?),
            install_date,
            functions: split_keys(get("functions")),
            aliases: split_keys(get("aliases")),
        })
    }

    /// `None` when there is no record. A damaged record is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config =
            Self::parse(&text).with_context(|| format!("Cannot use {}", path.display()))?;
        Ok(Some(config))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        utils::write_atomic(path, &self.to_text())
            .with_context(|| format!("Failed to record install in {}", path.display()))
    }
}
