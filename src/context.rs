use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::defaults;
use crate::generator::ArtifactPaths;
use crate::platform::ShellFamily;

/// Locations and flags for one run, resolved once in `main` and passed down.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    pub home: PathBuf,
    pub state_dir: PathBuf,
    pub install_config: PathBuf,
    pub log_file: PathBuf,
    /// Answer every prompt with its default, never block on input
    pub batch: bool,
    /// Confirmations default to yes
    pub assume_yes: bool,
    /// `$EDITOR`, shown in the closing summary
    pub editor: String,
}

impl RuntimeContext {
    pub fn new(batch: bool, assume_yes: bool) -> Result<Self> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        let mut ctx = Self::with_home(home);
        ctx.batch = batch;
        ctx.assume_yes = assume_yes;
        ctx.editor =
            std::env::var("EDITOR").unwrap_or_else(|_| defaults::DEFAULT_EDITOR.to_string());
        Ok(ctx)
    }

    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let state_dir = home.join(defaults::STATE_DIR_NAME);
        Self {
            install_config: state_dir.join(defaults::INSTALL_CONFIG_FILE),
            log_file: state_dir.join(defaults::LOG_FILE),
            state_dir,
            home,
            batch: false,
            assume_yes: false,
            editor: defaults::DEFAULT_EDITOR.to_string(),
        }
    }

    pub fn artifact_paths(&self, family: ShellFamily) -> ArtifactPaths {
        ArtifactPaths::new(&self.state_dir, family)
    }

    /// `~`-abbreviated form for display.
    pub fn display(&self, path: &Path) -> String {
        crate::utils::shorten_path(path, &self.home)
    }
}
