//! Managed block reconciliation in the user's shell startup file.
//!
//! sfm owns exactly one region of the startup file, delimited by [`BLOCK_BEGIN`] and
//! [`BLOCK_END`] lines. Everything outside that region belongs to the user and is kept
//! byte for byte. Every mutation is preceded by a timestamped backup snapshot and written
//! with stage-then-rename, so an interrupted run never leaves a half-written file.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults::{BACKUP_INFIX, BACKUP_TIMESTAMP_FORMAT, BLOCK_BEGIN, BLOCK_END};
use crate::generator::ArtifactPaths;
use crate::platform::ShellFamily;
use crate::ui::Prompter;
use crate::utils::{self, shorten_path};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    /// A begin marker without a matching end marker. Nothing is deleted: guessing where
    /// a hand-edited block ends could eat user configuration.
    #[error("sfm block starting at line {line} has no end marker; remove it manually")]
    Unterminated { line: usize },
}

/// Conditional source line for one artifact in the family's syntax.
pub fn source_directive(family: ShellFamily, path: &Path) -> String {
    let p = path.display();
    match family {
        ShellFamily::PosixLike => format!("[ -f \"{p}\" ] && . \"{p}\""),
        ShellFamily::StructuredScript => format!("test -f \"{p}\"; and source \"{p}\""),
    }
}

pub fn source_directives(family: ShellFamily, paths: &ArtifactPaths) -> Vec<String> {
    vec![
        source_directive(family, &paths.functions),
        source_directive(family, &paths.aliases),
    ]
}

/// The complete managed block, markers included, newline terminated.
pub fn render_block(family: ShellFamily, paths: &ArtifactPaths) -> String {
    let mut block = String::new();
    block.push_str(BLOCK_BEGIN);
    block.push('\n');
    for line in source_directives(family, paths) {
        block.push_str(&line);
        block.push('\n');
    }
    block.push_str(BLOCK_END);
    block.push('\n');
    block
}

fn is_marker(line: &str, marker: &str) -> bool {
    line.trim_end() == marker
}

/// Remove every well-formed managed block. Returns the remaining content and how many
/// blocks were removed. Line endings outside the blocks are preserved exactly.
pub fn strip_blocks(content: &str) -> Result<(String, usize), BlockError> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let mut kept = String::with_capacity(content.len());
    let mut removed = 0;
    let mut i = 0;

    while i < lines.len() {
        if is_marker(lines[i], BLOCK_BEGIN) {
            let end = lines[i + 1..]
                .iter()
                .position(|l| is_marker(l, BLOCK_END))
                .map(|offset| i + 1 + offset)
                .ok_or(BlockError::Unterminated { line: i + 1 })?;
            removed += 1;
            i = end + 1;
            continue;
        }
        kept.push_str(lines[i]);
        i += 1;
    }

    Ok((kept, removed))
}

pub fn has_block(content: &str) -> bool {
    content.lines().any(|l| is_marker(l, BLOCK_BEGIN))
}

/// Replace any existing managed block with `block`, appended at end of file.
pub fn apply_block(content: &str, block: &str) -> Result<String, BlockError> {
    let (mut updated, _) = strip_blocks(content)?;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(block);
    Ok(updated)
}

/// A timestamped full copy of a startup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSnapshot {
    pub path: PathBuf,
    pub taken_at: NaiveDateTime,
    /// Disambiguates snapshots taken within the same millisecond
    pub seq: u32,
}

fn backup_prefix(startup_file: &Path) -> String {
    let name = startup_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}{}", name, BACKUP_INFIX)
}

fn parse_backup_name(prefix: &str, file_name: &str) -> Option<(NaiveDateTime, u32)> {
    let suffix = file_name.strip_prefix(prefix)?;
    // Timestamp has a fixed width: YYYYmmdd-HHMMSS-mmm
    let (stamp, rest) = suffix.split_at_checked(19)?;
    let taken_at = NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT).ok()?;
    let seq = match rest {
        "" => 0,
        _ => rest.strip_prefix('-')?.parse().ok()?,
    };
    Some((taken_at, seq))
}

/// All snapshots of `startup_file`, oldest first.
pub fn list_backups(startup_file: &Path) -> Result<Vec<BackupSnapshot>> {
    let Some(dir) = startup_file.parent() else {
        return Ok(Vec::new());
    };
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let prefix = backup_prefix(startup_file);
    let mut snapshots = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some((taken_at, seq)) = parse_backup_name(&prefix, name) {
            snapshots.push(BackupSnapshot {
                path: entry.path(),
                taken_at,
                seq,
            });
        }
    }

    snapshots.sort_by(|a, b| a.taken_at.cmp(&b.taken_at).then(a.seq.cmp(&b.seq)));
    Ok(snapshots)
}

pub fn latest_backup(startup_file: &Path) -> Result<Option<BackupSnapshot>> {
    Ok(list_backups(startup_file)?.pop())
}

/// Copy the current startup file to a new snapshot next to it.
pub fn create_backup(startup_file: &Path) -> Result<PathBuf> {
    let stamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
    let base = format!("{}{}", backup_prefix(startup_file), stamp);
    let dir = startup_file.parent().unwrap_or_else(|| Path::new("."));

    let mut path = dir.join(&base);
    let mut seq = 0;
    while path.exists() {
        seq += 1;
        path = dir.join(format!("{}-{}", base, seq));
    }

    fs::copy(startup_file, &path).with_context(|| {
        format!(
            "Failed to back up {} to {}",
            startup_file.display(),
            path.display()
        )
    })?;
    info!("Backed up {} to {}", startup_file.display(), path.display());
    Ok(path)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied {
        backup: PathBuf,
        /// Whether an earlier managed block was replaced
        replaced: bool,
    },
    /// The user configures the shell by hand with these lines.
    Skipped { lines: Vec<String> },
}

/// Offer to wire the artifacts into the startup file, then apply.
pub fn reconcile(
    ui: &mut dyn Prompter,
    startup_file: &Path,
    family: ShellFamily,
    paths: &ArtifactPaths,
) -> Result<ReconcileOutcome> {
    let prompt = format!(
        "Add sfm to {} automatically?",
        startup_file.display()
    );
    if !ui.confirm(&prompt, true)? {
        info!("Automatic shell configuration declined");
        return Ok(ReconcileOutcome::Skipped {
            lines: source_directives(family, paths),
        });
    }

    apply(startup_file, family, paths)
}

/// Non-interactive reconcile: backup, drop the old block, append the new one.
pub fn apply(
    startup_file: &Path,
    family: ShellFamily,
    paths: &ArtifactPaths,
) -> Result<ReconcileOutcome> {
    if !startup_file.exists() {
        if let Some(parent) = startup_file.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(startup_file, "")
            .with_context(|| format!("Failed to create {}", startup_file.display()))?;
        info!("Created empty {}", startup_file.display());
    }

    let current = fs::read_to_string(startup_file)
        .with_context(|| format!("Failed to read {}", startup_file.display()))?;
    let replaced = has_block(&current);
    let updated = apply_block(&current, &render_block(family, paths))
        .with_context(|| format!("Cannot update {}", startup_file.display()))?;

    // Snapshot only once the edit is known to succeed
    let backup = create_backup(startup_file)?;
    utils::write_atomic(startup_file, &updated)?;
    info!(
        "{} managed block in {}",
        if replaced { "Replaced" } else { "Added" },
        startup_file.display()
    );

    Ok(ReconcileOutcome::Applied { backup, replaced })
}

/// Remove the managed block by marker scan. Returns false when there was none.
pub fn remove_block(startup_file: &Path) -> Result<bool> {
    if !startup_file.exists() {
        return Ok(false);
    }

    let current = fs::read_to_string(startup_file)
        .with_context(|| format!("Failed to read {}", startup_file.display()))?;
    let (stripped, removed) = strip_blocks(&current)
        .with_context(|| format!("Cannot clean {}", startup_file.display()))?;
    if removed == 0 {
        return Ok(false);
    }

    create_backup(startup_file)?;
    utils::write_atomic(startup_file, &stripped)?;
    info!("Removed managed block from {}", startup_file.display());
    Ok(true)
}

/// Overwrite the startup file with a snapshot's content.
///
/// A snapshot taken during an update still contains the previous block; that block is
/// dropped as well so the file ends up without any sfm lines.
pub fn restore_backup(startup_file: &Path, snapshot: &BackupSnapshot) -> Result<()> {
    let content = fs::read_to_string(&snapshot.path)
        .with_context(|| format!("Failed to read backup {}", snapshot.path.display()))?;
    let restored = match strip_blocks(&content) {
        Ok((_, 0)) => content,
        Ok((stripped, removed)) => {
            info!("Dropped {} older sfm block(s) from restored backup", removed);
            stripped
        }
        Err(e) => {
            warn!("Backup {} restored verbatim: {}", snapshot.path.display(), e);
            content
        }
    };

    if startup_file.exists() {
        create_backup(startup_file)?;
    }
    utils::write_atomic(startup_file, &restored)?;
    info!(
        "Restored {} from {}",
        startup_file.display(),
        snapshot.path.display()
    );
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackOutcome {
    Cancelled,
    RolledBack,
    RolledBackWithErrors(Vec<String>),
}

/// Undo an installation: restore or clean the startup file, then optionally remove the
/// state directory. Each sub-step is attempted even when an earlier one failed.
pub fn rollback(
    ui: &mut dyn Prompter,
    startup_file: &Path,
    state_dir: &Path,
    install_config: &Path,
    home: &Path,
) -> Result<RollbackOutcome> {
    if !ui.confirm("Roll back the sfm installation?", false)? {
        info!("Rollback cancelled");
        return Ok(RollbackOutcome::Cancelled);
    }

    let mut errors = Vec::new();
    let display = shorten_path(startup_file, home);

    let snapshot = match latest_backup(startup_file) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            errors.push(format!("{e:#}"));
            None
        }
    };

    let mut restored = false;
    if let Some(snapshot) = snapshot {
        let prompt = format!(
            "Restore {} from backup taken {}?",
            display,
            snapshot.taken_at.format("%Y-%m-%d %H:%M:%S")
        );
        if ui.confirm(&prompt, true)? {
            match restore_backup(startup_file, &snapshot) {
                Ok(()) => restored = true,
                Err(e) => errors.push(format!("{e:#}")),
            }
        }
    }

    if !restored {
        match remove_block(startup_file) {
            Ok(true) => {}
            Ok(false) => info!("No sfm block found in {}", startup_file.display()),
            Err(e) => errors.push(format!("{e:#}")),
        }
    }

    if state_dir.exists() {
        let prompt = format!(
            "Delete {} (generated files, install record and log)? This cannot be undone",
            shorten_path(state_dir, home)
        );
        if ui.confirm(&prompt, false)? {
            match fs::remove_dir_all(state_dir) {
                Ok(()) => info!("Deleted {}", state_dir.display()),
                Err(e) => errors.push(format!("Failed to delete {}: {}", state_dir.display(), e)),
            }
        } else if install_config.exists() {
            // Keep the files but forget the install so the next run starts fresh
            if let Err(e) = fs::remove_file(install_config) {
                errors.push(format!(
                    "Failed to remove {}: {}",
                    install_config.display(),
                    e
                ));
            }
        }
    }

    if errors.is_empty() {
        info!("Rollback completed");
        Ok(RollbackOutcome::RolledBack)
    } else {
        for e in &errors {
            error!("Rollback step failed: {}", e);
        }
        Ok(RollbackOutcome::RolledBackWithErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::ScriptedPrompter;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn paths(dir: &str) -> ArtifactPaths {
        ArtifactPaths::new(Path::new(dir), ShellFamily::PosixLike)
    }

    fn backups_in(dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().contains(BACKUP_INFIX))
            .collect();
        found.sort();
        found
    }

    #[test]
    fn test_render_block_posix() {
        assert_eq!(
            render_block(ShellFamily::PosixLike, &paths("/home/u/.sfm")),
            indoc! {r#"
                # >>> sfm managed block >>>
                [ -f "/home/u/.sfm/functions.sh" ] && . "/home/u/.sfm/functions.sh"
                [ -f "/home/u/.sfm/aliases.sh" ] && . "/home/u/.sfm/aliases.sh"
                # <<< sfm managed block <<<
            "#}
        );
    }

    #[test]
    fn test_render_block_fish() {
        let paths = ArtifactPaths::new(Path::new("/home/u/.sfm"), ShellFamily::StructuredScript);
        assert_eq!(
            render_block(ShellFamily::StructuredScript, &paths),
            indoc! {r#"
                # >>> sfm managed block >>>
                test -f "/home/u/.sfm/functions.fish"; and source "/home/u/.sfm/functions.fish"
                test -f "/home/u/.sfm/aliases.fish"; and source "/home/u/.sfm/aliases.fish"
                # <<< sfm managed block <<<
            "#}
        );
    }

    #[test]
    fn test_strip_keeps_surrounding_content() {
        let content = format!(
            "export A=1\n{}\nold line\n{}\nalias x=y\n",
            BLOCK_BEGIN, BLOCK_END
        );
        let (stripped, removed) = strip_blocks(&content).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(stripped, "export A=1\nalias x=y\n");
    }

    #[test]
    fn test_strip_without_block_is_identity() {
        let content = "line one\r\nline two";
        assert_eq!(strip_blocks(content).unwrap(), (content.to_string(), 0));
    }

    #[test]
    fn test_strip_unterminated_block_fails() {
        let content = format!("a\n{}\nsource x\nb\n", BLOCK_BEGIN);
        assert_eq!(
            strip_blocks(&content),
            Err(BlockError::Unterminated { line: 2 })
        );
    }

    #[test]
    fn test_strip_ignores_markers_with_extra_text() {
        // Only exact marker lines delimit the block
        let content = format!("# note: {}\nkeep\n", BLOCK_BEGIN);
        assert_eq!(strip_blocks(&content).unwrap().1, 0);
    }

    #[test]
    fn test_apply_block_adds_newline_before_block() {
        let block = render_block(ShellFamily::PosixLike, &paths("/h/.sfm"));
        let updated = apply_block("export A=1", &block).unwrap();
        assert_eq!(updated, format!("export A=1\n{}", block));
    }

    #[test]
    fn test_apply_block_is_idempotent() {
        let block = render_block(ShellFamily::PosixLike, &paths("/h/.sfm"));
        let once = apply_block("# user\nexport A=1", &block).unwrap();
        let twice = apply_block(&once, &block).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_apply_on_empty_file_writes_only_the_block() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        fs::write(&rc, "").unwrap();
        let paths = paths("/home/u/.sfm");

        apply(&rc, ShellFamily::PosixLike, &paths).unwrap();

        let content = fs::read_to_string(&rc).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], BLOCK_BEGIN);
        assert!(lines[1].contains("/home/u/.sfm/functions.sh"));
        assert!(lines[2].contains("/home/u/.sfm/aliases.sh"));
        assert_eq!(lines[3], BLOCK_END);
    }

    #[test]
    fn test_apply_twice_is_byte_stable() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".zshrc");
        fs::write(&rc, "setopt autocd\n").unwrap();
        let paths = paths("/home/u/.sfm");

        apply(&rc, ShellFamily::PosixLike, &paths).unwrap();
        let first = fs::read_to_string(&rc).unwrap();
        let outcome = apply(&rc, ShellFamily::PosixLike, &paths).unwrap();
        let second = fs::read_to_string(&rc).unwrap();

        assert_eq!(first, second);
        assert_eq!(second.matches(BLOCK_BEGIN).count(), 1);
        assert!(matches!(outcome, ReconcileOutcome::Applied { replaced: true, .. }));
    }

    #[test]
    fn test_apply_replaces_old_paths_and_backs_up_once() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        let old = apply_block(
            "# before\n",
            &render_block(ShellFamily::PosixLike, &paths("/old/A")),
        )
        .unwrap();
        let original = format!("{}# after\n", old);
        fs::write(&rc, &original).unwrap();

        apply(&rc, ShellFamily::PosixLike, &paths("/new/C")).unwrap();

        let content = fs::read_to_string(&rc).unwrap();
        assert_eq!(content.matches(BLOCK_BEGIN).count(), 1);
        assert!(content.contains("/new/C/functions.sh"));
        assert!(!content.contains("/old/A"));
        assert!(content.starts_with("# before\n# after\n"));

        let backups = backups_in(dir.path());
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), original);
    }

    #[test]
    fn test_apply_creates_missing_startup_file() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".config").join("fish").join("config.fish");
        let paths = ArtifactPaths::new(Path::new("/h/.sfm"), ShellFamily::StructuredScript);

        apply(&rc, ShellFamily::StructuredScript, &paths).unwrap();

        let content = fs::read_to_string(&rc).unwrap();
        assert!(content.contains("; and source \"/h/.sfm/functions.fish\""));
    }

    #[test]
    fn test_apply_refuses_unterminated_block() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        let original = format!("{}\n. ~/.sfm/functions.sh\n", BLOCK_BEGIN);
        fs::write(&rc, &original).unwrap();

        let err = apply(&rc, ShellFamily::PosixLike, &paths("/h/.sfm")).unwrap_err();
        assert!(format!("{err:#}").contains("no end marker"));
        assert_eq!(fs::read_to_string(&rc).unwrap(), original);
        assert!(list_backups(&rc).unwrap().is_empty());
    }

    #[test]
    fn test_rollback_of_created_startup_file_leaves_it_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".config/fish/config.fish");
        let state = dir.path().join(".sfm");

        let fish = ArtifactPaths::new(&state, ShellFamily::StructuredScript);
        apply(&rc, ShellFamily::StructuredScript, &fish).unwrap();
        let mut ui = ScriptedPrompter::new().confirm(true).confirm(true);
        let outcome = rollback(&mut ui, &rc, &state, &state.join("config"), dir.path()).unwrap();

        assert_eq!(outcome, RollbackOutcome::RolledBack);
        assert_eq!(fs::read_to_string(&rc).unwrap(), "");
    }

    #[test]
    fn test_reconcile_declined_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        fs::write(&rc, "keep\n").unwrap();
        let mut ui = ScriptedPrompter::new().confirm(false);

        let outcome = reconcile(&mut ui, &rc, ShellFamily::PosixLike, &paths("/h/.sfm")).unwrap();

        match outcome {
            ReconcileOutcome::Skipped { lines } => assert_eq!(lines.len(), 2),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(fs::read_to_string(&rc).unwrap(), "keep\n");
        assert!(backups_in(dir.path()).is_empty());
    }

    #[test]
    fn test_rollback_restores_pristine_file() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        let state = dir.path().join(".sfm");
        fs::create_dir_all(&state).unwrap();
        let pristine = "# my config\nexport EDITOR=nvim\n";
        fs::write(&rc, pristine).unwrap();

        apply(&rc, ShellFamily::PosixLike, &ArtifactPaths::new(&state, ShellFamily::PosixLike)).unwrap();
        assert_ne!(fs::read_to_string(&rc).unwrap(), pristine);

        // confirm rollback, accept restore, keep the state directory
        let mut ui = ScriptedPrompter::new().confirm(true).confirm(true).confirm(false);
        let outcome = rollback(&mut ui, &rc, &state, &state.join("config"), dir.path()).unwrap();

        assert_eq!(outcome, RollbackOutcome::RolledBack);
        assert_eq!(fs::read_to_string(&rc).unwrap(), pristine);
        assert!(state.exists());
    }

    #[test]
    fn test_rollback_after_update_drops_every_block() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        let state = dir.path().join(".sfm");
        fs::write(&rc, "pristine\n").unwrap();
        let paths = ArtifactPaths::new(&state, ShellFamily::PosixLike);

        apply(&rc, ShellFamily::PosixLike, &paths).unwrap();
        apply(&rc, ShellFamily::PosixLike, &paths).unwrap();

        let mut ui = ScriptedPrompter::new().confirm(true).confirm(true);
        let outcome = rollback(&mut ui, &rc, &state, &state.join("config"), dir.path()).unwrap();

        assert_eq!(outcome, RollbackOutcome::RolledBack);
        assert_eq!(fs::read_to_string(&rc).unwrap(), "pristine\n");
    }

    #[test]
    fn test_rollback_without_backup_uses_marker_scan() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        let state = dir.path().join(".sfm");
        let block = render_block(ShellFamily::PosixLike, &paths("/h/.sfm"));
        fs::write(&rc, format!("a\n{}b\n", block)).unwrap();

        let mut ui = ScriptedPrompter::new().confirm(true);
        let outcome = rollback(&mut ui, &rc, &state, &state.join("config"), dir.path()).unwrap();

        assert_eq!(outcome, RollbackOutcome::RolledBack);
        assert_eq!(fs::read_to_string(&rc).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_rollback_declined_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        let state = dir.path().join(".sfm");
        let block = render_block(ShellFamily::PosixLike, &paths("/h/.sfm"));
        fs::write(&rc, &block).unwrap();

        let mut ui = ScriptedPrompter::new().confirm(false);
        let outcome = rollback(&mut ui, &rc, &state, &state.join("config"), dir.path()).unwrap();

        assert_eq!(outcome, RollbackOutcome::Cancelled);
        assert_eq!(fs::read_to_string(&rc).unwrap(), block);
    }

    #[test]
    fn test_rollback_deletes_state_dir_when_confirmed() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        let state = dir.path().join(".sfm");
        fs::create_dir_all(&state).unwrap();
        fs::write(state.join("functions.sh"), "# f\n").unwrap();
        fs::write(&rc, "x\n").unwrap();

        let mut ui = ScriptedPrompter::new().confirm(true).confirm(true);
        let outcome = rollback(&mut ui, &rc, &state, &state.join("config"), dir.path()).unwrap();

        assert_eq!(outcome, RollbackOutcome::RolledBack);
        assert!(!state.exists());
    }

    #[test]
    fn test_rollback_reports_partial_failure() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        let state = dir.path().join(".sfm");
        fs::write(&rc, format!("{}\nunterminated\n", BLOCK_BEGIN)).unwrap();

        let mut ui = ScriptedPrompter::new().confirm(true);
        let outcome = rollback(&mut ui, &rc, &state, &state.join("config"), dir.path()).unwrap();

        match outcome {
            RollbackOutcome::RolledBackWithErrors(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("no end marker"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_backups_sort_by_timestamp_then_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".bashrc");
        for name in [
            ".bashrc.sfm-backup-20260101-120000-500",
            ".bashrc.sfm-backup-20260101-120000-500-1",
            ".bashrc.sfm-backup-20251231-235959-999",
            ".bashrc.sfm-backup-garbage",
            ".zshrc.sfm-backup-20270101-000000-000",
        ] {
            fs::write(dir.path().join(name), name).unwrap();
        }

        let backups = list_backups(&rc).unwrap();
        assert_eq!(backups.len(), 3);
        let latest = latest_backup(&rc).unwrap().unwrap();
        assert_eq!(latest.seq, 1);
        assert!(latest.path.ends_with(".bashrc.sfm-backup-20260101-120000-500-1"));
    }
}
