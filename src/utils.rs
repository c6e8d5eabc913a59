use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Follow a symlinked file to the path that should actually be rewritten, so
/// replacing the content keeps the link (dotfile managers symlink `~/.bashrc`).
pub fn write_target(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Replace `path` with `content` without ever exposing a half-written file.
///
/// The content is staged in a temporary file in the same directory and renamed over the
/// target once fully written. Permissions of an existing target are carried over.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let target = write_target(path);
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut staged = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to stage a temporary file in {}", dir.display()))?;
    staged
        .write_all(content.as_bytes())
        .and_then(|_| staged.as_file().sync_all())
        .with_context(|| format!("Failed to write staged content for {}", target.display()))?;

    if let Ok(meta) = fs::metadata(&target) {
        fs::set_permissions(staged.path(), meta.permissions()).with_context(|| {
            format!("Failed to copy permissions of {}", target.display())
        })?;
    }

    staged
        .persist(&target)
        .with_context(|| format!("Failed to replace {}", target.display()))?;
    Ok(())
}

/// Last `n` lines of a text file (fewer when the file is shorter).
pub fn tail_lines(path: &Path, n: usize) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].iter().map(|l| l.to_string()).collect())
}

/// Display a path with the home directory abbreviated to `~`.
pub fn shorten_path(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.sh");

        write_atomic(&path, "first\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\n");

        write_atomic(&path, "second\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");

        // No staging files left behind
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".bashrc");
        fs::write(&path, "old\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        write_atomic(&path, "new\n").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_preserves_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("dotfiles-bashrc");
        let link = dir.path().join(".bashrc");
        fs::write(&real, "old\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_atomic(&link, "new\n").unwrap();
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "new\n");
    }

    #[test]
    fn test_tail_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setup.log");
        fs::write(&path, "a\nb\nc\nd\n").unwrap();
        assert_eq!(tail_lines(&path, 2).unwrap(), vec!["c", "d"]);
        assert_eq!(tail_lines(&path, 10).unwrap().len(), 4);
    }

    #[test]
    fn test_shorten_path() {
        let home = Path::new("/home/u");
        assert_eq!(shorten_path(Path::new("/home/u/.sfm/config"), home), "~/.sfm/config");
        assert_eq!(shorten_path(Path::new("/home/u"), home), "~");
        assert_eq!(shorten_path(Path::new("/etc/profile"), home), "/etc/profile");
    }
}
