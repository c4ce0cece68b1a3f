//! Crash-safe replacement of small files.
//!
//! The session record is written to a sibling temp file, synced, then renamed
//! over the old one, so a reader sees either the previous record or the new
//! one. Where rename-over-existing is refused, the old file is moved aside to
//! `<name>.bak` first and put back if the second rename fails too.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

fn backup_path(path: &Path) -> PathBuf {
    path.with_extension("bak")
}

/// Put back `<name>.bak` when `path` itself is missing, which only happens if
/// the process died between moving the old record aside and renaming the new
/// one in.
pub fn recover_bak_file(path: &Path) {
    let backup = backup_path(path);
    if path.exists() || !backup.exists() {
        return;
    }
    match fs::rename(&backup, path) {
        Ok(()) => warn!(path = %path.display(), "Restored record from interrupted write"),
        Err(e) => warn!(path = %path.display(), "Failed to restore .bak: {e}"),
    }
}

/// Remove `path`. A file that is already gone is not an error.
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Replace the contents of `path`, creating parent directories as needed.
/// On unix the result is readable by the owner only.
pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;

    if let Err(refused) = staged.persist(path) {
        if !path.exists() {
            return Err(refused.error);
        }
        let backup = backup_path(path);
        let _ = fs::remove_file(&backup);
        fs::rename(path, &backup)?;
        if let Err(failed) = refused.file.persist(path) {
            let _ = fs::rename(&backup, path);
            return Err(failed.error);
        }
        if let Err(e) = fs::remove_file(&backup) {
            debug!(path = %backup.display(), "Leaving stale .bak behind: {e}");
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
