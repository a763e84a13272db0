// ─── World Backups ───
// Zip archiving, retention pruning and one-shot restore. The scheduler
// and restore share an advisory lock so they never run concurrently.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

use crate::core::error::{InstallerError, InstallerResult};

const LOCK_FILE: &str = ".backup.lock";

/// Advisory lock over a backups directory. Held for the duration of a
/// scheduler tick or a restore; released on drop.
pub struct BackupLock {
    path: PathBuf,
}

impl BackupLock {
    pub fn acquire(backups_dir: &Path) -> InstallerResult<Self> {
        fs::create_dir_all(backups_dir).map_err(|e| InstallerError::Io {
            path: backups_dir.to_path_buf(),
            source: e,
        })?;
        let path = backups_dir.join(LOCK_FILE);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                let _ = writeln!(file, "{}", std::process::id());
                Ok(Self { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(InstallerError::Other(
                format!("Backup lock already held at {path:?}"),
            )),
            Err(e) => Err(InstallerError::Io { path, source: e }),
        }
    }
}

impl Drop for BackupLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// File name for a backup taken at `now`: `<world>-<timestamp>.zip`.
pub fn backup_file_name(world_name: &str, now: DateTime<Utc>) -> String {
    format!("{world_name}-{}.zip", now.format("%Y%m%d-%H%M%S"))
}

/// Archive `world_dir` into the backups directory. Returns the new file.
pub fn archive_world(
    world_dir: &Path,
    backups_dir: &Path,
    world_name: &str,
) -> InstallerResult<PathBuf> {
    fs::create_dir_all(backups_dir).map_err(|e| InstallerError::Io {
        path: backups_dir.to_path_buf(),
        source: e,
    })?;

    let dest = backups_dir.join(backup_file_name(world_name, Utc::now()));
    let file = fs::File::create(&dest).map_err(|e| InstallerError::Io {
        path: dest.clone(),
        source: e,
    })?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut archived = 0usize;
    for entry in WalkDir::new(world_dir) {
        let entry = entry.map_err(|e| InstallerError::Other(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(world_dir)
            .map_err(|e| InstallerError::Other(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let name = relative.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            writer.start_file(name, options)?;
            let mut src = fs::File::open(entry.path()).map_err(|e| InstallerError::Io {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
            io::copy(&mut src, &mut writer).map_err(|e| InstallerError::Io {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
            archived += 1;
        }
    }
    writer.finish()?;

    info!("Archived {} files from {:?} to {:?}", archived, world_dir, dest);
    Ok(dest)
}

/// Backups for `world_name`, newest first. Creation time decides order;
/// the timestamp in the name breaks ties.
pub fn list_backups(backups_dir: &Path, world_name: &str) -> InstallerResult<Vec<PathBuf>> {
    let prefix = format!("{world_name}-");
    let mut entries: Vec<(SystemTime, String, PathBuf)> = Vec::new();

    let dir = match fs::read_dir(backups_dir) {
        Ok(dir) => dir,
        Err(_) => return Ok(Vec::new()),
    };
    for entry in dir.filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with(&prefix) || !name.ends_with(".zip") {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        entries.push((modified, name, entry.path()));
    }

    entries.sort_by(|a, b| (&b.0, &b.1).cmp(&(&a.0, &a.1)));
    Ok(entries.into_iter().map(|(_, _, path)| path).collect())
}

/// Delete backups beyond `retention`, oldest first. Returns how many.
pub fn prune_backups(
    backups_dir: &Path,
    world_name: &str,
    retention: usize,
) -> InstallerResult<usize> {
    let backups = list_backups(backups_dir, world_name)?;
    let mut removed = 0usize;
    for stale in backups.iter().skip(retention) {
        fs::remove_file(stale).map_err(|e| InstallerError::Io {
            path: stale.clone(),
            source: e,
        })?;
        debug!("Pruned old backup {:?}", stale);
        removed += 1;
    }
    Ok(removed)
}

/// One-shot restore of a backup archive into `world_dir`, under the
/// advisory lock so it cannot race a scheduler tick.
pub fn restore_backup(
    backup_path: &Path,
    world_dir: &Path,
    backups_dir: &Path,
) -> InstallerResult<usize> {
    let _lock = BackupLock::acquire(backups_dir)?;
    crate::core::archive::extract_zip(backup_path, world_dir)
}
