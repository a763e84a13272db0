// ─── Archive Extraction ───

use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use crate::core::error::{InstallerError, InstallerResult};

/// Extract a zip archive into `dest`. Returns the number of files written.
///
/// Entries whose names escape `dest` (absolute paths, `..` components) are
/// rejected, not skipped: a pack that tries is not worth installing.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> InstallerResult<usize> {
    let file = fs::File::open(archive_path).map_err(|e| InstallerError::Io {
        path: archive_path.to_path_buf(),
        source: e,
    })?;
    let mut archive = zip::ZipArchive::new(file)?;

    fs::create_dir_all(dest).map_err(|e| InstallerError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let mut written = 0usize;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| InstallerError::UnsafeArchivePath(entry.name().to_string()))?;
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| InstallerError::Io {
                path: out_path.clone(),
                source: e,
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| InstallerError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut out_file = fs::File::create(&out_path).map_err(|e| InstallerError::Io {
            path: out_path.clone(),
            source: e,
        })?;
        io::copy(&mut entry, &mut out_file).map_err(|e| InstallerError::Io {
            path: out_path.clone(),
            source: e,
        })?;
        written += 1;
    }

    info!("Extracted {} files from {:?}", written, archive_path);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        for (name, bytes) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_nested_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("pack.zip");
        write_zip(
            &archive,
            &[
                ("manifest.json", b"{}".as_slice()),
                ("overrides/mods/a.jar", b"jar".as_slice()),
            ],
        );

        let dest = tmp.path().join("out");
        let written = extract_zip(&archive, &dest).unwrap();

        assert_eq!(written, 2);
        assert!(dest.join("manifest.json").is_file());
        assert!(dest.join("overrides/mods/a.jar").is_file());
    }

    #[test]
    fn rejects_path_traversal_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("evil.zip");
        write_zip(&archive, &[("../escape.txt", b"no".as_slice())]);

        let dest = tmp.path().join("out");
        let err = extract_zip(&archive, &dest).unwrap_err();
        assert!(matches!(err, InstallerError::UnsafeArchivePath(_)));
        assert!(!tmp.path().join("escape.txt").exists());
    }
}
