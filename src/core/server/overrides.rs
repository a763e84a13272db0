// ─── Override Merge ───
// Copies pack content into the server directory in a fixed precedence
// order. Later sources overwrite earlier ones; nothing is ever deleted.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::error::{InstallerError, InstallerResult};

/// Auxiliary content directories merged after mods and config.
pub const AUX_DIRS: &[&str] = &[
    "kubejs",
    "defaultconfigs",
    "scripts",
    "libraries",
    "packmenu",
    "patchouli_books",
    "global_packs",
];

#[derive(Debug, Default)]
pub struct MergeReport {
    /// Files copied across all sources.
    pub copied: usize,
    /// Configured source roots that did not exist. Informational.
    pub missing_sources: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

/// The fixed merge plan: `(source subpath, target subdir)` pairs in
/// precedence order. `server-overrides` comes after `overrides` and the
/// top-level dirs so server-specific files win over client defaults.
pub fn merge_plan() -> Vec<(PathBuf, PathBuf)> {
    let mut plan: Vec<(PathBuf, PathBuf)> = vec![
        ("overrides/mods".into(), "mods".into()),
        ("overrides/config".into(), "config".into()),
        ("mods".into(), "mods".into()),
        ("config".into(), "config".into()),
        ("server-overrides/mods".into(), "mods".into()),
        ("server-overrides/config".into(), "config".into()),
    ];
    for aux in AUX_DIRS {
        plan.push((PathBuf::from("overrides").join(aux), PathBuf::from(aux)));
        plan.push((PathBuf::from(aux), PathBuf::from(aux)));
    }
    plan
}

/// Merge pack content from `pack_root` into `target_root`.
///
/// A missing source directory is recorded, not an error. After merging,
/// an empty target `mods/` directory produces a warning: the server would
/// boot vanilla, which is almost never what the pack intended.
pub fn merge_overrides(pack_root: &Path, target_root: &Path) -> InstallerResult<MergeReport> {
    let mut report = MergeReport::default();

    for (source_rel, target_rel) in merge_plan() {
        let source = pack_root.join(&source_rel);
        if !source.is_dir() {
            report.missing_sources.push(source_rel);
            continue;
        }
        let copied = copy_tree(&source, &target_root.join(&target_rel))?;
        debug!("Merged {:?}: {} files", source_rel, copied);
        report.copied += copied;
    }

    let mods_dir = target_root.join("mods");
    let mods_empty = fs::read_dir(&mods_dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true);
    if mods_empty {
        let message = format!("No mods present in {mods_dir:?} after merge");
        warn!("{}", message);
        report.warnings.push(message);
    }

    Ok(report)
}

/// Recursive copy-overwrite. Existing files are replaced, extra files in
/// the target are left alone. Also used for the server-pack copy-through.
pub(crate) fn copy_tree(source: &Path, target: &Path) -> InstallerResult<usize> {
    let mut copied = 0usize;
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| InstallerError::Other(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| InstallerError::Other(e.to_string()))?;
        let dest = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| InstallerError::Io {
                path: dest.clone(),
                source: e,
            })?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| InstallerError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            fs::copy(entry.path(), &dest).map_err(|e| InstallerError::Io {
                path: dest.clone(),
                source: e,
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}
