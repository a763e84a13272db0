// ─── Archive Classification ───
// Decides which installation path an extracted archive takes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::core::manifest::MANIFEST_FILE_NAMES;

/// How deep the start-script scan looks. Server packs keep their scripts
/// at or near the top level.
const SCRIPT_SCAN_DEPTH: usize = 2;

/// How deep the manifest scan looks.
const MANIFEST_SCAN_DEPTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// Ships a start script: already server-installed, copy through.
    ServerPack,
    /// Ships a manifest: needs loader install and override merge.
    ClientExport,
    /// Neither marker found. Callers decide whether to abort.
    Invalid,
}

/// Classify an extracted archive.
///
/// Start scripts are checked first on purpose: an archive shipping both a
/// script and a manifest is a pre-built server pack, because a working
/// start script is stronger evidence of runnability than metadata.
pub fn classify(extracted_root: &Path) -> Classification {
    if find_start_script(extracted_root).is_some() {
        debug!("Classified {:?} as server pack", extracted_root);
        return Classification::ServerPack;
    }
    if find_manifest(extracted_root).is_some() {
        debug!("Classified {:?} as client export", extracted_root);
        return Classification::ClientExport;
    }
    Classification::Invalid
}

/// Locate a start script within the bounded scan depth.
pub fn find_start_script(root: &Path) -> Option<PathBuf> {
    scan_for(root, SCRIPT_SCAN_DEPTH, is_start_script_name)
}

/// Locate a pack manifest within the bounded scan depth.
pub fn find_manifest(root: &Path) -> Option<PathBuf> {
    scan_for(root, MANIFEST_SCAN_DEPTH, |name| {
        MANIFEST_FILE_NAMES.iter().any(|m| name.eq_ignore_ascii_case(m))
    })
}

fn scan_for(root: &Path, depth: usize, matches: impl Fn(&str) -> bool) -> Option<PathBuf> {
    let mut hits: Vec<PathBuf> = WalkDir::new(root)
        .max_depth(depth)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| matches(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.into_path())
        .collect();

    // Shallowest match wins, so a top-level marker beats a nested one.
    hits.sort_by_key(|p| p.components().count());
    hits.into_iter().next()
}

fn is_start_script_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    let Some(stem) = lower.strip_suffix(".sh").or_else(|| lower.strip_suffix(".bat")) else {
        return false;
    };
    matches!(stem, "start" | "run" | "launch")
        || stem.starts_with("start-")
        || stem.starts_with("start_")
        || stem.starts_with("startserver")
        || stem.starts_with("serverstart")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn start_script_means_server_pack() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("start.sh"));
        touch(&tmp.path().join("server.jar"));

        assert_eq!(classify(tmp.path()), Classification::ServerPack);
    }

    #[test]
    fn manifest_means_client_export() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("manifest.json"));
        touch(&tmp.path().join("overrides/mods/a.jar"));

        assert_eq!(classify(tmp.path()), Classification::ClientExport);
    }

    #[test]
    fn start_script_wins_over_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("manifest.json"));
        touch(&tmp.path().join("ServerStart.bat"));

        assert_eq!(classify(tmp.path()), Classification::ServerPack);
    }

    #[test]
    fn nested_manifest_is_found_within_depth() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("SomePack-1.0/manifest.json"));

        assert_eq!(classify(tmp.path()), Classification::ClientExport);
        assert_eq!(
            find_manifest(tmp.path()).unwrap(),
            tmp.path().join("SomePack-1.0/manifest.json")
        );
    }

    #[test]
    fn manifest_deeper_than_bound_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("a/b/c/d/manifest.json"));

        assert_eq!(classify(tmp.path()), Classification::Invalid);
    }

    #[test]
    fn empty_archive_is_invalid() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(classify(tmp.path()), Classification::Invalid);
    }

    #[test]
    fn script_name_patterns() {
        assert!(is_start_script_name("start.sh"));
        assert!(is_start_script_name("Start.bat"));
        assert!(is_start_script_name("ServerStart.sh"));
        assert!(is_start_script_name("startserver.bat"));
        assert!(is_start_script_name("run.sh"));
        assert!(!is_start_script_name("restart.sh"));
        assert!(!is_start_script_name("start.txt"));
        assert!(!is_start_script_name("forge-installer.jar"));
    }
}
