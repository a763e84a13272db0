// ─── Server Artifact Resolution ───
// Finds the launchable server jar in an installed directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::error::{InstallerError, InstallerResult};

/// Fabric's fixed server launch jar name.
pub const FABRIC_LAUNCH_JAR: &str = "fabric-server-launch.jar";

/// Quilt's fixed server launch jar name.
pub const QUILT_LAUNCH_JAR: &str = "quilt-server-launch.jar";

/// The vanilla server jar, never auto-selected in tier 2.
const VANILLA_JAR: &str = "server.jar";

/// One-line sidecar recording the last resolved jar. A hint only:
/// readers must existence-check it and re-resolve when stale.
const SIDECAR_FILE: &str = ".server-jar";

/// Scan `dir` for the launchable server jar.
///
/// Tiers are tried top to bottom, first non-empty tier wins. Anything whose
/// name contains "installer" is excluded everywhere. Loader-specific names
/// always beat generic ones, and the vanilla jar is never picked while a
/// modded alternative exists.
pub fn resolve_artifact(dir: &Path) -> Option<PathBuf> {
    let jars = list_jars(dir);
    if jars.is_empty() {
        return None;
    }

    // Tier 1: loader-specific naming, most specific first.
    let tier1: [fn(&str) -> bool; 6] = [
        |n| n.starts_with("forge") && n.contains("server"),
        |n| n.starts_with("neoforge") && n.contains("server"),
        |n| n == FABRIC_LAUNCH_JAR,
        |n| n == QUILT_LAUNCH_JAR,
        |n| n.contains("forge"),
        |n| n.starts_with("run"),
    ];
    for matcher in tier1 {
        if let Some(found) = first_match(&jars, matcher) {
            debug!("Resolved server jar (tier 1): {:?}", found);
            return Some(dir.join(found));
        }
    }

    // Tier 2: generically named server jars, vanilla excluded.
    if let Some(found) = first_match(&jars, |n| {
        n.contains("-server") && n != VANILLA_JAR && !n.starts_with("minecraft_server")
    }) {
        debug!("Resolved server jar (tier 2): {:?}", found);
        return Some(dir.join(found));
    }

    // Tier 3: the single largest jar present.
    let largest = jars
        .iter()
        .max_by_key(|(name, size)| (*size, std::cmp::Reverse(name.clone())))
        .map(|(name, _)| dir.join(name));
    if let Some(found) = &largest {
        debug!("Resolved server jar (tier 3, largest): {:?}", found);
    }
    largest
}

/// Resolve via the sidecar hint, falling back to a fresh scan.
///
/// Run at every server start: files may have been renamed or removed since
/// install time, so a stale record is re-derived and rewritten, never
/// trusted blindly.
pub fn resolve_with_sidecar(dir: &Path) -> InstallerResult<PathBuf> {
    if let Some(recorded) = read_sidecar(dir) {
        if recorded.is_file() {
            return Ok(recorded);
        }
        warn!("Recorded server jar {:?} is gone, re-resolving", recorded);
    }

    let resolved = resolve_artifact(dir).ok_or_else(|| InstallerError::ArtifactNotFound {
        dir: dir.to_path_buf(),
    })?;
    write_sidecar(dir, &resolved)?;
    Ok(resolved)
}

pub fn read_sidecar(dir: &Path) -> Option<PathBuf> {
    let raw = fs::read_to_string(dir.join(SIDECAR_FILE)).ok()?;
    let line = raw.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(PathBuf::from(line))
    }
}

pub fn write_sidecar(dir: &Path, jar: &Path) -> InstallerResult<()> {
    let path = dir.join(SIDECAR_FILE);
    fs::write(&path, format!("{}\n", jar.display())).map_err(|e| InstallerError::Io {
        path,
        source: e,
    })
}

/// Jar files in `dir` with sizes, sorted by name, "installer" excluded.
fn list_jars(dir: &Path) -> Vec<(String, u64)> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut jars: Vec<(String, u64)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            Some((name, size))
        })
        .filter(|(name, _)| {
            let lower = name.to_ascii_lowercase();
            lower.ends_with(".jar") && !lower.contains("installer")
        })
        .collect();

    jars.sort_by(|a, b| a.0.cmp(&b.0));
    jars
}

fn first_match(jars: &[(String, u64)], matcher: impl Fn(&str) -> bool) -> Option<String> {
    jars.iter()
        .map(|(name, _)| name)
        .find(|name| matcher(&name.to_ascii_lowercase()))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir_with(files: &[(&str, usize)]) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for (name, size) in files {
            fs::write(tmp.path().join(name), vec![0u8; *size]).unwrap();
        }
        tmp
    }

    #[test]
    fn forge_server_jar_beats_everything() {
        let tmp = dir_with(&[
            ("forge-1.20.1-server.jar", 10),
            ("forge-installer.jar", 100),
            ("run.jar", 50),
        ]);
        let resolved = resolve_artifact(tmp.path()).unwrap();
        assert_eq!(resolved, tmp.path().join("forge-1.20.1-server.jar"));
    }

    #[test]
    fn installer_jars_are_never_selected() {
        let tmp = dir_with(&[("forge-1.20.1-Installer.jar", 100)]);
        assert!(resolve_artifact(tmp.path()).is_none());
    }

    #[test]
    fn fabric_fixed_name_beats_generic_forge_like() {
        let tmp = dir_with(&[
            ("fabric-server-launch.jar", 10),
            ("somethingforge.jar", 20),
        ]);
        let resolved = resolve_artifact(tmp.path()).unwrap();
        assert_eq!(resolved, tmp.path().join("fabric-server-launch.jar"));
    }

    #[test]
    fn vanilla_jar_is_never_picked_in_tier_two() {
        let tmp = dir_with(&[("server.jar", 100), ("mypack-server-1.0.jar", 10)]);
        let resolved = resolve_artifact(tmp.path()).unwrap();
        assert_eq!(resolved, tmp.path().join("mypack-server-1.0.jar"));
    }

    #[test]
    fn falls_back_to_largest_jar() {
        let tmp = dir_with(&[("a.jar", 5), ("b.jar", 50), ("c.jar", 10)]);
        let resolved = resolve_artifact(tmp.path()).unwrap();
        assert_eq!(resolved, tmp.path().join("b.jar"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let tmp = dir_with(&[
            ("forge-1.20.1-server.jar", 10),
            ("run.jar", 10),
            ("zzz.jar", 500),
        ]);
        let first = resolve_artifact(tmp.path()).unwrap();
        let second = resolve_artifact(tmp.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_dir_resolves_to_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(resolve_artifact(tmp.path()).is_none());
    }

    #[test]
    fn stale_sidecar_is_rederived_and_rewritten() {
        let tmp = dir_with(&[("forge-1.20.1-server.jar", 10)]);
        write_sidecar(tmp.path(), &tmp.path().join("gone.jar")).unwrap();

        let resolved = resolve_with_sidecar(tmp.path()).unwrap();
        assert_eq!(resolved, tmp.path().join("forge-1.20.1-server.jar"));
        assert_eq!(read_sidecar(tmp.path()).unwrap(), resolved);
    }

    #[test]
    fn valid_sidecar_is_trusted_after_existence_check() {
        let tmp = dir_with(&[("forge-1.20.1-server.jar", 10), ("run.jar", 10)]);
        let jar = tmp.path().join("run.jar");
        write_sidecar(tmp.path(), &jar).unwrap();

        assert_eq!(resolve_with_sidecar(tmp.path()).unwrap(), jar);
    }

    #[test]
    fn missing_everything_is_artifact_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = resolve_with_sidecar(tmp.path()).unwrap_err();
        assert!(matches!(err, InstallerError::ArtifactNotFound { .. }));
    }
}
