// ─── Pack Manifest ───
// Parses the CurseForge-style manifest a client export ships with.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{InstallerError, InstallerResult};

/// Supported mod loaders — strongly typed, no magic strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoaderFamily {
    Forge,
    NeoForge,
    Fabric,
    Quilt,
}

impl std::fmt::Display for LoaderFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderFamily::Forge => write!(f, "forge"),
            LoaderFamily::NeoForge => write!(f, "neoforge"),
            LoaderFamily::Fabric => write!(f, "fabric"),
            LoaderFamily::Quilt => write!(f, "quilt"),
        }
    }
}

impl FromStr for LoaderFamily {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "neoforge" must be checked before "forge": it contains it.
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("neoforge") {
            Ok(LoaderFamily::NeoForge)
        } else if lower.starts_with("forge") {
            Ok(LoaderFamily::Forge)
        } else if lower.starts_with("fabric") {
            Ok(LoaderFamily::Fabric)
        } else if lower.starts_with("quilt") {
            Ok(LoaderFamily::Quilt)
        } else {
            Err(InstallerError::Manifest(format!(
                "Unknown mod loader id: {s}"
            )))
        }
    }
}

/// A `<family>-<version>` loader id decomposed, e.g. `forge-47.2.0`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoaderId {
    pub family: LoaderFamily,
    /// Empty when the manifest names the family without a version
    /// (e.g. a bare `fabric`).
    pub version: String,
}

impl FromStr for LoaderId {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let family = s.parse::<LoaderFamily>()?;
        let version = s
            .split_once('-')
            .map(|(_, v)| v.to_string())
            .unwrap_or_default();
        Ok(Self { family, version })
    }
}

/// What we need from a manifest: the game version and the loader id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestDescriptor {
    pub game_version: String,
    pub loader: LoaderId,
}

/// File names treated as a pack manifest, most common first.
pub const MANIFEST_FILE_NAMES: &[&str] = &["manifest.json", "minecraftinstance.json"];

impl ManifestDescriptor {
    /// Load and parse a manifest file from disk.
    pub async fn load(path: &Path) -> InstallerResult<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| InstallerError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        Self::from_value(&value)
    }

    /// Parse from an already-deserialized JSON document.
    ///
    /// Exporters disagree on where the loader id lives, so several paths
    /// are tried in a fixed fallback order.
    pub fn from_value(value: &serde_json::Value) -> InstallerResult<Self> {
        let game_version = value
            .pointer("/minecraft/version")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                InstallerError::Manifest("Manifest missing minecraft.version".to_string())
            })?
            .to_string();

        let loader_raw = ["/minecraft/modLoaders/0/id", "/modLoaders/0/id", "/modLoaders/0/uid", "/modLoader"]
            .iter()
            .find_map(|path| value.pointer(path).and_then(|v| v.as_str()))
            .ok_or_else(|| {
                InstallerError::Manifest("Manifest has no recognizable mod loader id".to_string())
            })?
            .to_ascii_lowercase();

        let loader = loader_raw.parse::<LoaderId>()?;
        debug!(
            "Manifest: minecraft {} with {} {}",
            game_version, loader.family, loader.version
        );

        Ok(Self {
            game_version,
            loader,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_curseforge_manifest_shape() {
        let json = serde_json::json!({
            "minecraft": {
                "version": "1.20.1",
                "modLoaders": [{ "id": "forge-47.2.0", "primary": true }]
            },
            "name": "Example Pack"
        });

        let descriptor = ManifestDescriptor::from_value(&json).unwrap();
        assert_eq!(descriptor.game_version, "1.20.1");
        assert_eq!(descriptor.loader.family, LoaderFamily::Forge);
        assert_eq!(descriptor.loader.version, "47.2.0");
    }

    #[test]
    fn falls_back_to_top_level_mod_loader_key() {
        let json = serde_json::json!({
            "minecraft": { "version": "1.21.1" },
            "modLoader": "NeoForge-21.1.77"
        });

        let descriptor = ManifestDescriptor::from_value(&json).unwrap();
        assert_eq!(descriptor.loader.family, LoaderFamily::NeoForge);
        assert_eq!(descriptor.loader.version, "21.1.77");
    }

    #[test]
    fn bare_fabric_id_has_empty_version() {
        let json = serde_json::json!({
            "minecraft": {
                "version": "1.20.4",
                "modLoaders": [{ "id": "fabric" }]
            }
        });

        let descriptor = ManifestDescriptor::from_value(&json).unwrap();
        assert_eq!(descriptor.loader.family, LoaderFamily::Fabric);
        assert!(descriptor.loader.version.is_empty());
    }

    #[test]
    fn neoforge_is_not_mistaken_for_forge() {
        assert_eq!(
            "neoforge-20.6.120".parse::<LoaderFamily>().unwrap(),
            LoaderFamily::NeoForge
        );
    }

    #[test]
    fn unknown_family_is_an_error() {
        assert!("liteloader-1.12".parse::<LoaderFamily>().is_err());
    }

    #[test]
    fn missing_loader_id_is_an_error() {
        let json = serde_json::json!({ "minecraft": { "version": "1.20.1" } });
        assert!(ManifestDescriptor::from_value(&json).is_err());
    }
}
