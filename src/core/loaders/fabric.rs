use serde::Deserialize;
use tracing::info;

use super::context::InstallContext;
use super::installer::{loader_failure, ArtifactHint, LoaderInstallOutcome, LoaderInstaller};
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::manifest::LoaderFamily;
use crate::core::server::artifact::FABRIC_LAUNCH_JAR;

/// Installs Fabric through its official installer, selected from the
/// Fabric Meta index.
pub struct FabricInstaller;

const FABRIC_META_BASE: &str = "https://meta.fabricmc.net/v2";

/// Minor releases Fabric Meta cannot resolve in their bare form, pinned
/// to a known-good patch.
const PINNED_VERSIONS: &[(&str, &str)] = &[("1.21", "1.21.1")];

/// One entry of the `/versions/installer` index.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallerBuild {
    pub url: String,
    pub version: String,
    pub stable: bool,
}

impl FabricInstaller {
    /// Pick the stable installer build, falling back to the newest entry.
    fn select_build(builds: &[InstallerBuild]) -> Option<&InstallerBuild> {
        builds
            .iter()
            .find(|b| b.stable)
            .or_else(|| builds.first())
    }

    /// Fabric Meta quirks: `x.y.0` must be requested as `x.y`, and some
    /// bare minors only resolve as a specific patch release.
    fn normalize_game_version(version: &str) -> String {
        let truncated = version.strip_suffix(".0").unwrap_or(version);
        for (bare, pinned) in PINNED_VERSIONS {
            if truncated == *bare {
                return (*pinned).to_string();
            }
        }
        truncated.to_string()
    }
}

#[async_trait::async_trait]
impl LoaderInstaller for FabricInstaller {
    async fn install(&self, ctx: InstallContext<'_>) -> InstallerResult<LoaderInstallOutcome> {
        info!(
            "Installing Fabric {} for MC {}",
            ctx.loader_version, ctx.game_version
        );

        let index_url = format!("{FABRIC_META_BASE}/versions/installer");
        let index_raw = ctx
            .fetcher
            .fetch_text(&index_url)
            .await
            .map_err(|e| loader_failure(LoaderFamily::Fabric, e))?;
        let builds: Vec<InstallerBuild> = serde_json::from_str(&index_raw)
            .map_err(|e| loader_failure(LoaderFamily::Fabric, e.into()))?;

        let build = Self::select_build(&builds).ok_or_else(|| {
            loader_failure(
                LoaderFamily::Fabric,
                InstallerError::Other("Fabric Meta installer index is empty".into()),
            )
        })?;
        info!("Selected Fabric installer {}", build.version);

        let installer_path = ctx.server_dir.join("fabric-installer.jar");
        ctx.fetcher
            .fetch_file(&build.url, &installer_path)
            .await
            .map_err(|e| loader_failure(LoaderFamily::Fabric, e))?;

        let game_version = Self::normalize_game_version(ctx.game_version);
        let mut args = vec![
            "-jar".to_string(),
            installer_path.to_string_lossy().to_string(),
            "server".to_string(),
            "-mcversion".to_string(),
            game_version,
            "-downloadMinecraft".to_string(),
        ];
        if !ctx.loader_version.is_empty() {
            args.push("-loader".to_string());
            args.push(ctx.loader_version.to_string());
        }

        ctx.runner
            .run_java(&args, ctx.server_dir, ctx.installer_timeout)
            .await
            .map_err(|e| loader_failure(LoaderFamily::Fabric, e))?;

        let _ = tokio::fs::remove_file(&installer_path).await;

        info!("Fabric installed");

        Ok(LoaderInstallOutcome {
            hint: ArtifactHint::Fixed(FABRIC_LAUNCH_JAR),
            manual_steps: vec![],
        })
    }
}
