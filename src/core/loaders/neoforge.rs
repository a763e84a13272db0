use tracing::info;

use super::context::InstallContext;
use super::installer::{loader_failure, ArtifactHint, LoaderInstallOutcome, LoaderInstaller};
use crate::core::error::InstallerResult;
use crate::core::manifest::LoaderFamily;

/// NeoForge installer — similar to Forge but its versioning is decoupled
/// from Minecraft releases, so the URL uses the loader version alone.
pub struct NeoForgeInstaller;

const NEOFORGE_MAVEN: &str = "https://maven.neoforged.net/releases";

#[async_trait::async_trait]
impl LoaderInstaller for NeoForgeInstaller {
    async fn install(&self, ctx: InstallContext<'_>) -> InstallerResult<LoaderInstallOutcome> {
        info!(
            "Installing NeoForge {} for MC {}",
            ctx.loader_version, ctx.game_version
        );

        let installer_name = format!("neoforge-{}-installer.jar", ctx.loader_version);
        let installer_path = ctx.server_dir.join(&installer_name);
        let installer_url = format!(
            "{NEOFORGE_MAVEN}/net/neoforged/neoforge/{}/{installer_name}",
            ctx.loader_version
        );

        if let Err(primary_err) = ctx.fetcher.fetch_file(&installer_url, &installer_path).await {
            // Legacy NeoForge for MC 1.20.1 was published under net.neoforged:forge
            let legacy_name = format!("forge-{}-installer.jar", ctx.loader_version);
            let legacy_url = format!(
                "{NEOFORGE_MAVEN}/net/neoforged/forge/{}/{legacy_name}",
                ctx.loader_version
            );
            info!(
                "Primary NeoForge route failed, trying legacy route: {}",
                legacy_url
            );
            ctx.fetcher
                .fetch_file(&legacy_url, &installer_path)
                .await
                .map_err(|_| loader_failure(LoaderFamily::NeoForge, primary_err))?;
        }

        let args = vec![
            "-jar".to_string(),
            installer_path.to_string_lossy().to_string(),
            "--installServer".to_string(),
        ];
        ctx.runner
            .run_java(&args, ctx.server_dir, ctx.installer_timeout)
            .await
            .map_err(|e| loader_failure(LoaderFamily::NeoForge, e))?;

        let _ = tokio::fs::remove_file(&installer_path).await;
        let _ = tokio::fs::remove_file(ctx.server_dir.join(format!("{installer_name}.log"))).await;

        info!("NeoForge {} installed", ctx.loader_version);

        Ok(LoaderInstallOutcome {
            hint: ArtifactHint::ServerJarGlob,
            manual_steps: vec![],
        })
    }
}
