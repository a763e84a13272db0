use tracing::{info, warn};

use super::context::InstallContext;
use super::installer::{ArtifactHint, LoaderInstallOutcome, LoaderInstaller};
use crate::core::error::InstallerResult;
use crate::core::server::artifact::QUILT_LAUNCH_JAR;

/// Quilt has no automated server installer here. The expected launch jar
/// is well known; when it is absent the operator gets a manual step, not
/// a failure.
pub struct QuiltInstaller;

#[async_trait::async_trait]
impl LoaderInstaller for QuiltInstaller {
    async fn install(&self, ctx: InstallContext<'_>) -> InstallerResult<LoaderInstallOutcome> {
        info!(
            "Quilt {} for MC {}: expecting {}",
            ctx.loader_version, ctx.game_version, QUILT_LAUNCH_JAR
        );

        let expected = ctx.server_dir.join(QUILT_LAUNCH_JAR);
        let mut manual_steps = Vec::new();
        if !expected.is_file() {
            let step = format!(
                "Quilt server launcher not found: place {} in {:?} (see https://quiltmc.org/en/install/server/)",
                QUILT_LAUNCH_JAR, ctx.server_dir
            );
            warn!("{}", step);
            manual_steps.push(step);
        }

        Ok(LoaderInstallOutcome {
            hint: ArtifactHint::Fixed(QUILT_LAUNCH_JAR),
            manual_steps,
        })
    }
}
