use async_trait::async_trait;

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::manifest::LoaderFamily;

use super::{
    context::InstallContext, fabric::FabricInstaller, forge::ForgeInstaller,
    neoforge::NeoForgeInstaller, quilt::QuiltInstaller,
};

/// Where the artifact resolver should expect the launchable jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactHint {
    /// A `*-server*.jar` produced by the vendor installer.
    ServerJarGlob,
    /// A well-known fixed file name.
    Fixed(&'static str),
}

/// Unified install result across loader families.
#[derive(Debug, Clone)]
pub struct LoaderInstallOutcome {
    pub hint: ArtifactHint,
    /// Non-fatal follow-ups the operator must do by hand.
    pub manual_steps: Vec<String>,
}

#[async_trait]
pub trait LoaderInstaller: Send + Sync {
    async fn install(&self, ctx: InstallContext<'_>) -> InstallerResult<LoaderInstallOutcome>;
}

/// Dispatcher without `Box<dyn>`.
pub enum Installer {
    Forge(ForgeInstaller),
    NeoForge(NeoForgeInstaller),
    Fabric(FabricInstaller),
    Quilt(QuiltInstaller),
}

impl Installer {
    pub fn new(family: LoaderFamily) -> Self {
        match family {
            LoaderFamily::Forge => Self::Forge(ForgeInstaller),
            LoaderFamily::NeoForge => Self::NeoForge(NeoForgeInstaller),
            LoaderFamily::Fabric => Self::Fabric(FabricInstaller),
            LoaderFamily::Quilt => Self::Quilt(QuiltInstaller),
        }
    }

    pub async fn install(&self, ctx: InstallContext<'_>) -> InstallerResult<LoaderInstallOutcome> {
        match self {
            Installer::Forge(i) => i.install(ctx).await,
            Installer::NeoForge(i) => i.install(ctx).await,
            Installer::Fabric(i) => i.install(ctx).await,
            Installer::Quilt(i) => i.install(ctx).await,
        }
    }
}

/// Any fetch or execution failure is fatal to the whole install and must
/// name the loader family and the underlying cause.
pub(super) fn loader_failure(family: LoaderFamily, cause: InstallerError) -> InstallerError {
    match cause {
        already @ InstallerError::LoaderInstall { .. } => already,
        other => InstallerError::LoaderInstall {
            family,
            message: other.to_string(),
        },
    }
}
