use tracing::info;

use super::context::InstallContext;
use super::installer::{loader_failure, ArtifactHint, LoaderInstallOutcome, LoaderInstaller};
use crate::core::error::InstallerResult;
use crate::core::manifest::LoaderFamily;

/// Installs Forge by downloading and executing the official installer JAR
/// in server mode.
pub struct ForgeInstaller;

const FORGE_MAVEN: &str = "https://maven.minecraftforge.net";

#[async_trait::async_trait]
impl LoaderInstaller for ForgeInstaller {
    async fn install(&self, ctx: InstallContext<'_>) -> InstallerResult<LoaderInstallOutcome> {
        info!(
            "Installing Forge {} for MC {}",
            ctx.loader_version, ctx.game_version
        );

        let forge_id = format!("{}-{}", ctx.game_version, ctx.loader_version);
        let installer_name = format!("forge-{forge_id}-installer.jar");
        let installer_url = format!(
            "{FORGE_MAVEN}/net/minecraftforge/forge/{forge_id}/{installer_name}"
        );
        let installer_path = ctx.server_dir.join(&installer_name);

        ctx.fetcher
            .fetch_file(&installer_url, &installer_path)
            .await
            .map_err(|e| loader_failure(LoaderFamily::Forge, e))?;

        let args = vec![
            "-jar".to_string(),
            installer_path.to_string_lossy().to_string(),
            "--installServer".to_string(),
        ];
        ctx.runner
            .run_java(&args, ctx.server_dir, ctx.installer_timeout)
            .await
            .map_err(|e| loader_failure(LoaderFamily::Forge, e))?;

        // Installer and its log are scratch, never launch candidates.
        let _ = tokio::fs::remove_file(&installer_path).await;
        let _ = tokio::fs::remove_file(ctx.server_dir.join(format!("{installer_name}.log"))).await;

        info!("Forge {} installed", ctx.loader_version);

        Ok(LoaderInstallOutcome {
            hint: ArtifactHint::ServerJarGlob,
            manual_steps: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::core::downloader::Fetch;
    use crate::core::error::{InstallerError, InstallerResult};
    use crate::core::exec::Exec;

    struct RecordingFetcher {
        urls: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Fetch for RecordingFetcher {
        async fn fetch_file(&self, url: &str, dest: &Path) -> InstallerResult<()> {
            self.urls.lock().unwrap().push(url.to_string());
            if self.fail {
                return Err(InstallerError::DownloadFailed {
                    url: url.to_string(),
                    status: 404,
                });
            }
            tokio::fs::write(dest, b"jar").await.unwrap();
            Ok(())
        }

        async fn fetch_text(&self, _url: &str) -> InstallerResult<String> {
            unreachable!("forge install fetches no text")
        }
    }

    struct NoopRunner;

    #[async_trait::async_trait]
    impl Exec for NoopRunner {
        async fn run_java(
            &self,
            _args: &[String],
            _cwd: &Path,
            _timeout: Duration,
        ) -> InstallerResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn builds_vendor_url_from_game_and_loader_version() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = RecordingFetcher {
            urls: Mutex::new(vec![]),
            fail: false,
        };
        let runner = NoopRunner;

        let outcome = ForgeInstaller
            .install(InstallContext {
                game_version: "1.20.1",
                loader_version: "47.2.0",
                server_dir: tmp.path(),
                fetcher: &fetcher,
                runner: &runner,
                installer_timeout: Duration::from_secs(60),
            })
            .await
            .unwrap();

        let urls = fetcher.urls.lock().unwrap();
        assert_eq!(
            urls.as_slice(),
            &["https://maven.minecraftforge.net/net/minecraftforge/forge/1.20.1-47.2.0/forge-1.20.1-47.2.0-installer.jar"]
        );
        assert_eq!(outcome.hint, ArtifactHint::ServerJarGlob);
        assert!(outcome.manual_steps.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_is_fatal_and_names_the_family() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = RecordingFetcher {
            urls: Mutex::new(vec![]),
            fail: true,
        };
        let runner = NoopRunner;

        let err = ForgeInstaller
            .install(InstallContext {
                game_version: "1.20.1",
                loader_version: "47.2.0",
                server_dir: tmp.path(),
                fetcher: &fetcher,
                runner: &runner,
                installer_timeout: Duration::from_secs(60),
            })
            .await
            .unwrap_err();

        match err {
            InstallerError::LoaderInstall { family, .. } => {
                assert_eq!(family, LoaderFamily::Forge)
            }
            other => panic!("expected LoaderInstall, got {other:?}"),
        }
    }
}
