// ─── Install Orchestration ───
// Sequences the pipeline: extract, classify, install, merge, resolve,
// configure. Fatal errors abort with their exit-code class; warnings
// accumulate and come back in the report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use crate::core::archive::{classify, extract_zip, find_manifest, find_start_script, Classification};
use crate::core::config::InstallConfig;
use crate::core::downloader::Fetch;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::exec::Exec;
use crate::core::java::{
    detect_installed_runtime_major, required_runtime_major, satisfies_requirement,
};
use crate::core::java::detect::remediation_for;
use crate::core::loaders::{InstallContext, Installer};
use crate::core::manifest::ManifestDescriptor;
use crate::core::memory::compute_heap_flags;
use crate::core::server::artifact::resolve_with_sidecar;
use crate::core::server::overrides::{copy_tree, merge_overrides};
use crate::core::server::properties::PropertyFile;

const STAGING_DIR: &str = ".pack-staging";
const EULA_PROMPT: &str =
    "You must accept the Minecraft EULA (https://aka.ms/MinecraftEULA) to run a server. Accept?";

/// Interactive confirmation collaborator. Prompt wording and terminal
/// handling live outside this crate.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str, default: bool) -> bool;
}

/// Non-interactive answer, for automation.
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str, _default: bool) -> bool {
        self.0
    }
}

/// What an install run produced.
#[derive(Debug)]
pub struct InstallReport {
    pub classification: Classification,
    /// Resolved server jar. `None` only when a manual loader step is
    /// still pending (Quilt).
    pub artifact: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Command line for one server start, re-derived at every launch.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub java_args: Vec<String>,
    pub workdir: PathBuf,
}

pub struct InstallOrchestrator {
    config: InstallConfig,
    fetcher: Box<dyn Fetch>,
    runner: Box<dyn Exec>,
    confirm: Box<dyn Confirm>,
}

impl InstallOrchestrator {
    pub fn new(
        config: InstallConfig,
        fetcher: Box<dyn Fetch>,
        runner: Box<dyn Exec>,
        confirm: Box<dyn Confirm>,
    ) -> Self {
        Self {
            config,
            fetcher,
            runner,
            confirm,
        }
    }

    pub fn config(&self) -> &InstallConfig {
        &self.config
    }

    /// Run the full installation pipeline on a pack archive.
    pub async fn install(&self, archive_path: &Path) -> InstallerResult<InstallReport> {
        self.check_prerequisites(archive_path)?;
        let mut warnings = Vec::new();

        // Extract into a staging directory so a broken archive never
        // litters the server root.
        let staging = self.config.server_dir.join(STAGING_DIR);
        if staging.exists() {
            tokio::fs::remove_dir_all(&staging)
                .await
                .map_err(|e| InstallerError::Io {
                    path: staging.clone(),
                    source: e,
                })?;
        }
        extract_zip(archive_path, &staging)?;

        let classification = classify(&staging);
        info!("Archive classified as {:?}", classification);

        let mut manual_pending = false;
        match classification {
            Classification::Invalid => {
                let _ = tokio::fs::remove_dir_all(&staging).await;
                return Err(InstallerError::Classification(format!(
                    "{archive_path:?} has neither a start script nor a manifest"
                )));
            }
            Classification::ServerPack => {
                // Already server-installed: copy everything through. The
                // pack root is the start script's directory, so a single
                // wrapper directory in the zip does not end up nested
                // inside the server dir.
                let script = find_start_script(&staging);
                let pack_root = script
                    .as_deref()
                    .and_then(Path::parent)
                    .unwrap_or(&staging);
                let copied = copy_tree(pack_root, &self.config.server_dir)?;
                info!("Server pack: copied {} files", copied);
            }
            Classification::ClientExport => {
                manual_pending = self.install_client_export(&staging, &mut warnings).await?;
            }
        }

        let _ = tokio::fs::remove_dir_all(&staging).await;

        // Resolve the launchable jar. Only a pending manual loader step
        // excuses not finding one.
        let artifact = match resolve_with_sidecar(&self.config.server_dir) {
            Ok(path) => {
                info!("Server jar: {:?}", path);
                Some(path)
            }
            Err(e) if manual_pending => {
                warnings.push(format!("Server jar not resolvable yet: {e}"));
                None
            }
            Err(e) => return Err(e),
        };

        self.accept_eula()?;
        let property_warnings = self.write_properties()?;
        warnings.extend(property_warnings);

        if self.config.first_run {
            if let Some(jar) = &artifact {
                self.first_run(jar).await?;
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(InstallReport {
            classification,
            artifact,
            warnings,
        })
    }

    /// Returns whether manual loader steps remain outstanding.
    async fn install_client_export(
        &self,
        staging: &Path,
        warnings: &mut Vec<String>,
    ) -> InstallerResult<bool> {
        let manifest_path = find_manifest(staging).ok_or_else(|| {
            InstallerError::Manifest("Client export lost its manifest after extraction".into())
        })?;
        let descriptor = ManifestDescriptor::load(&manifest_path).await?;
        // Overrides live next to the manifest, not necessarily at the
        // staging root.
        let pack_root = manifest_path.parent().unwrap_or(staging);

        let required = required_runtime_major(&descriptor.game_version);
        info!(
            "Pack wants Minecraft {} with {} {} (Java {})",
            descriptor.game_version, descriptor.loader.family, descriptor.loader.version, required
        );
        self.check_runtime(required).await?;

        let installer = Installer::new(descriptor.loader.family);
        let outcome = installer
            .install(InstallContext {
                game_version: &descriptor.game_version,
                loader_version: &descriptor.loader.version,
                server_dir: &self.config.server_dir,
                fetcher: self.fetcher.as_ref(),
                runner: self.runner.as_ref(),
                installer_timeout: Duration::from_secs(self.config.installer_timeout_secs),
            })
            .await?;
        let manual_pending = !outcome.manual_steps.is_empty();
        warnings.extend(outcome.manual_steps);

        let merge = merge_overrides(pack_root, &self.config.server_dir)?;
        info!(
            "Merged {} files ({} sources absent)",
            merge.copied,
            merge.missing_sources.len()
        );
        warnings.extend(merge.warnings);

        Ok(manual_pending)
    }

    async fn check_runtime(&self, required: u32) -> InstallerResult<()> {
        if self.config.skip_runtime_check {
            return Ok(());
        }
        match detect_installed_runtime_major().await {
            Some(installed) if satisfies_requirement(installed, required) => Ok(()),
            Some(installed) => Err(InstallerError::JavaIncompatible {
                required,
                found: installed.to_string(),
            }),
            None => Err(InstallerError::Prerequisite {
                message: "No Java runtime found on PATH".into(),
                remediation: Some(remediation_for(required)),
            }),
        }
    }

    fn check_prerequisites(&self, archive_path: &Path) -> InstallerResult<()> {
        if !archive_path.is_file() {
            return Err(InstallerError::Prerequisite {
                message: format!("Pack archive {archive_path:?} does not exist"),
                remediation: None,
            });
        }
        std::fs::create_dir_all(&self.config.server_dir).map_err(|e| InstallerError::Io {
            path: self.config.server_dir.clone(),
            source: e,
        })?;
        ensure_min_disk_space(
            &self.config.server_dir,
            self.config.min_free_disk_mb * 1024 * 1024,
        )
    }

    fn accept_eula(&self) -> InstallerResult<()> {
        let eula_path = self.config.server_dir.join("eula.txt");
        if PropertyFile::load_or_default(&eula_path).get("eula") == Some("true") {
            return Ok(());
        }
        if !self.confirm.confirm(EULA_PROMPT, true) {
            return Err(InstallerError::EulaRejected);
        }
        let mut eula = PropertyFile::load_or_default(&eula_path);
        eula.upsert("eula", "true");
        eula.save(&eula_path)?;
        Ok(())
    }

    /// Materialize `server.properties` and apply the configured keys.
    /// Returns validation warnings.
    fn write_properties(&self) -> InstallerResult<Vec<String>> {
        let path = self.config.properties_path();
        if !path.exists() {
            std::fs::write(&path, "").map_err(|e| InstallerError::Io {
                path: path.clone(),
                source: e,
            })?;
        }

        let mut file = PropertyFile::load(&path)?;
        let mut changed = false;
        for (key, value) in &self.config.properties {
            changed |= file.upsert(key, value);
        }
        if changed {
            file.save(&path)?;
        }
        Ok(file.validate())
    }

    async fn first_run(&self, jar: &Path) -> InstallerResult<()> {
        info!("First run to generate server files...");
        let plan = self.launch_plan_for(jar);
        self.runner
            .run_java(
                &plan.java_args,
                &plan.workdir,
                Duration::from_secs(self.config.first_run_timeout_secs),
            )
            .await
    }

    /// Build the start command. Re-resolves the jar and re-sizes the heap
    /// every time: a single resolution is never trusted forever.
    pub fn prepare_launch(&self) -> InstallerResult<LaunchPlan> {
        let jar = resolve_with_sidecar(&self.config.server_dir)?;
        Ok(self.launch_plan_for(&jar))
    }

    fn launch_plan_for(&self, jar: &Path) -> LaunchPlan {
        let memory = &self.config.memory;
        let heap = compute_heap_flags(
            memory.explicit.as_deref(),
            memory.percent,
            memory.min_mb,
            memory.max_mb,
        );

        let mut java_args: Vec<String> = heap.split_whitespace().map(str::to_string).collect();
        java_args.push("-jar".to_string());
        java_args.push(jar.to_string_lossy().to_string());
        java_args.push("nogui".to_string());

        LaunchPlan {
            java_args,
            workdir: self.config.server_dir.clone(),
        }
    }
}

/// Refuse to install onto a nearly-full disk. Unknown mounts pass.
fn ensure_min_disk_space(path: &Path, minimum_bytes: u64) -> InstallerResult<()> {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut best_len = 0usize;
    let mut available = None;
    for disk in disks.list() {
        let mount = disk.mount_point();
        if canonical.starts_with(mount) {
            let len = mount.as_os_str().len();
            if len >= best_len {
                best_len = len;
                available = Some(disk.available_space());
            }
        }
    }
    match available {
        Some(bytes) if bytes < minimum_bytes => Err(InstallerError::Prerequisite {
            message: format!(
                "Only {} MB free at {:?}, need {}",
                bytes / (1024 * 1024),
                path,
                minimum_bytes / (1024 * 1024)
            ),
            remediation: None,
        }),
        _ => Ok(()),
    }
}
