// ─── Subprocess Execution ───

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::error::{InstallerError, InstallerResult};

/// Subprocess collaborator for vendor installers and the first server run.
/// Every execution is bounded: a hung child must not stall the installer.
#[async_trait]
pub trait Exec: Send + Sync {
    async fn run_java(
        &self,
        args: &[String],
        cwd: &Path,
        timeout: Duration,
    ) -> InstallerResult<()>;
}

/// Runs the `java` binary found on PATH (or an explicit one).
pub struct JavaRunner {
    java_bin: PathBuf,
}

impl JavaRunner {
    pub fn new() -> Self {
        Self {
            java_bin: PathBuf::from("java"),
        }
    }

    pub fn with_binary(java_bin: PathBuf) -> Self {
        Self { java_bin }
    }
}

impl Default for JavaRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Exec for JavaRunner {
    async fn run_java(
        &self,
        args: &[String],
        cwd: &Path,
        timeout: Duration,
    ) -> InstallerResult<()> {
        let cmdline = format!("{} {}", self.java_bin.display(), args.join(" "));
        info!("Running: {} (timeout {}s)", cmdline, timeout.as_secs());

        let mut command = tokio::process::Command::new(&self.java_bin);
        command
            .args(args)
            .current_dir(cwd)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| InstallerError::JavaExecution(format!("{cmdline}: {e}")))?;

        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => {
                result.map_err(|e| InstallerError::JavaExecution(format!("{cmdline}: {e}")))?
            }
            Err(_) => {
                return Err(InstallerError::ExecutionTimeout {
                    command: cmdline,
                    seconds: timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr.lines().rev().take(5).collect::<Vec<_>>().join(" | ");
            return Err(InstallerError::JavaExecution(format!(
                "{cmdline} exited with {:?}: {tail}",
                output.status.code()
            )));
        }

        debug!("Finished: {}", cmdline);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawn_failure_names_the_full_command_line() {
        let runner = JavaRunner::with_binary(PathBuf::from("/nonexistent/java-binary"));
        let tmp = tempfile::tempdir().unwrap();

        let err = runner
            .run_java(&["-version".to_string()], tmp.path(), Duration::from_secs(5))
            .await
            .unwrap_err();

        match err {
            InstallerError::JavaExecution(message) => {
                assert!(message.contains("/nonexistent/java-binary -version"), "{message}");
            }
            other => panic!("expected JavaExecution, got {other:?}"),
        }
    }
}
