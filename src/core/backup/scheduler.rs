// ─── Backup Scheduler ───
// One long-lived background task per world. Ticks are strictly
// sequential: archive and retention fully complete before the next sleep.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::archive::{archive_world, prune_backups, BackupLock};
use crate::core::config::InstallConfig;
use crate::core::error::InstallerResult;

pub struct BackupScheduler {
    world_dir: PathBuf,
    backups_dir: PathBuf,
    world_name: String,
    interval: Duration,
    retention: usize,
}

/// Handle to a running scheduler. Dropping it does NOT stop the task;
/// call [`BackupHandle::stop`] for a clean shutdown.
pub struct BackupHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl BackupHandle {
    /// Signal shutdown and wait for the task to finish. A tick in
    /// progress completes fully; one not yet started never begins.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.join.await;
    }
}

impl BackupScheduler {
    pub fn new(
        world_dir: PathBuf,
        backups_dir: PathBuf,
        world_name: String,
        interval: Duration,
        retention: usize,
    ) -> Self {
        Self {
            world_dir,
            backups_dir,
            world_name,
            interval,
            retention,
        }
    }

    pub fn from_config(config: &InstallConfig) -> Self {
        Self::new(
            config.world_dir(),
            config.backups_dir(),
            config.world_name.clone(),
            Duration::from_secs(config.backup.interval_hours * 3600),
            config.backup.retention,
        )
    }

    /// Spawn the tick loop. The stop signal is observed at the top of
    /// each iteration and during the sleep.
    pub fn start(self) -> BackupHandle {
        let (shutdown, mut rx) = watch::channel(false);
        info!(
            "Backup scheduler started for {:?} (every {}s, retention {})",
            self.world_name,
            self.interval.as_secs(),
            self.retention
        );

        let scheduler = Arc::new(self);
        let join = tokio::spawn(async move {
            loop {
                if *rx.borrow() {
                    break;
                }

                // Zip archiving is synchronous; keep it off the async
                // workers. Awaiting the handle keeps ticks sequential.
                let this = Arc::clone(&scheduler);
                match tokio::task::spawn_blocking(move || this.tick()).await {
                    Ok(Err(e)) => warn!("Backup tick failed: {}", e),
                    Err(e) => warn!("Backup tick panicked: {}", e),
                    Ok(Ok(())) => {}
                }

                tokio::select! {
                    _ = tokio::time::sleep(scheduler.interval) => {}
                    changed = rx.changed() => {
                        if changed.is_err() || *rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Backup scheduler stopped for {:?}", scheduler.world_name);
        });

        BackupHandle { shutdown, join }
    }

    /// One full backup cycle: archive, then evict beyond retention.
    ///
    /// An absent world directory skips archiving with a warning — the
    /// server may simply not have generated it yet.
    pub fn tick(&self) -> InstallerResult<()> {
        if !self.world_dir.is_dir() {
            warn!(
                "World directory {:?} does not exist, skipping backup",
                self.world_dir
            );
            return Ok(());
        }

        let _lock = BackupLock::acquire(&self.backups_dir)?;
        archive_world(&self.world_dir, &self.backups_dir, &self.world_name)?;
        prune_backups(&self.backups_dir, &self.world_name, self.retention)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backup::archive::list_backups;
    use std::fs;

    fn scheduler(tmp: &tempfile::TempDir) -> BackupScheduler {
        BackupScheduler::new(
            tmp.path().join("world"),
            tmp.path().join("backups"),
            "world".to_string(),
            Duration::from_secs(3600),
            3,
        )
    }

    #[test]
    fn tick_enforces_retention_after_archiving() {
        let tmp = tempfile::tempdir().unwrap();
        let sched = scheduler(&tmp);
        fs::create_dir_all(tmp.path().join("world")).unwrap();
        fs::write(tmp.path().join("world/level.dat"), b"level").unwrap();

        let backups = tmp.path().join("backups");
        fs::create_dir_all(&backups).unwrap();
        for stamp in ["20240101-000001", "20240101-000002", "20240101-000003", "20240101-000004", "20240101-000005"] {
            fs::write(backups.join(format!("world-{stamp}.zip")), b"zip").unwrap();
        }

        sched.tick().unwrap();

        let remaining = list_backups(&backups, "world").unwrap();
        assert_eq!(remaining.len(), 3);
        // The fresh archive is among the survivors.
        assert!(remaining
            .iter()
            .all(|p| !p.ends_with("world-20240101-000001.zip")));
    }

    #[test]
    fn tick_skips_when_world_is_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let sched = scheduler(&tmp);

        sched.tick().unwrap();

        let backups = list_backups(&tmp.path().join("backups"), "world").unwrap();
        assert!(backups.is_empty());
    }

    #[tokio::test]
    async fn first_tick_runs_through_the_spawned_loop() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("world")).unwrap();
        fs::write(tmp.path().join("world/level.dat"), b"level").unwrap();

        let handle = scheduler(&tmp).start();
        // The first tick fires immediately; give the blocking task time.
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.stop().await;

        let backups = list_backups(&tmp.path().join("backups"), "world").unwrap();
        assert_eq!(backups.len(), 1);
    }

    #[tokio::test]
    async fn stop_signal_shuts_the_loop_down() {
        let tmp = tempfile::tempdir().unwrap();
        let handle = scheduler(&tmp).start();

        // Must return promptly even though the interval is an hour.
        tokio::time::timeout(Duration::from_secs(5), handle.stop())
            .await
            .expect("scheduler did not stop in time");
    }

    #[test]
    fn tick_does_not_run_while_restore_holds_the_lock() {
        let tmp = tempfile::tempdir().unwrap();
        let sched = scheduler(&tmp);
        fs::create_dir_all(tmp.path().join("world")).unwrap();
        fs::write(tmp.path().join("world/level.dat"), b"level").unwrap();

        let lock = BackupLock::acquire(&tmp.path().join("backups")).unwrap();
        assert!(sched.tick().is_err());
        drop(lock);
        assert!(sched.tick().is_ok());
    }
}
