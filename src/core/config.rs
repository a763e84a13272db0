use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Heap sizing inputs for [`crate::core::memory::compute_heap_flags`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Explicit size override, `"<N>G"` or `"<N>M"`. Wins over detection.
    pub explicit: Option<String>,
    /// Percent of detected host memory to give the server heap.
    pub percent: u64,
    pub min_mb: u64,
    pub max_mb: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            explicit: None,
            percent: 75,
            min_mb: 1024,
            max_mb: 12288,
        }
    }
}

/// Periodic world-backup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    pub enabled: bool,
    pub interval_hours: u64,
    /// Maximum backups kept per world before oldest-eviction.
    pub retention: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_hours: 6,
            retention: 5,
        }
    }
}

/// One immutable configuration value threaded through the whole pipeline.
/// No component reads ambient/global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Directory the server is installed into.
    pub server_dir: PathBuf,
    /// World directory name, also the backup file prefix.
    pub world_name: String,
    pub memory: MemoryConfig,
    pub backup: BackupConfig,
    /// `server.properties` keys applied after install, in order.
    pub properties: Vec<(String, String)>,
    /// Run the server once after install so it generates its files.
    pub first_run: bool,
    /// Hard cap on the first run; a hung server must not stall the installer.
    pub first_run_timeout_secs: u64,
    /// Cap on vendor installer subprocess execution.
    pub installer_timeout_secs: u64,
    /// Minimum free disk space required before any mutation.
    pub min_free_disk_mb: u64,
    /// Skip probing the host Java runtime (containers that provide it late).
    pub skip_runtime_check: bool,
}

impl InstallConfig {
    pub fn new(server_dir: PathBuf) -> Self {
        Self {
            server_dir,
            world_name: "world".to_string(),
            memory: MemoryConfig::default(),
            backup: BackupConfig::default(),
            properties: vec![("difficulty".to_string(), "normal".to_string())],
            first_run: false,
            first_run_timeout_secs: 600,
            installer_timeout_secs: 900,
            min_free_disk_mb: 2048,
            skip_runtime_check: false,
        }
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.server_dir.join("mods")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.server_dir.join("config")
    }

    pub fn world_dir(&self) -> PathBuf {
        self.server_dir.join(&self.world_name)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.server_dir.join("backups")
    }

    pub fn properties_path(&self) -> PathBuf {
        self.server_dir.join("server.properties")
    }
}
