pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::backup::{BackupHandle, BackupScheduler};
pub use crate::core::config::{BackupConfig, InstallConfig, MemoryConfig};
pub use crate::core::downloader::{Downloader, Fetch};
pub use crate::core::error::{exit_code, InstallerError, InstallerResult};
pub use crate::core::exec::{Exec, JavaRunner};
pub use crate::core::orchestrator::{
    AutoConfirm, Confirm, InstallOrchestrator, InstallReport, LaunchPlan,
};

/// Initialize structured logging. Call once from the hosting binary.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,packhost=debug")),
        )
        .init();
}
