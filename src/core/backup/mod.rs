pub mod archive;
pub mod scheduler;

pub use archive::{archive_world, list_backups, prune_backups, restore_backup, BackupLock};
pub use scheduler::{BackupHandle, BackupScheduler};
