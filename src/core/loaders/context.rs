use std::path::Path;
use std::time::Duration;

use crate::core::downloader::Fetch;
use crate::core::exec::Exec;

/// Everything a loader installer needs, passed explicitly.
pub struct InstallContext<'a> {
    pub game_version: &'a str,
    pub loader_version: &'a str,
    pub server_dir: &'a Path,
    pub fetcher: &'a dyn Fetch,
    pub runner: &'a dyn Exec,
    /// Cap on vendor-installer subprocess execution.
    pub installer_timeout: Duration,
}
