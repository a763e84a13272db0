pub mod archive;
pub mod backup;
pub mod config;
pub mod downloader;
pub mod error;
pub mod exec;
pub mod http;
pub mod java;
pub mod loaders;
pub mod manifest;
pub mod memory;
pub mod orchestrator;
pub mod server;

pub use config::InstallConfig;
pub use error::{InstallerError, InstallerResult};
