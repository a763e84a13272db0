use std::path::PathBuf;
use thiserror::Error;

use crate::core::manifest::LoaderFamily;

/// Central error type for the installer backend.
/// Every module returns `Result<T, InstallerError>`.
#[derive(Debug, Error)]
pub enum InstallerError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Prerequisites ───────────────────────────────────
    #[error("Prerequisite missing: {message}")]
    Prerequisite {
        message: String,
        /// Concrete command the user can run to fix it, when known.
        remediation: Option<String>,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Archive ─────────────────────────────────────────
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Unsafe path in archive: {0}")]
    UnsafeArchivePath(String),

    #[error("Archive is neither a server pack nor a client export: {0}")]
    Classification(String),

    // ── Manifest ────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Manifest error: {0}")]
    Manifest(String),

    // ── Java runtime ────────────────────────────────────
    #[error("Java {required} required but {found} installed")]
    JavaIncompatible { required: u32, found: String },

    #[error("Java execution failed: {0}")]
    JavaExecution(String),

    #[error("Process timed out after {seconds}s: {command}")]
    ExecutionTimeout { command: String, seconds: u64 },

    // ── Loader ──────────────────────────────────────────
    #[error("{family} install failed: {message}")]
    LoaderInstall {
        family: LoaderFamily,
        message: String,
    },

    // ── Server files ────────────────────────────────────
    #[error("No launchable server jar found in {dir:?}")]
    ArtifactNotFound { dir: PathBuf },

    #[error("Cannot update properties at {path:?}: {message}")]
    PropertyUpdate { path: PathBuf, message: String },

    #[error("EULA not accepted")]
    EulaRejected,

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type InstallerResult<T> = Result<T, InstallerError>;

impl From<std::io::Error> for InstallerError {
    fn from(source: std::io::Error) -> Self {
        InstallerError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

/// Exit codes surfaced to the calling automation, one per failure class
/// so scripts can branch on what went wrong.
pub mod exit_code {
    pub const PREREQUISITE: i32 = 2;
    pub const CLASSIFICATION: i32 = 3;
    pub const RUNTIME: i32 = 4;
    pub const DOWNLOAD: i32 = 5;
    pub const INSTALL: i32 = 6;
    pub const EULA_REJECTED: i32 = 7;
    pub const START: i32 = 8;
    pub const GENERIC: i32 = 1;
}

impl InstallerError {
    /// Map this error to its exit-code class.
    pub fn exit_code(&self) -> i32 {
        match self {
            InstallerError::Prerequisite { .. } => exit_code::PREREQUISITE,
            InstallerError::Classification(_) | InstallerError::UnsafeArchivePath(_) => {
                exit_code::CLASSIFICATION
            }
            InstallerError::JavaIncompatible { .. } => exit_code::RUNTIME,
            InstallerError::Http(_)
            | InstallerError::DownloadFailed { .. }
            | InstallerError::Sha1Mismatch { .. } => exit_code::DOWNLOAD,
            InstallerError::LoaderInstall { .. }
            | InstallerError::Manifest(_)
            | InstallerError::Zip(_)
            | InstallerError::Json(_) => exit_code::INSTALL,
            InstallerError::EulaRejected => exit_code::EULA_REJECTED,
            InstallerError::ArtifactNotFound { .. }
            | InstallerError::JavaExecution(_)
            | InstallerError::ExecutionTimeout { .. } => exit_code::START,
            _ => exit_code::GENERIC,
        }
    }

    /// Remediation hint shown alongside fatal errors, when one is known.
    pub fn remediation(&self) -> Option<String> {
        match self {
            InstallerError::Prerequisite { remediation, .. } => remediation.clone(),
            InstallerError::JavaIncompatible { required, .. } => Some(format!(
                "apt install openjdk-{required}-jre-headless"
            )),
            _ => None,
        }
    }
}
