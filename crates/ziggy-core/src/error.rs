use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZiggyError {
    #[error("'{version}' isn't a known version")]
    UnknownVersion { version: String },

    #[error("{version} is not available for {platform}")]
    UnsupportedOnPlatform { version: String, platform: String },

    #[error("expected exactly one development build for {platform}, found {candidates}")]
    AmbiguousOrMissingDevBuild { platform: String, candidates: usize },

    #[error("{version} is not installed")]
    NotInstalled { version: String },

    #[error("Platform Not Supported: {os}-{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("connection to {url} failed: {message}")]
    Connection { url: String, message: String },

    #[error("download of {url} failed: {message}")]
    DownloadFailed { url: String, message: String },

    #[error("extracting {} failed: {message}", archive.display())]
    ExtractFailed { archive: PathBuf, message: String },

    #[error("failed to link {} -> {}: {source}", link.display(), target.display())]
    LinkFailed {
        link: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("install of {entry} could not be verified: {} does not exist", path.display())]
    InstallVerificationFailed { entry: String, path: PathBuf },

    #[error("failed to acquire store lock {}: {source}", path.display())]
    LockFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ZiggyError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// `1` for mistakes the user can correct, `2` for failures of the
    /// environment (network, filesystem, permissions).
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::UnknownVersion { .. }
            | Self::UnsupportedOnPlatform { .. }
            | Self::AmbiguousOrMissingDevBuild { .. }
            | Self::NotInstalled { .. } => 1,
            Self::UnsupportedPlatform { .. }
            | Self::Connection { .. }
            | Self::DownloadFailed { .. }
            | Self::ExtractFailed { .. }
            | Self::LinkFailed { .. }
            | Self::InstallVerificationFailed { .. }
            | Self::LockFailed { .. }
            | Self::Io { .. }
            | Self::Config(_) => 2,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

pub type Result<T, E = ZiggyError> = std::result::Result<T, E>;
