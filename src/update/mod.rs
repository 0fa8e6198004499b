//! Self-update engine.
//!
//! Checks a GitHub repository for a newer published release and installs it
//! in place by extracting the release's first asset (a ZIP archive) into the
//! plugin's installation directory.
//!
//! # Architecture
//!
//! - **http**: blocking HTTP transport with a trait seam for tests
//! - **release**: typed GitHub releases schema and API client
//! - **fetcher**: asset download to a temporary file, then save
//! - **archive**: ZIP extraction into the install directory
//! - **updater**: orchestration of check → download → extract
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use plugup::update::{HttpClient, UpdateOptions, Updater};
//!
//! let transport = Arc::new(HttpClient::new("plugup-updater", None)?);
//! let mut updater = Updater::new(UpdateOptions::default(), transport);
//! let check = updater.check()?;
//! if check.available {
//!     updater.upgrade()?;
//! }
//! ```

mod archive;
mod fetcher;
mod http;
mod release;
mod updater;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use archive::extract_zip;
pub use fetcher::{AssetFetcher, DownloadedAsset};
pub use http::{HttpClient, HttpMethod, HttpRequest, Transport};
pub use release::{Release, ReleaseAsset, ReleaseClient, resolve_asset};
pub use updater::{
    DEFAULT_SIZE_LIMIT_MB, UPDATE_ARCHIVE_NAME, UpdateCheck, UpdateOptions, UpdatePhase, Updater,
    install_folder, megabytes_to_bytes,
};

/// Errors produced by the update engine.
///
/// Everything here is returned to the caller; nothing is retried
/// automatically. `AssetTooLarge` is the one condition the engine refuses
/// to continue past: see [`UpdateError::is_fatal`].
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("network error: {0}")]
    Transport(String),

    /// The client was configured without a User-Agent. The GitHub API
    /// rejects requests that do not carry one.
    #[error("user agent must not be empty")]
    EmptyUserAgent,

    /// The server returned no body.
    #[error("server returned an empty response")]
    EmptyResponse,

    /// The release-list payload could not be parsed.
    #[error("malformed release listing: {0}")]
    Parse(String),

    /// The asset exceeds the configured size ceiling. Checked against the
    /// API-reported size before any transfer is attempted.
    #[error("release asset is {size} bytes, over the {limit} byte limit")]
    AssetTooLarge { size: u64, limit: u64 },

    /// Repository owner and name are both unset.
    #[error("repository owner and name are not configured")]
    MissingRepository,

    /// The repository has no published releases.
    #[error("no published releases found")]
    NoReleases,

    /// The selected release/asset index does not exist.
    #[error("release {release} has no asset at index {asset}")]
    MissingAsset { release: usize, asset: usize },

    /// The downloaded archive could not be opened.
    #[error("failed to open archive: {0}")]
    ArchiveOpen(String),

    /// The archive could not be extracted.
    #[error("failed to extract archive: {0}")]
    ArchiveExtract(String),

    /// Local filesystem failure (copy, create, delete).
    #[error("filesystem error: {0}")]
    Filesystem(#[from] io::Error),

    /// `upgrade()` was called without a staged update.
    #[error("no update staged; run a check first")]
    NotReady,

    /// The install folder could not be derived from the plugin path.
    #[error("cannot derive install folder from {0}")]
    InvalidInstallPath(PathBuf),
}

impl UpdateError {
    /// Returns true for conditions the caller must not continue past.
    ///
    /// Only the size-ceiling violation qualifies: the ceiling is an
    /// operator-set resource bound, and there is no recovery path for an
    /// asset that exceeds it.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AssetTooLarge { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_size_ceiling_is_fatal() {
        assert!(
            UpdateError::AssetTooLarge {
                size: 3_000_000,
                limit: 2_000_000
            }
            .is_fatal()
        );
        assert!(!UpdateError::EmptyResponse.is_fatal());
        assert!(!UpdateError::Transport("reset".to_string()).is_fatal());
        assert!(!UpdateError::NoReleases.is_fatal());
    }

    #[test]
    fn test_error_messages() {
        let err = UpdateError::AssetTooLarge {
            size: 3_000_000,
            limit: 2_000_000,
        };
        assert_eq!(
            err.to_string(),
            "release asset is 3000000 bytes, over the 2000000 byte limit"
        );

        let err = UpdateError::MissingAsset {
            release: 0,
            asset: 1,
        };
        assert_eq!(err.to_string(), "release 0 has no asset at index 1");
    }
}
