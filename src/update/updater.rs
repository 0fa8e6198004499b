//! Update orchestration.
//!
//! Drives check → resolve → download → save → extract against a single
//! plugin installation directory. One `Updater` owns one upgrade attempt
//! at a time: `check()` and `upgrade()` take `&mut self`, so interleaved
//! upgrades through the same instance are rejected at compile time.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::archive::extract_zip;
use super::fetcher::AssetFetcher;
use super::http::Transport;
use super::release::{ReleaseClient, resolve_asset};
use super::UpdateError;

/// Default asset size ceiling in megabytes.
pub const DEFAULT_SIZE_LIMIT_MB: u64 = 2;

/// Filename the downloaded archive is staged under inside the plugin
/// directory before extraction.
pub const UPDATE_ARCHIVE_NAME: &str = "update.zip";

/// Converts a megabyte count to bytes. Decimal megabytes: 1 MB = 1 000 000.
#[must_use]
pub fn megabytes_to_bytes(mb: u64) -> u64 {
    mb * 1_000_000
}

/// Returns the name of the folder containing the plugin's entry file:
/// the last path segment before the trailing component.
#[must_use]
pub fn install_folder(plugin_file: &Path) -> Option<&OsStr> {
    plugin_file.parent()?.file_name()
}

/// Where the orchestrator is in one check/upgrade cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    /// Nothing in flight.
    Idle,
    /// Release listing in progress.
    Checking,
    /// Latest tag matches the installed version.
    UpToDate,
    /// Latest tag differs from the installed version.
    UpdateAvailable,
    /// Download and extraction in progress.
    Upgrading,
    /// Upgrade completed.
    Done,
    /// Check or upgrade failed.
    Failed,
}

/// Result of a version check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    /// Tag of the latest published release.
    pub latest_version: String,
    /// True when the latest tag differs (as an exact string, in either
    /// direction) from the installed version.
    pub available: bool,
}

/// Everything the orchestrator needs, passed in explicitly.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Version string of the installed plugin.
    pub installed_version: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Path to the plugin's entry file inside its install directory.
    pub plugin_file: PathBuf,
    /// Directory holding all plugin install directories.
    pub plugins_root: PathBuf,
    /// Asset size ceiling in bytes. Zero means the default (2 MB).
    pub size_limit_bytes: u64,
}

/// Sequences a full check/upgrade cycle for one plugin.
pub struct Updater {
    /// Installed plugin version, compared for exact equality.
    installed_version: String,
    /// Plugin entry file; names the install folder.
    plugin_file: PathBuf,
    /// Root directory for plugin installs.
    plugins_root: PathBuf,
    /// Asset size ceiling in bytes.
    size_limit_bytes: u64,
    /// Release API client.
    releases: ReleaseClient,
    /// Asset downloader.
    fetcher: AssetFetcher,
    /// Current phase.
    phase: UpdatePhase,
}

impl Updater {
    /// Creates an updater from explicit options and a transport.
    #[must_use]
    pub fn new(options: UpdateOptions, transport: Arc<dyn Transport>) -> Self {
        let size_limit_bytes = if options.size_limit_bytes == 0 {
            megabytes_to_bytes(DEFAULT_SIZE_LIMIT_MB)
        } else {
            options.size_limit_bytes
        };

        Self {
            installed_version: options.installed_version,
            plugin_file: options.plugin_file,
            plugins_root: options.plugins_root,
            size_limit_bytes,
            releases: ReleaseClient::new(transport.clone(), &options.owner, &options.repo),
            fetcher: AssetFetcher::new(transport),
            phase: UpdatePhase::Idle,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    /// Returns the installed version string.
    #[must_use]
    pub fn installed_version(&self) -> &str {
        &self.installed_version
    }

    /// Fetches the latest release tag and compares it to the installed
    /// version. Recomputed on every call; nothing is cached.
    ///
    /// # Errors
    /// Any listing failure is propagated: a failed check is never
    /// reported as "up to date".
    pub fn check(&mut self) -> Result<UpdateCheck, UpdateError> {
        self.phase = UpdatePhase::Checking;

        let result = self.run_check();
        self.phase = match &result {
            Ok(check) if check.available => UpdatePhase::UpdateAvailable,
            Ok(_) => UpdatePhase::UpToDate,
            Err(_) => UpdatePhase::Failed,
        };

        result
    }

    fn run_check(&self) -> Result<UpdateCheck, UpdateError> {
        let releases = self.releases.list_releases()?;
        let latest = releases.first().ok_or(UpdateError::NoReleases)?;

        let available = latest.tag_name != self.installed_version;
        info!(
            "[UPDATE] Installed {}, latest {} ({})",
            self.installed_version,
            latest.tag_name,
            if available { "update available" } else { "up to date" }
        );

        Ok(UpdateCheck {
            latest_version: latest.tag_name.clone(),
            available,
        })
    }

    /// Downloads the latest release's first asset and extracts it over the
    /// plugin's install directory. Valid only after a `check()` that found
    /// an update.
    ///
    /// Files already extracted before a failure stay in place; there is no
    /// rollback.
    ///
    /// # Errors
    /// `NotReady` when no update is staged; otherwise the first failing
    /// step's error. `AssetTooLarge` stops the cycle before any download.
    pub fn upgrade(&mut self) -> Result<(), UpdateError> {
        if self.phase != UpdatePhase::UpdateAvailable {
            return Err(UpdateError::NotReady);
        }

        self.phase = UpdatePhase::Upgrading;

        match self.run_upgrade() {
            Ok(()) => {
                self.phase = UpdatePhase::Done;
                Ok(())
            }
            Err(e) => {
                warn!("[UPDATE] Upgrade failed: {}", e);
                self.phase = UpdatePhase::Failed;
                Err(e)
            }
        }
    }

    fn run_upgrade(&self) -> Result<(), UpdateError> {
        let folder = install_folder(&self.plugin_file)
            .ok_or_else(|| UpdateError::InvalidInstallPath(self.plugin_file.clone()))?;
        let target = self.plugins_root.join(folder);

        // Re-query rather than reuse the check result: the listing is
        // never cached.
        let releases = self.releases.list_releases()?;
        let asset = resolve_asset(&releases, 0, 0, self.size_limit_bytes)?;

        let downloaded = self.fetcher.download(&asset)?;

        fs::create_dir_all(&target)?;
        let archive_path = target.join(UPDATE_ARCHIVE_NAME);
        downloaded.save(&archive_path)?;

        extract_zip(&archive_path, &target)?;

        // The staged archive is not part of the plugin; failure to remove
        // it does not fail the upgrade.
        if let Err(e) = fs::remove_file(&archive_path) {
            warn!(
                "[UPDATE] Could not remove staged archive {}: {}",
                archive_path.display(),
                e
            );
        }

        info!("[UPDATE] Plugin updated in {}", target.display());
        Ok(())
    }
}
