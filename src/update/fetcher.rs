//! Asset download and staging.
//!
//! `AssetFetcher::download` pulls the asset body into a uniquely-named
//! file under the OS temp directory; the resulting [`DownloadedAsset`] is
//! the only way to reach `save`, so saving without a successful download
//! cannot be written.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use super::http::{HttpRequest, Transport};
use super::release::ReleaseAsset;
use super::UpdateError;

/// Monotonic suffix so two downloads in one process never collide.
static DOWNLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

/// Downloads release assets to temporary storage.
pub struct AssetFetcher {
    /// HTTP transport.
    transport: Arc<dyn Transport>,
}

impl AssetFetcher {
    /// Creates a fetcher over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Downloads the asset body to a temporary file.
    ///
    /// On transport failure no temporary file is created; on a write
    /// failure the partial file is removed before returning.
    ///
    /// # Errors
    /// `Transport` on request failure, `EmptyResponse` when the body is
    /// empty, `Filesystem` when the temporary file cannot be written.
    pub fn download(&self, asset: &ReleaseAsset) -> Result<DownloadedAsset, UpdateError> {
        info!("[UPDATE] Downloading asset: {}", asset.download_url);

        let body = self.transport.send(&HttpRequest::get(&asset.download_url))?;

        if body.is_empty() {
            warn!("[UPDATE] Asset download returned an empty body");
            return Err(UpdateError::EmptyResponse);
        }

        let temp_path = temp_download_path();
        if let Err(e) = fs::write(&temp_path, &body) {
            let _ = fs::remove_file(&temp_path);
            return Err(UpdateError::Filesystem(e));
        }

        debug!(
            "[UPDATE] Staged {} bytes at {}",
            body.len(),
            temp_path.display()
        );

        Ok(DownloadedAsset {
            temp_path: Some(temp_path),
        })
    }
}

/// A successfully downloaded asset, staged in a temporary file.
///
/// Exclusively owned by one upgrade attempt. Saving consumes the handle;
/// a handle dropped without saving removes its temporary file.
#[derive(Debug)]
pub struct DownloadedAsset {
    /// Present until `save` or `Drop` takes it.
    temp_path: Option<PathBuf>,
}

impl DownloadedAsset {
    /// Returns the staging path while the download is still held.
    #[must_use]
    pub fn temp_path(&self) -> Option<&Path> {
        self.temp_path.as_deref()
    }

    /// Copies the staged file to `destination`, then removes the staged
    /// file. Removal is best-effort: a failed delete does not mask a
    /// successful save.
    ///
    /// # Errors
    /// `Filesystem` when the copy fails; no guarantee is made about
    /// partial writes at `destination` in that case.
    pub fn save(mut self, destination: &Path) -> Result<(), UpdateError> {
        let Some(temp_path) = self.temp_path.take() else {
            return Err(UpdateError::NotReady);
        };

        let result = fs::copy(&temp_path, destination);

        if let Err(e) = fs::remove_file(&temp_path) {
            warn!(
                "[UPDATE] Could not remove staged file {}: {}",
                temp_path.display(),
                e
            );
        }

        match result {
            Ok(bytes) => {
                info!(
                    "[UPDATE] Saved {} bytes to {}",
                    bytes,
                    destination.display()
                );
                Ok(())
            }
            Err(e) => Err(UpdateError::Filesystem(e)),
        }
    }
}

impl Drop for DownloadedAsset {
    fn drop(&mut self) {
        if let Some(ref path) = self.temp_path {
            let _ = fs::remove_file(path);
        }
    }
}

/// Returns a unique staging path under the OS temp directory.
fn temp_download_path() -> PathBuf {
    let seq = DOWNLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
    env::temp_dir().join(format!("plugup-{}-{}.part", process::id(), seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct FakeTransport {
        response: Result<Vec<u8>, String>,
        calls: Mutex<u32>,
    }

    impl FakeTransport {
        fn ok(body: &[u8]) -> Self {
            Self {
                response: Ok(body.to_vec()),
                calls: Mutex::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(message.to_string()),
                calls: Mutex::new(0),
            }
        }
    }

    impl Transport for FakeTransport {
        fn send(&self, _request: &HttpRequest) -> Result<Vec<u8>, UpdateError> {
            *self.calls.lock().expect("call counter") += 1;
            self.response
                .clone()
                .map_err(UpdateError::Transport)
        }
    }

    fn asset() -> ReleaseAsset {
        ReleaseAsset {
            download_url: "https://example.com/plugin.zip".to_string(),
            content_type: "application/zip".to_string(),
            size: 7,
        }
    }

    #[test]
    fn test_download_then_save() {
        let dir = tempdir().expect("tempdir");
        let destination = dir.path().join("update.zip");

        let fetcher = AssetFetcher::new(Arc::new(FakeTransport::ok(b"archive")));
        let downloaded = fetcher.download(&asset()).expect("download succeeds");

        let staged = downloaded
            .temp_path()
            .expect("staging path present")
            .to_path_buf();
        assert!(staged.exists());

        downloaded.save(&destination).expect("save succeeds");

        assert_eq!(fs::read(&destination).expect("saved file"), b"archive");
        assert!(!staged.exists(), "staged file is removed after save");
    }

    #[test]
    fn test_transport_failure_leaves_no_artifact() {
        let fetcher = AssetFetcher::new(Arc::new(FakeTransport::failing("connection reset")));
        assert!(matches!(
            fetcher.download(&asset()),
            Err(UpdateError::Transport(_))
        ));
    }

    #[test]
    fn test_empty_body_is_failure() {
        let fetcher = AssetFetcher::new(Arc::new(FakeTransport::ok(b"")));
        assert!(matches!(
            fetcher.download(&asset()),
            Err(UpdateError::EmptyResponse)
        ));
    }

    #[test]
    fn test_dropped_download_cleans_up_staging() {
        let fetcher = AssetFetcher::new(Arc::new(FakeTransport::ok(b"archive")));
        let downloaded = fetcher.download(&asset()).expect("download succeeds");
        let staged = downloaded
            .temp_path()
            .expect("staging path present")
            .to_path_buf();

        drop(downloaded);
        assert!(!staged.exists());
    }

    #[test]
    fn test_save_overwrites_existing_destination() {
        let dir = tempdir().expect("tempdir");
        let destination = dir.path().join("update.zip");
        fs::write(&destination, b"stale").expect("seed destination");

        let fetcher = AssetFetcher::new(Arc::new(FakeTransport::ok(b"fresh")));
        let downloaded = fetcher.download(&asset()).expect("download succeeds");
        downloaded.save(&destination).expect("save succeeds");

        assert_eq!(fs::read(&destination).expect("saved file"), b"fresh");
    }
}
