//! GitHub releases API client.
//!
//! Fetches the release list for a repository and resolves a single
//! downloadable asset from it, enforcing the size ceiling before any
//! transfer of the asset body.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::http::{HttpRequest, Transport};
use super::UpdateError;

/// GitHub API base URL.
const GITHUB_API: &str = "https://api.github.com";

/// Accept header for GitHub API calls.
const ACCEPT_HEADER: &str = "Accept: application/vnd.github.v3+json";

/// A published release.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Version tag. Opaque: compared for exact equality, never ordered.
    pub tag_name: String,
    /// Downloadable assets attached to the release, in API order.
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Direct download URL (redirects to a CDN).
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    /// Content type reported by the API. Informational only.
    #[serde(default)]
    pub content_type: String,
    /// Asset size in bytes as reported by the API.
    #[serde(default)]
    pub size: u64,
}

/// Client for a single repository's releases.
pub struct ReleaseClient {
    /// HTTP transport.
    transport: Arc<dyn Transport>,
    /// Repository owner.
    owner: String,
    /// Repository name.
    repo: String,
}

impl ReleaseClient {
    /// Creates a client for `owner/repo`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, owner: &str, repo: &str) -> Self {
        Self {
            transport,
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }

    /// Returns the repository in `owner/repo` form.
    #[must_use]
    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Fetches the repository's releases, newest first.
    ///
    /// Fails without a network call when owner and repo are both empty;
    /// otherwise the request would land on the API root.
    ///
    /// # Errors
    /// `Transport` on request failure, `EmptyResponse` when the body is
    /// empty, `Parse` when the payload is not a release list.
    pub fn list_releases(&self) -> Result<Vec<Release>, UpdateError> {
        if self.owner.is_empty() && self.repo.is_empty() {
            warn!("[UPDATE] Release check skipped: no repository configured");
            return Err(UpdateError::MissingRepository);
        }

        let url = format!("{}/repos/{}/{}/releases", GITHUB_API, self.owner, self.repo);
        debug!("[UPDATE] Listing releases: GET {}", url);

        let body = self
            .transport
            .send(&HttpRequest::get(url).with_header(ACCEPT_HEADER))?;

        if body.is_empty() {
            warn!("[UPDATE] Release listing returned an empty body");
            return Err(UpdateError::EmptyResponse);
        }

        let releases: Vec<Release> = serde_json::from_slice(&body).map_err(|e| {
            warn!("[UPDATE] Failed to parse release listing: {}", e);
            UpdateError::Parse(e.to_string())
        })?;

        info!(
            "[UPDATE] {}/{}: {} release(s)",
            self.owner,
            self.repo,
            releases.len()
        );

        Ok(releases)
    }
}

/// Selects `releases[release_index].assets[asset_index]`, enforcing the
/// size ceiling before any transfer of the asset body.
///
/// # Errors
/// `MissingAsset` when either index is out of range; `AssetTooLarge` when
/// the API-reported size exceeds `size_limit_bytes`; callers must not
/// continue past that one.
pub fn resolve_asset(
    releases: &[Release],
    release_index: usize,
    asset_index: usize,
    size_limit_bytes: u64,
) -> Result<ReleaseAsset, UpdateError> {
    let asset = releases
        .get(release_index)
        .and_then(|release| release.assets.get(asset_index))
        .ok_or(UpdateError::MissingAsset {
            release: release_index,
            asset: asset_index,
        })?;

    if asset.size > size_limit_bytes {
        warn!(
            "[UPDATE] Asset {} is {} bytes, over the {} byte limit",
            asset.download_url, asset.size, size_limit_bytes
        );
        return Err(UpdateError::AssetTooLarge {
            size: asset.size,
            limit: size_limit_bytes,
        });
    }

    debug!(
        "[UPDATE] Resolved asset {} ({}, {} bytes)",
        asset.download_url, asset.content_type, asset.size
    );

    Ok(asset.clone())
}
