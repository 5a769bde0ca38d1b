//! The profile-image upload pipeline.
//!
//! Per request: resolve identity, vet the raw URL, fetch the canonical URL
//! into the user's upload slot, record the outcome in the profile store.
//! Validation strictly precedes the fetch; the fetch strictly precedes the
//! persistence update. The canonical URL is the only thing ever fetched;
//! the raw input's sole remaining use after vetting is the extension guess.
//!
//! Concurrent requests for the same identity share one destination name and
//! its `.part` sibling; that race is accepted and last writer wins. Requests
//! for different identities never touch the same files.

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::fetcher::{FetchError, ImageFetcher};
use crate::profile_store::{ProfileDb, UserId};
use crate::storage::{self, UploadWriter};
use crate::url_guard;

pub use error::UploadError;

/// How a request ended, short of an error: either the image is on local disk
/// with the profile pointing at it, or the profile points at the sanitized
/// canonical URL because the download could not be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Stored { local_path: PathBuf },
    FallbackLink { url: String },
}

/// Run one image-URL upload request end to end.
///
/// `identity` is the session layer's resolved caller; `None` rejects
/// immediately with [`UploadError::Unauthorized`] before any parsing. On a
/// fetch or write failure the profile is updated with the canonical URL
/// instead (degraded fallback) and the request still succeeds; only a
/// profile-store failure surfaces as an error.
pub async fn run_image_url_upload(
    store: &ProfileDb,
    fetcher: Arc<dyn ImageFetcher>,
    upload_dir: &Path,
    identity: Option<&UserId>,
    raw_url: &str,
) -> Result<UploadOutcome, UploadError> {
    let user = identity.ok_or(UploadError::Unauthorized)?;

    let vetted = url_guard::vet(raw_url)?;

    let ext = storage::guess_image_extension(raw_url);
    let dest = storage::upload_path_for(upload_dir, user, ext);

    match fetch_into_slot(fetcher, vetted.canonical.clone(), &dest).await {
        Ok(()) => {
            let local = dest.display().to_string();
            store
                .set_image_ref(user, &local)
                .await
                .map_err(UploadError::Persist)?;
            tracing::info!("stored profile image for user {} at {}", user, local);
            Ok(UploadOutcome::Stored { local_path: dest })
        }
        Err(cause) => {
            tracing::warn!(
                "error retrieving profile image for user {}: {}; using sanitized image link instead",
                user,
                cause
            );
            store
                .set_image_ref(user, &vetted.canonical)
                .await
                .map_err(UploadError::Persist)?;
            Ok(UploadOutcome::FallbackLink {
                url: vetted.canonical,
            })
        }
    }
}

/// Download `canonical` into `dest` via its `.part` sibling. The final name
/// only ever appears once the body is fully written and synced; any failure
/// removes the partial file best-effort.
async fn fetch_into_slot(
    fetcher: Arc<dyn ImageFetcher>,
    canonical: String,
    dest: &Path,
) -> Result<(), FetchError> {
    let tmp = storage::temp_path(dest);
    let writer = UploadWriter::create(&tmp).map_err(FetchError::Write)?;

    let task_writer = writer.clone();
    let fetched = match tokio::task::spawn_blocking(move || {
        fetcher.fetch(&canonical, &task_writer)
    })
    .await
    {
        Ok(result) => result,
        Err(_) => Err(FetchError::Aborted),
    };

    let finished = match fetched {
        Ok(_bytes) => writer
            .sync()
            .and_then(|()| writer.finalize(dest))
            .map_err(FetchError::Write),
        Err(e) => Err(e),
    };

    if let Err(e) = finished {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}
