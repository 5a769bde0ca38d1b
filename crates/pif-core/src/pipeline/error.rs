//! Errors surfaced to the caller of the upload pipeline.

use thiserror::Error;

use crate::url_guard::GuardError;

/// Terminal pipeline errors. Fetch and write failures do not appear here:
/// they degrade to the fallback link instead of failing the request, so the
/// only store-related error a caller can see is `Persist`.
#[derive(Debug, Error)]
pub enum UploadError {
    /// No resolved identity for the request; nothing was processed.
    #[error("no authenticated user for profile image upload")]
    Unauthorized,

    /// The URL was rejected by one of the vetting stages.
    #[error(transparent)]
    Rejected(#[from] GuardError),

    /// The profile store update failed (on the success path, or for the
    /// degraded fallback itself).
    #[error("failed to persist profile image reference: {0}")]
    Persist(anyhow::Error),
}
