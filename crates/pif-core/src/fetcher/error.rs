//! Failure classification for the outbound image fetch.

use thiserror::Error;

/// Why a fetch attempt did not produce a stored image. `Write` is the only
/// variant that is the local disk's fault; everything else is the transfer.
/// None of the messages name local filesystem paths.
#[derive(Debug, Error)]
pub enum FetchError {
    /// libcurl reported an error (timeout, connect failure, TLS, ...).
    #[error("transfer failed: {0}")]
    Curl(#[from] curl::Error),

    /// Response had a non-2xx status.
    #[error("url returned HTTP {0}")]
    Http(u32),

    /// 2xx response that carried no body bytes.
    #[error("url returned an empty body")]
    EmptyBody,

    /// Body exceeded the configured size cap; the transfer was aborted.
    #[error("response body exceeded the {limit}-byte limit")]
    BodyTooLarge { limit: u64 },

    /// Writing the body to the upload slot failed (disk full, permissions).
    #[error("failed to write image to local storage")]
    Write(#[source] std::io::Error),

    /// The blocking transfer task was torn down before it finished.
    #[error("fetch task aborted before completion")]
    Aborted,
}
