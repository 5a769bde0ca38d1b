//! Rejection reasons for the URL vetting stages.

use thiserror::Error;

/// A request rejected before any network activity. Each variant maps to one
/// vetting stage; none of them carries local filesystem detail.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Input the standards URL parser cannot accept (or that smuggles
    /// credentials in the authority).
    #[error("invalid image URL: {reason}")]
    MalformedUrl { reason: String },

    /// Scheme other than http/https (file, ftp, data, ...).
    #[error("URL scheme '{scheme}' is not allowed, only http(s)")]
    SchemeNotAllowed { scheme: String },

    /// Hostname not on the closed allowlist after IDN/case normalization.
    #[error("image hosting domain '{host}' is not allowed")]
    HostNotAllowed { host: String },

    /// Path did not match the expected identifier shape for the host.
    #[error("invalid image identifier or path for trusted host '{host}'")]
    InvalidIdentifier { host: String },
}

impl GuardError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedUrl {
            reason: reason.into(),
        }
    }
}
