//! Hostname normalization and closed-allowlist matching.
//!
//! Normalization runs before any comparison so `ImGuR.com`, `imgur.com.`,
//! and IDN-encoded homographs can never slip past a raw-string match while
//! the resolver later connects somewhere else.

use url::Url;

use super::error::GuardError;
use super::template::AllowedHost;

/// Normalize a hostname for allowlist comparison: IDN/punycode to ASCII,
/// ASCII-lowercase, trailing dot stripped.
pub fn normalize_hostname(host: &str) -> Result<String, GuardError> {
    let ascii = idna::domain_to_ascii(host).map_err(|_| GuardError::HostNotAllowed {
        host: host.to_string(),
    })?;

    let mut normalized = ascii.to_ascii_lowercase();
    if normalized.ends_with('.') {
        normalized.pop();
    }

    if normalized.is_empty() {
        return Err(GuardError::malformed("empty hostname"));
    }

    Ok(normalized)
}

/// Match a normalized hostname against the allowlist. Exact equality only;
/// entries are pushed through the same normalization so the comparison rules
/// cannot drift.
pub fn match_allowlist(normalized: &str) -> Option<AllowedHost> {
    AllowedHost::ALL.into_iter().find(|h| {
        normalize_hostname(h.hostname())
            .map(|n| n == normalized)
            .unwrap_or(false)
    })
}

/// Validate scheme and hostname of a parsed URL, returning the matched
/// allowlist entry.
///
/// The scheme gate comes first: a `file:` or `data:` URL is refused as
/// `SchemeNotAllowed` even though it would also fail the hostname check.
pub fn validate(url: &Url) -> Result<AllowedHost, GuardError> {
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(GuardError::SchemeNotAllowed {
                scheme: scheme.to_string(),
            });
        }
    }

    let host = url
        .host_str()
        .ok_or_else(|| GuardError::malformed("URL has no host"))?;

    let normalized = normalize_hostname(host)?;
    match_allowlist(&normalized).ok_or(GuardError::HostNotAllowed { host: normalized })
}
