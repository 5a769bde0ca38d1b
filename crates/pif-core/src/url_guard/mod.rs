//! SSRF guard for user-supplied image URLs.
//!
//! Three stages, each consuming only the previous stage's output: strict
//! parsing, hostname validation against a closed allowlist, and per-host
//! canonical URL reconstruction. A URL that survives all three is safe to
//! fetch; the raw input string itself is never handed to the network layer.

mod error;
mod host;
mod parse;
mod template;

pub use error::GuardError;
pub use host::{match_allowlist, normalize_hostname, validate as validate_host};
pub use parse::parse_image_url;
pub use template::AllowedHost;

/// A vetted image URL: the matched allowlist entry plus the canonical fetch
/// URL synthesized from validated path fragments.
#[derive(Debug, Clone)]
pub struct VettedUrl {
    pub host: AllowedHost,
    pub canonical: String,
}

/// Run the full vetting chain on a raw image URL.
pub fn vet(raw: &str) -> Result<VettedUrl, GuardError> {
    let parsed = parse_image_url(raw)?;
    let host = host::validate(&parsed)?;
    let canonical = host
        .rebuild(parsed.path())
        .ok_or_else(|| GuardError::InvalidIdentifier {
            host: host.hostname().to_string(),
        })?;

    Ok(VettedUrl { host, canonical })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vets_direct_image_link() {
        let vetted = vet("https://i.imgur.com/abc123.jpg").unwrap();
        assert_eq!(vetted.host, AllowedHost::ImgurDirect);
        assert_eq!(vetted.canonical, "https://i.imgur.com/abc123.jpg");
    }

    #[test]
    fn malformed_input_is_rejected_before_the_allowlist_check() {
        assert!(matches!(
            vet("not a url"),
            Err(GuardError::MalformedUrl { .. })
        ));
    }

    #[test]
    fn unknown_host_is_rejected() {
        assert!(matches!(
            vet("https://evil.com/a.jpg"),
            Err(GuardError::HostNotAllowed { .. })
        ));
    }

    #[test]
    fn bad_identifier_on_allowed_host_is_rejected() {
        assert!(matches!(
            vet("https://i.imgur.com/a/b/c.jpg"),
            Err(GuardError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            vet("https://imgur.com/solve/challenges"),
            Err(GuardError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn canonical_url_drops_query_port_and_fragment() {
        let vetted = vet("https://i.imgur.com:8443/abc.jpg?redirect=http://evil#x").unwrap();
        assert_eq!(vetted.canonical, "https://i.imgur.com/abc.jpg");
    }

    #[test]
    fn canonical_url_upgrades_http_to_https() {
        // Templates always emit the https literal prefix, whatever the raw
        // scheme was.
        let vetted = vet("http://imgur.com/abc123").unwrap();
        assert_eq!(vetted.canonical, "https://imgur.com/abc123");
    }

    #[test]
    fn adversarial_raw_input_never_equals_the_fetch_url() {
        let raw = "https://i.imgur.com/abc.jpg?next=//attacker.com";
        let vetted = vet(raw).unwrap();
        assert_ne!(vetted.canonical, raw);
    }
}
