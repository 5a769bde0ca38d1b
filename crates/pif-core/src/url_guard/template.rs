//! Per-host canonical URL reconstruction.
//!
//! Each allowed host carries its own path pattern. The fetch URL is
//! re-synthesized from a literal prefix plus the pattern-constrained
//! captures, so nothing from the raw input's authority, query, or fragment
//! survives into it.

use once_cell::sync::Lazy;
use regex::Regex;

/// Image id, optionally with a 3-4 letter extension: `/{id}` or `/{id}.ext`.
static IMGUR_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/([a-zA-Z0-9]+)(\.[a-z]{3,4})?$").unwrap());

/// Direct image link: `/{id}.{jpg|jpeg|png|svg|gif}`.
static IMGUR_DIRECT_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^/([a-zA-Z0-9]+)\.(jpg|jpeg|png|svg|gif)$").unwrap());

/// Named file under `/images/`, alphanumerics/hyphen/underscore only.
static EXAMPLE_CDN_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^/images/([a-zA-Z0-9_-]+)\.(jpg|jpeg|png|svg|gif)$").unwrap());

/// The closed set of hosts profile images may be fetched from.
///
/// One variant per host, each with its own reconstruction rule. The set is
/// fixed at compile time; there is no wildcard and no way to extend it at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedHost {
    /// `imgur.com` gallery pages.
    Imgur,
    /// `i.imgur.com` direct image links.
    ImgurDirect,
    /// `cdn.example.com` hosted files.
    ExampleCdn,
}

impl AllowedHost {
    pub const ALL: [AllowedHost; 3] = [
        AllowedHost::Imgur,
        AllowedHost::ImgurDirect,
        AllowedHost::ExampleCdn,
    ];

    /// Normalized hostname this entry matches.
    pub fn hostname(self) -> &'static str {
        match self {
            AllowedHost::Imgur => "imgur.com",
            AllowedHost::ImgurDirect => "i.imgur.com",
            AllowedHost::ExampleCdn => "cdn.example.com",
        }
    }

    /// Rebuild the canonical fetch URL from a parsed path, or `None` when the
    /// path does not have the expected identifier shape for this host.
    pub fn rebuild(self, path: &str) -> Option<String> {
        match self {
            AllowedHost::Imgur => IMGUR_PATH.captures(path).map(|c| {
                let ext = c.get(2).map(|m| m.as_str()).unwrap_or("");
                format!("https://imgur.com/{}{}", &c[1], ext)
            }),
            AllowedHost::ImgurDirect => IMGUR_DIRECT_PATH
                .captures(path)
                .map(|c| format!("https://i.imgur.com/{}.{}", &c[1], &c[2])),
            AllowedHost::ExampleCdn => EXAMPLE_CDN_PATH
                .captures(path)
                .map(|c| format!("https://cdn.example.com/images/{}.{}", &c[1], &c[2])),
        }
    }
}
