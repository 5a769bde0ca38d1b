//! Upload-slot naming and file lifecycle for fetched profile images.
//!
//! Each caller identity owns exactly one slot: `<upload_dir>/<id>.<ext>`.
//! Bytes stream into a `.part` sibling first and are renamed into place only
//! once the transfer has fully completed, so persisted state never points at
//! a half-written file.

mod writer;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::PifConfig;
use crate::profile_store::UserId;

pub use writer::UploadWriter;

/// Temporary file suffix used before the atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Extensions a stored image may carry. Anything else falls back to the
/// default.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "svg", "gif"];

const DEFAULT_EXTENSION: &str = "jpg";

/// Longest identity fragment kept in a filename.
const IDENTITY_MAX: usize = 100;

/// Path for the temp file: appends `.part` to the final path
/// (e.g. `u1.jpg` → `u1.jpg.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Default upload directory under the XDG data dir
/// (`~/.local/share/pif/uploads`).
pub fn default_upload_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pif")?;
    Ok(xdg_dirs.get_data_home().join("uploads"))
}

/// Resolve the configured upload directory, falling back to the default.
pub fn resolve_upload_dir(cfg: &PifConfig) -> Result<PathBuf> {
    match &cfg.upload_dir {
        Some(dir) => Ok(dir.clone()),
        None => default_upload_dir(),
    }
}

/// Destination path for a caller's image: the identity (sanitized for
/// filesystem use) plus the guessed extension, inside the fixed upload dir.
/// One slot per identity; a repeat request overwrites (last writer wins).
pub fn upload_path_for(upload_dir: &Path, user: &UserId, ext: &str) -> PathBuf {
    upload_dir.join(format!("{}.{}", sanitize_identity(user.as_str()), ext))
}

/// Guess the stored extension from the raw user-supplied URL's trailing
/// extension, constrained to [`IMAGE_EXTENSIONS`]. Unrecognized or absent
/// extensions become `jpg`.
///
/// Operates on the raw string, not the canonical URL: a gallery link like
/// `imgur.com/abc123` has no usable extension and lands on the default.
pub fn guess_image_extension(raw_url: &str) -> &'static str {
    let trailing = raw_url.rsplit('.').next().unwrap_or("");
    let lower = trailing.to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .into_iter()
        .find(|e| *e == lower)
        .unwrap_or(DEFAULT_EXTENSION)
}

/// Reduce an opaque caller identity to a safe filename fragment. Identities
/// come from the session layer, not the request body, but nothing that could
/// name a directory or escape one is allowed through.
pub fn sanitize_identity(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let mut prev_underscore = false;

    for c in id.chars() {
        let keep = c.is_ascii_alphanumeric() || c == '-' || c == '.';
        let c = if keep { c } else { '_' };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(IDENTITY_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    let clipped = &trimmed[..take];

    if clipped.is_empty() {
        "user".to_string()
    } else {
        clipped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("/srv/uploads/u1.jpg"));
        assert_eq!(p.to_string_lossy(), "/srv/uploads/u1.jpg.part");
    }

    #[test]
    fn upload_path_is_keyed_by_identity_and_extension() {
        let user = UserId::from("42");
        let p = upload_path_for(Path::new("/srv/uploads"), &user, "png");
        assert_eq!(p.to_string_lossy(), "/srv/uploads/42.png");
    }

    #[test]
    fn guess_extension_from_trailing_component() {
        assert_eq!(guess_image_extension("https://i.imgur.com/abc.png"), "png");
        assert_eq!(guess_image_extension("https://i.imgur.com/abc.JPEG"), "jpeg");
        assert_eq!(guess_image_extension("https://imgur.com/abc123"), "jpg");
        assert_eq!(guess_image_extension("https://evil.com/a.exe"), "jpg");
        assert_eq!(guess_image_extension(""), "jpg");
    }

    #[test]
    fn sanitize_identity_blocks_traversal() {
        assert_eq!(sanitize_identity("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_identity("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_identity("..."), "user");
        assert_eq!(sanitize_identity(""), "user");
    }

    #[test]
    fn sanitize_identity_keeps_ordinary_ids() {
        assert_eq!(sanitize_identity("42"), "42");
        assert_eq!(sanitize_identity("alice-2"), "alice-2");
        assert_eq!(sanitize_identity("user.name"), "user.name");
    }

    #[test]
    fn sanitize_identity_collapses_and_clips() {
        assert_eq!(sanitize_identity("a   b"), "a_b");
        let long = "x".repeat(500);
        assert_eq!(sanitize_identity(&long).len(), IDENTITY_MAX);
    }

    #[test]
    fn write_sync_finalize_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("u1.jpg");
        let tp = temp_path(&final_path);

        let writer = UploadWriter::create(&tp).unwrap();
        writer.write_at(0, b"hello ").unwrap();
        writer.write_at(6, b"image").unwrap();
        writer.sync().unwrap();
        writer.finalize(&final_path).unwrap();

        assert!(!tp.exists());
        let mut buf = String::new();
        std::fs::File::open(&final_path)
            .unwrap()
            .read_to_string(&mut buf)
            .unwrap();
        assert_eq!(buf, "hello image");
    }

    #[test]
    fn create_truncates_a_stale_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let tp = dir.path().join("u1.jpg.part");
        std::fs::write(&tp, b"stale bytes from an earlier attempt").unwrap();

        let writer = UploadWriter::create(&tp).unwrap();
        writer.write_at(0, b"new").unwrap();
        writer.sync().unwrap();
        drop(writer);

        assert_eq!(std::fs::read(&tp).unwrap(), b"new");
    }
}
