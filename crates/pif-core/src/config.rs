use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_max_image_bytes() -> Option<u64> {
    // 10 MiB is generous for an avatar.
    Some(10 * 1024 * 1024)
}

fn default_max_redirects() -> u32 {
    10
}

/// Global configuration loaded from `~/.config/pif/config.toml`.
///
/// The hostname allowlist and per-host URL templates are not configuration:
/// they are compiled into `url_guard` and fixed at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PifConfig {
    /// Directory fetched images are written to. When unset, the XDG data
    /// directory (`~/.local/share/pif/uploads`) is used.
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
    /// Connect timeout for the outbound image fetch, in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout for the outbound image fetch, in seconds.
    pub fetch_timeout_secs: u64,
    /// Maximum accepted response body size in bytes (None = uncapped).
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: Option<u64>,
    /// Maximum redirect hops the fetcher will follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
}

impl Default for PifConfig {
    fn default() -> Self {
        Self {
            upload_dir: None,
            connect_timeout_secs: 15,
            fetch_timeout_secs: 60,
            max_image_bytes: default_max_image_bytes(),
            max_redirects: default_max_redirects(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pif")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PifConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PifConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PifConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = PifConfig::default();
        assert_eq!(cfg.upload_dir, None);
        assert_eq!(cfg.connect_timeout_secs, 15);
        assert_eq!(cfg.fetch_timeout_secs, 60);
        assert_eq!(cfg.max_image_bytes, Some(10 * 1024 * 1024));
        assert_eq!(cfg.max_redirects, 10);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = PifConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: PifConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.connect_timeout_secs, cfg.connect_timeout_secs);
        assert_eq!(parsed.fetch_timeout_secs, cfg.fetch_timeout_secs);
        assert_eq!(parsed.max_image_bytes, cfg.max_image_bytes);
        assert_eq!(parsed.max_redirects, cfg.max_redirects);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            upload_dir = "/srv/pif/uploads"
            connect_timeout_secs = 5
            fetch_timeout_secs = 20
            max_image_bytes = 1_000_000
            max_redirects = 3
        "#;
        let cfg: PifConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.upload_dir, Some(PathBuf::from("/srv/pif/uploads")));
        assert_eq!(cfg.connect_timeout_secs, 5);
        assert_eq!(cfg.fetch_timeout_secs, 20);
        assert_eq!(cfg.max_image_bytes, Some(1_000_000));
        assert_eq!(cfg.max_redirects, 3);
    }

    #[test]
    fn config_toml_missing_optionals_use_defaults() {
        let toml = r#"
            connect_timeout_secs = 15
            fetch_timeout_secs = 60
        "#;
        let cfg: PifConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.upload_dir, None);
        assert_eq!(cfg.max_image_bytes, Some(10 * 1024 * 1024));
        assert_eq!(cfg.max_redirects, 10);
    }
}
