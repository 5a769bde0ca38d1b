//! `pif set-url <user> <url>` – vet, fetch, and store a profile image.

use std::sync::Arc;

use anyhow::Result;
use pif_core::config::PifConfig;
use pif_core::fetcher::{CurlFetcher, ImageFetcher};
use pif_core::pipeline::{run_image_url_upload, UploadOutcome};
use pif_core::profile_store::{ProfileDb, UserId};
use pif_core::storage;

pub async fn run_set_url(db: &ProfileDb, cfg: &PifConfig, user: &str, url: &str) -> Result<()> {
    let upload_dir = storage::resolve_upload_dir(cfg)?;
    let fetcher: Arc<dyn ImageFetcher> = Arc::new(CurlFetcher::from_config(cfg));
    let user = UserId::from(user);

    match run_image_url_upload(db, fetcher, &upload_dir, Some(&user), url).await? {
        UploadOutcome::Stored { local_path } => {
            println!("Stored profile image for {user} at {}", local_path.display());
        }
        UploadOutcome::FallbackLink { url } => {
            println!("Could not download the image; profile for {user} now links {url}");
        }
    }
    Ok(())
}
