//! Outbound HTTP GET for canonical image URLs.
//!
//! Uses the curl crate (libcurl) and streams the body straight into an
//! [`UploadWriter`] as chunks arrive. Transfers are blocking; async callers
//! run them under `tokio::task::spawn_blocking` so one request's fetch never
//! stalls another's.
//!
//! Callers hand this module canonical URLs only; the vetting stages run
//! first, and nothing here re-validates.

mod error;

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::PifConfig;
use crate::storage::UploadWriter;

pub use error::FetchError;

/// HTTP collaborator seam: issues a GET and streams the body into the given
/// writer, returning the number of bytes written.
///
/// Implementations are blocking; call from `spawn_blocking` in async code.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str, sink: &UploadWriter) -> Result<u64, FetchError>;
}

/// Production fetcher backed by libcurl.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    connect_timeout: Duration,
    timeout: Duration,
    max_redirects: u32,
    max_bytes: Option<u64>,
}

impl CurlFetcher {
    pub fn from_config(cfg: &PifConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.fetch_timeout_secs),
            max_redirects: cfg.max_redirects,
            max_bytes: cfg.max_image_bytes,
        }
    }
}

impl ImageFetcher for CurlFetcher {
    fn fetch(&self, url: &str, sink: &UploadWriter) -> Result<u64, FetchError> {
        let offset = Arc::new(AtomicU64::new(0));
        let oversize = Arc::new(AtomicBool::new(false));
        let write_error: Arc<Mutex<Option<io::Error>>> = Arc::new(Mutex::new(None));

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirects)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        {
            let offset_cb = Arc::clone(&offset);
            let oversize_cb = Arc::clone(&oversize);
            let write_error_cb = Arc::clone(&write_error);
            let cap = self.max_bytes;
            let sink = sink.clone();

            let mut transfer = easy.transfer();
            transfer.write_function(move |data| {
                let off = offset_cb.fetch_add(data.len() as u64, Ordering::Relaxed);
                if let Some(cap) = cap {
                    if off + data.len() as u64 > cap {
                        oversize_cb.store(true, Ordering::Relaxed);
                        return Ok(0); // abort transfer
                    }
                }
                match sink.write_at(off, data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        tracing::warn!("image write failed mid-transfer: {}", e);
                        *write_error_cb.lock().unwrap_or_else(|p| p.into_inner()) = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })?;
            if let Err(e) = transfer.perform() {
                // A deliberate abort surfaces as a curl write error; report
                // the underlying cause instead.
                if oversize.load(Ordering::Relaxed) {
                    return Err(FetchError::BodyTooLarge {
                        limit: self.max_bytes.unwrap_or(0),
                    });
                }
                if let Some(io_err) = write_error.lock().unwrap_or_else(|p| p.into_inner()).take()
                {
                    return Err(FetchError::Write(io_err));
                }
                return Err(FetchError::Curl(e));
            }
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }

        let written = offset.load(Ordering::Relaxed);
        if written == 0 {
            return Err(FetchError::EmptyBody);
        }
        Ok(written)
    }
}
