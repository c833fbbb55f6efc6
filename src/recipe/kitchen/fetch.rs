// src/recipe/kitchen/fetch.rs

//! Downloading source archives
//!
//! Provides a wrapper around reqwest with retry support. `file://` URLs and
//! plain paths are copied instead, which allows building from a local
//! mirror without network access.

use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Timeout for establishing a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum attempts for a failed download
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Buffer size for streaming downloads (64 KB)
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Retrieves the file behind a URL into a local path
pub trait Fetcher: Send + Sync {
    /// Download `url` into `dest`, replacing nothing on failure
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// HTTP(S) fetcher with retry support and a progress bar
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    show_progress: bool,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None)
            .user_agent(concat!("larder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
            show_progress: true,
        })
    }

    /// Disable the progress bar (for scripted runs)
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let fetch_error = |reason: String| Error::FetchError {
            url: url.to_string(),
            reason,
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send() {
                Ok(response) => {
                    if !response.status().is_success() {
                        return Err(fetch_error(format!("HTTP {}", response.status())));
                    }

                    let total_size = response.content_length().unwrap_or(0);
                    let partial = partial_path(dest);
                    let mut file = File::create(&partial).map_err(|e| {
                        Error::IoError(format!("Failed to create file {}: {e}", partial.display()))
                    })?;

                    let downloaded = match self.stream_to_file(response, &mut file, total_size, dest) {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            let _ = fs::remove_file(&partial);
                            return Err(fetch_error(e.to_string()));
                        }
                    };

                    fs::rename(&partial, dest).map_err(|e| {
                        Error::IoError(format!(
                            "Failed to move {} to {}: {e}",
                            partial.display(),
                            dest.display()
                        ))
                    })?;

                    info!("Downloaded {} bytes to {}", downloaded, dest.display());
                    return Ok(());
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(fetch_error(format!("failed after {attempt} attempts: {e}")));
                    }
                    warn!("Download attempt {} failed: {}, retrying...", attempt, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }

    /// Stream the body in chunks; never buffers the whole archive in memory
    fn stream_to_file(
        &self,
        mut response: reqwest::blocking::Response,
        file: &mut File,
        total_size: u64,
        dest: &Path,
    ) -> io::Result<u64> {
        let progress = (self.show_progress && total_size > 0).then(|| {
            let pb = ProgressBar::new(total_size);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}",
            ) {
                pb.set_style(style);
            }
            pb.set_message(
                dest.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );
            pb
        });

        let mut downloaded: u64 = 0;
        let mut buffer = vec![0u8; STREAM_BUFFER_SIZE];
        loop {
            let bytes_read = response.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            file.write_all(&buffer[..bytes_read])?;
            downloaded += bytes_read as u64;
            if let Some(pb) = &progress {
                pb.set_position(downloaded);
            }
        }
        file.flush()?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        Ok(downloaded)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        info!("Downloading {} to {}", url, dest.display());

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        match local_source(url) {
            Some(path) => copy_local(url, &path, dest),
            None => self.download(url, dest),
        }
    }
}

/// Path of a `file://` URL or a plain filesystem path; `None` for remote URLs
fn local_source(url: &str) -> Option<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    if url.contains("://") {
        return None;
    }
    Some(PathBuf::from(url))
}

fn copy_local(url: &str, src: &Path, dest: &Path) -> Result<()> {
    let partial = partial_path(dest);
    fs::copy(src, &partial).map_err(|e| Error::FetchError {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    fs::rename(&partial, dest)?;
    Ok(())
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}
