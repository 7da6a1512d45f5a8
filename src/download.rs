use crate::config::Paths;
use crate::errors::{Error, Result};
use crate::remote;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Archives run to hundreds of megabytes; the transfer timeout is long where
/// the catalog timeout is short.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Retrieves version archives into a content-hash-verified local cache.
pub struct Downloader {
    paths: Paths,
}

impl Downloader {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    /// Download the archive for `version`, returning the cached path.
    /// A cache entry whose SHA-256 matches the catalog hash is returned
    /// without any network transfer.
    pub async fn download(&self, version: &str, show_progress: bool) -> Result<PathBuf> {
        let (url, expected_hash) = remote::download_descriptor(version).await?;
        self.fetch_archive(version, &url, &expected_hash, show_progress)
            .await
    }

    pub(crate) async fn fetch_archive(
        &self,
        version: &str,
        url: &str,
        expected_hash: &str,
        show_progress: bool,
    ) -> Result<PathBuf> {
        let dest = self.paths.cache_file(version);

        if is_valid_cache(&dest, expected_hash) {
            tracing::debug!("Cache hit for go{} at {}", version, dest.display());
            return Ok(dest);
        }

        fs::create_dir_all(&self.paths.cache)?;

        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()?;

        tracing::info!("Downloading {}", url);
        let response = client.get(url).send().await?.error_for_status()?;
        let total_size = response.content_length().unwrap_or(0);

        let pb = if show_progress {
            let pb = ProgressBar::new(total_size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb.set_message(format!("Downloading go{}", version));
            Some(pb)
        } else {
            None
        };

        // Stream into a temp file next to the cache, hashing as bytes arrive.
        let mut tmp = tempfile::NamedTempFile::new_in(&self.paths.cache)?;
        let mut hasher = Sha256::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            tmp.write_all(&chunk)?;
            hasher.update(&chunk);
            if let Some(pb) = &pb {
                pb.inc(chunk.len() as u64);
            }
        }

        if let Some(pb) = &pb {
            pb.finish_with_message("Download complete");
        }

        let actual_hash = format!("{:x}", hasher.finalize());
        if !expected_hash.is_empty() && actual_hash != expected_hash {
            // Temp file is dropped and removed; any stale cache entry stays.
            return Err(Error::Integrity {
                expected: expected_hash.to_string(),
                actual: actual_hash,
            });
        }

        tmp.flush()?;
        match tmp.persist(&dest) {
            Ok(_) => {}
            Err(e) => {
                // Rename across devices fails; fall back to copy + delete.
                fs::copy(e.file.path(), &dest)?;
            }
        }

        Ok(dest)
    }

    pub fn clean_cache(&self) -> Result<()> {
        match fs::remove_dir_all(&self.paths.cache) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn cache_size(&self) -> Result<u64> {
        let entries = match fs::read_dir(&self.paths.cache) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut size = 0;
        for entry in entries {
            let entry = entry?;
            if let Ok(metadata) = entry.metadata() {
                size += metadata.len();
            }
        }
        Ok(size)
    }
}

/// A cached file counts only while its full-content SHA-256 matches the
/// catalog-declared hash; anything else forces a re-download.
fn is_valid_cache(path: &Path, expected_hash: &str) -> bool {
    if expected_hash.is_empty() {
        return false;
    }
    match file_sha256(path) {
        Ok(actual) => actual == expected_hash,
        Err(_) => false,
    }
}

pub fn file_sha256(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
