//! Boundary archive download and extraction.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tracing::info;
use url::Url;
use zip::ZipArchive;

use crate::overpass::USER_AGENT;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for archive downloads. `timeout` bounds the whole transfer.
pub fn download_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()
        .context("Failed to create download client")
}

/// Local file name for a download: the URL's last path segment.
pub fn archive_file_name(url: &Url) -> Result<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .with_context(|| format!("URL {} has no file name", url))
}

/// Download `url` into `dir`, streaming the body to disk. Returns the written path.
pub async fn download_archive(client: &Client, url: &Url, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let dest = dir.join(archive_file_name(url)?);

    info!("Downloading {} to {}", url, dest.display());

    let mut response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("requesting {}", url))?;

    if !response.status().is_success() {
        bail!("failed to download {}: HTTP {}", url, response.status());
    }

    let pb = match response.content_length() {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
                    )?
                    .progress_chars("#>-"),
            );
            pb
        }
        None => ProgressBar::new_spinner(),
    };

    let mut file =
        File::create(&dest).with_context(|| format!("creating download target {}", dest.display()))?;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)
            .with_context(|| format!("writing {}", dest.display()))?;
        pb.inc(chunk.len() as u64);
    }
    file.flush()?;
    pb.finish_and_clear();

    info!("Downloaded {} bytes", pb.position());
    Ok(dest)
}

/// Extract each entry from an archive into `out_dir`. Returns the extracted file paths.
pub fn extract_zip_archive(zip_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let file =
        File::open(zip_path).with_context(|| format!("opening archive {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("reading zip archive {}", zip_path.display()))?;

    let mut extracted = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        // Entries escaping the target directory are ignored
        let Some(name) = entry.enclosed_name() else {
            continue;
        };
        let target = out_dir.join(name);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&target)?;
            io::copy(&mut entry, &mut outfile)?;
            extracted.push(target);
        }
    }

    info!(
        "Extracted {} files from {} into {}",
        extracted.len(),
        zip_path.display(),
        out_dir.display()
    );
    Ok(extracted)
}
