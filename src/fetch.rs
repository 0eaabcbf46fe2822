// src/fetch.rs
use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode};
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

static DOWNLOAD_SEASON_URL: &str = "https://plvr.land.moi.gov.tw/DownloadSeason";
pub static ARCHIVE_NAME: &str = "lvr_landcsv.zip";

/// URL of the CSV archive for one season, e.g. `108S2`.
pub fn season_url(season: &str) -> Result<Url> {
    Url::parse_with_params(
        DOWNLOAD_SEASON_URL,
        &[("season", season), ("type", "zip"), ("fileName", ARCHIVE_NAME)],
    )
    .with_context(|| format!("building download URL for season {}", season))
}

/// Single GET of `url`. On 200 the body is written verbatim to `dest`;
/// any other status is an error and nothing is written. No retry.
#[instrument(level = "info", skip_all, fields(url = %url, dest = %dest.as_ref().display()))]
pub async fn download_archive(client: &Client, url: &Url, dest: impl AsRef<Path>) -> Result<u64> {
    let dest = dest.as_ref();
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?;

    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("HTTP {} from {}: {}", status, url, body));
    }

    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(dest, &bytes)
        .await
        .with_context(|| format!("writing {:?}", dest))?;

    debug!(bytes = bytes.len(), "archive written");
    Ok(bytes.len() as u64)
}
