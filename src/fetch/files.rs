// src/fetch/files.rs

use anyhow::{bail, Context, Result};
use futures::{stream, StreamExt};
use reqwest::Client;
use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use tokio::{fs, time::sleep};
use tracing::{error, info, instrument, warn};
use url::Url;

use super::{urls, Acquisition};
use crate::config::{local_path, DATA_FILE_PREFIX};

/// Fetches files from the BLS time-series directory over HTTPS.
pub struct HttpAcquisition {
    client: Client,
    base: Url,
}

impl HttpAcquisition {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            base: urls::parse_base(base_url)?,
        })
    }

    /// Names of the `la.data.0.CurrentU*` feeds currently published.
    pub async fn list_remote_data_files(&self) -> Result<Vec<String>> {
        urls::list_remote_files(&self.client, &self.base, DATA_FILE_PREFIX).await
    }
}

const MAX_RETRIES: usize = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

impl Acquisition for HttpAcquisition {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        let url = urls::file_url(&self.base, file_id)?;
        let mut attempt = 0;

        // retry transport errors and 5xx; a 4xx will not get better
        loop {
            attempt += 1;
            match self.client.get(url.clone()).send().await {
                Ok(resp) if resp.status().is_success() => match resp.bytes().await {
                    Ok(bytes) => return Ok(bytes.to_vec()),
                    Err(e) if attempt < MAX_RETRIES => {
                        warn!(%url, attempt, "reading body failed: {}", e);
                    }
                    Err(e) => {
                        return Err(e).with_context(|| format!("reading body from {}", url))
                    }
                },
                Ok(resp) if resp.status().is_server_error() && attempt < MAX_RETRIES => {
                    warn!(%url, attempt, status = %resp.status(), "server error");
                }
                Ok(resp) => bail!("GET {}: HTTP {}", url, resp.status()),
                Err(e) if attempt < MAX_RETRIES => {
                    warn!(%url, attempt, "request failed: {}", e);
                }
                Err(e) => return Err(e).with_context(|| format!("GET {}", url)),
            }
            sleep(RETRY_DELAY).await;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Already on disk; not fetched again.
    Present(PathBuf),
    Downloaded { path: PathBuf, size_bytes: usize },
}

impl FetchOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FetchOutcome::Present(path) | FetchOutcome::Downloaded { path, .. } => path,
        }
    }
}

/// Make sure `file_id` is stored under `data_dir`, downloading it only when
/// it is not there yet. The file is written to a temporary name and renamed
/// into place, so a partial download is never mistaken for a complete one.
#[instrument(level = "info", skip(acq, data_dir))]
pub async fn ensure_local<A: Acquisition>(
    acq: &A,
    data_dir: &Path,
    file_id: &str,
) -> Result<FetchOutcome> {
    let path = local_path(data_dir, file_id);
    if fs::try_exists(&path)
        .await
        .with_context(|| format!("checking {}", path.display()))?
    {
        info!(path = %path.display(), "file exists, skipping");
        return Ok(FetchOutcome::Present(path));
    }

    let start = Instant::now();
    let bytes = acq
        .fetch(file_id)
        .await
        .with_context(|| format!("fetching {}", file_id))?;

    write_atomically(&path, &bytes).await?;

    info!(size_bytes = bytes.len(), elapsed = ?start.elapsed(), "downloaded");
    Ok(FetchOutcome::Downloaded {
        path,
        size_bytes: bytes.len(),
    })
}

/// Write `bytes` next to `path` under a `.tmp` name and rename it into place.
/// The temporary file is removed if either step fails.
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("txt.tmp");
    let result = match fs::write(&tmp, bytes).await {
        Ok(()) => fs::rename(&tmp, path)
            .await
            .with_context(|| format!("renaming {} -> {}", tmp.display(), path.display())),
        Err(e) => Err(e).with_context(|| format!("writing {}", tmp.display())),
    };
    if result.is_err() {
        let _ = fs::remove_file(&tmp).await;
    }
    result
}

/// Ensure every file in `file_ids` is present, running at most
/// `concurrency` downloads at once. All failures are logged before the
/// first one is returned.
pub async fn fetch_missing<A: Acquisition>(
    acq: &A,
    data_dir: &Path,
    file_ids: &[String],
    concurrency: usize,
) -> Result<Vec<FetchOutcome>> {
    fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("creating data directory {}", data_dir.display()))?;

    let results: Vec<Result<FetchOutcome>> = stream::iter(file_ids)
        .map(|file_id| ensure_local(acq, data_dir, file_id))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut outcomes = Vec::with_capacity(results.len());
    let mut failed = 0;
    for result in results {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                error!("download failed: {:#}", err);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} downloads failed", failed, file_ids.len());
    }

    let downloaded = outcomes
        .iter()
        .filter(|o| matches!(o, FetchOutcome::Downloaded { .. }))
        .count();
    info!(downloaded, present = outcomes.len() - downloaded, "acquisition done");
    Ok(outcomes)
}
