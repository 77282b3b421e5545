use crate::cache::ComponentSpec;
use crate::result::{McDeployError, Result};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

const USER_AGENT: &str = "mcdeploy/0.1.0";

/** Transport used to bring one artifact onto the local disk
 *
 * # Contract
 * - `fetch` writes the complete artifact to `dest` or returns a `Fetch`
 *   error carrying the spec's kind; it never retries on its own
 * - A partially written destination after an error is acceptable; the
 *   validation loop treats it as a corrupt file
 */
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, spec: &ComponentSpec, dest: &Path) -> Result<()>;
}

/// HTTP downloader for toolchain artifacts.
pub struct HttpFetcher {
    client: Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, spec: &ComponentSpec, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let response = self
            .client
            .get(&spec.url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| {
                McDeployError::fetch(spec.kind, format!("request to {} failed: {}", spec.url, e))
            })?;

        if !response.status().is_success() {
            return Err(McDeployError::fetch(
                spec.kind,
                format!("{} answered HTTP {}", spec.url, response.status()),
            ));
        }

        let total_size = response.content_length();

        let pb = if let Some(size) = total_size {
            let pb = ProgressBar::new(size);
            pb.set_style(ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap()
                .progress_chars("#>-"));
            pb.set_message(format!("Downloading {}", spec.kind));
            pb
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] Downloading {msg}... {bytes}")
                    .unwrap(),
            );
            pb.set_message(spec.kind.to_string());
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        };

        let bytes = response.bytes().await.map_err(|e| {
            McDeployError::fetch(spec.kind, format!("download of {} failed: {}", spec.url, e))
        })?;

        if total_size.is_some() {
            pb.set_position(bytes.len() as u64);
        } else {
            pb.inc(bytes.len() as u64);
        }

        let mut file = File::create(dest).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        pb.finish_with_message(format!("{} downloaded ({} bytes)", spec.kind, bytes.len()));
        Ok(())
    }
}
