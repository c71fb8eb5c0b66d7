//! Streaming HTTP fetcher for dataset files.

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::SyncError;

/// Execution context a fetch is issued from; selects the timeout budget.
///
/// Interactive callers (a user waiting on pull-to-refresh) get a short
/// budget; background refresh can afford to wait out a slow link. The caller
/// declares its context, nothing is inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchContext {
    Interactive,
    Background,
}

impl FetchContext {
    pub fn timeout(&self) -> Duration {
        match self {
            FetchContext::Interactive => Duration::from_secs(15),
            FetchContext::Background => Duration::from_secs(60),
        }
    }
}

/// Downloads resources into temp files with a bounded timeout.
pub struct RemoteFetcher {
    client: Client,
}

impl RemoteFetcher {
    pub fn new(context: FetchContext) -> Result<Self, SyncError> {
        let timeout = context.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(SyncError::Client)?;
        Ok(Self { client })
    }

    /// Stream `url` into `dest`, returning the bytes written.
    ///
    /// Any non-success status or transport error fails the fetch, and a
    /// partially written `dest` is removed so it can never be promoted.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, SyncError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| SyncError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        match self.stream_to_file(response, url, dest).await {
            Ok(written) => {
                debug!(url = %url, bytes = written, "Fetched resource");
                Ok(written)
            }
            Err(e) => {
                tokio::fs::remove_file(dest).await.ok();
                Err(e)
            }
        }
    }

    async fn stream_to_file(
        &self,
        response: reqwest::Response,
        url: &str,
        dest: &Path,
    ) -> Result<u64, SyncError> {
        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| SyncError::Network {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(written)
    }
}
