//! Remote script fetching.
//!
//! [`FetchCoordinator`] starts one task per claimed remote script while the
//! scan is still running and hands every body back through
//! [`FetchCoordinator::barrier`]. Tasks never touch the script store: their
//! results are applied by the store's owner once the barrier resolves.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::debug;

use crate::classify::normalize_remote_url;
use crate::key::ScriptKey;
use crate::{Error, Result};

/// Result type for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Errors that can occur while fetching a remote script
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection, TLS, timeout...)
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// The body could not be decoded as text
    #[error("invalid response body: {0}")]
    Body(String),
}

/// URL in, response body out.
#[async_trait]
pub trait ScriptFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, url: &str) -> FetchResult<String>;
}

/// [`ScriptFetcher`] over HTTP(S) using reqwest.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ScriptFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

/// Body of one remote script, ready to be recorded in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedScript {
    pub key: ScriptKey,
    pub url: String,
    pub body: String,
}

/// Tracks the remote fetches of a run.
#[derive(Debug)]
pub struct FetchCoordinator {
    fetcher: Arc<dyn ScriptFetcher>,
    pending: JoinSet<(ScriptKey, String, FetchResult<String>)>,
}

impl FetchCoordinator {
    pub fn new(fetcher: Arc<dyn ScriptFetcher>) -> Self {
        Self {
            fetcher,
            pending: JoinSet::new(),
        }
    }

    /// Start fetching a claimed remote script. Does not wait.
    ///
    /// Protocol-relative URLs (`//host/path`) are fetched over `http:`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, key: ScriptKey, src: &str) {
        let url = normalize_remote_url(src);
        let fetcher = Arc::clone(&self.fetcher);
        debug!("fetching remote script {}", url);

        self.pending.spawn(async move {
            let result = fetcher.fetch(&url).await;
            (key, url, result)
        });
    }

    /// Number of fetches started and not yet collected.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Wait until every started fetch has settled.
    ///
    /// Resolves immediately when nothing was started.
    ///
    /// # Errors
    ///
    /// Returns the first failure ([`Error::RemoteFetch`] or
    /// [`Error::TaskJoin`]) once all fetches have settled.
    pub async fn barrier(mut self) -> Result<Vec<FetchedScript>> {
        let mut fetched = Vec::with_capacity(self.pending.len());
        let mut first_error = None;

        while let Some(joined) = self.pending.join_next().await {
            let error = match joined {
                Ok((key, url, Ok(body))) => {
                    debug!("fetched remote script {} ({} bytes)", url, body.len());
                    fetched.push(FetchedScript { key, url, body });
                    continue;
                }
                Ok((_, url, Err(source))) => Error::RemoteFetch { url, source },
                Err(join_err) => Error::TaskJoin(join_err),
            };

            if first_error.is_none() {
                first_error = Some(error);
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(fetched),
        }
    }
}
