//! Ordered RPC endpoints with per-endpoint timeout and fallback.
//!
//! A read is tried against each endpoint in turn. Transport-level failures
//! move on to the next endpoint; deterministic failures (reverts, invalid
//! input) are returned straight away since another node would answer the
//! same. When every endpoint fails, all failures are reported together.

use std::future::Future;
use std::time::Duration;

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;

use crate::error::{EndpointFailure, Error, Result};
use crate::networks::Network;

/// Ordered list of RPC endpoints, best first.
#[derive(Debug, Clone)]
pub struct Endpoints {
    urls: Vec<Url>,
    timeout: Duration,
}

impl Endpoints {
    /// Per-endpoint timeout used unless overridden.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Parse a list of endpoint URLs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoEndpoints`] for an empty list and
    /// [`Error::InvalidRpcUrl`] for an unparsable entry.
    pub fn new<I, S>(urls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = urls
            .into_iter()
            .map(|u| {
                let u = u.as_ref().trim();
                u.parse::<Url>().map_err(|_| Error::InvalidRpcUrl(u.to_owned()))
            })
            .collect::<Result<Vec<_>>>()?;
        if urls.is_empty() {
            return Err(Error::NoEndpoints);
        }
        Ok(Self {
            urls,
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    /// The built-in public endpoints of `network`.
    ///
    /// # Errors
    ///
    /// Fails only if a built-in URL is malformed.
    pub fn for_network(network: Network) -> Result<Self> {
        Self::new(network.default_rpcs())
    }

    /// Override the per-endpoint timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The endpoint URLs in trial order.
    #[must_use]
    pub fn urls(&self) -> &[Url] {
        &self.urls
    }

    /// The per-endpoint timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `op` against each endpoint until one succeeds.
    ///
    /// Each endpoint is tried once, bounded by the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error unchanged, or
    /// [`Error::AllEndpointsFailed`] listing every endpoint's failure.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(DynProvider) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut failures = Vec::with_capacity(self.urls.len());

        for (i, url) in self.urls.iter().enumerate() {
            let provider = ProviderBuilder::new().connect_http(url.clone()).erased();

            let result = match tokio::time::timeout(self.timeout, op(provider)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout {
                    endpoint: url.to_string(),
                    after: self.timeout,
                }),
            };

            match result {
                Ok(value) => {
                    if i > 0 {
                        tracing::info!(rpc = %url, attempt = i + 1, "RPC succeeded after fallback");
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if let Some(next) = self.urls.get(i + 1) {
                        tracing::warn!(rpc = %url, next = %next, error = %e, "RPC failed, falling back");
                    } else {
                        tracing::error!(rpc = %url, error = %e, "last RPC failed");
                    }
                    failures.push(EndpointFailure {
                        endpoint: url.to_string(),
                        error: e,
                    });
                }
            }
        }

        Err(Error::AllEndpointsFailed(failures))
    }
}
