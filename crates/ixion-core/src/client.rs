//! Public entry point wiring retry, transport, and hydration together.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use ixion_store::{DetailSource, OrdinalCache, StaticDetailSource};

use crate::domain::{ExposureFlags, IndexSymbol};
use crate::error::{FetchResult, ValidationError};
use crate::http_client::{HttpClient, NoopHttpClient};
use crate::hydrate::{
    ExposureRows, COMPOSITION_COLUMN, COUNTRY_COLUMN, CURRENCY_COLUMN, PRIMARY_COLUMN,
};
use crate::remote::{CountOperation, DetailOperation};
use crate::retry::{execute_with_retry, RetryPolicy};

/// Environment variable consulted when no base URL is supplied explicitly.
pub const BASE_URL_VAR: &str = "IXION_EXPOSURE_BASE_URL";

/// Client for index exposure retrieval.
///
/// Every remote call runs under the configured [`RetryPolicy`] and honors
/// the supplied cancellation token at each suspension point. The client is
/// cheap to clone; clones share the transport, detail source, and ordinal
/// cache.
#[derive(Clone)]
pub struct ExposureClient {
    policy: RetryPolicy,
    count: CountOperation,
    detail: DetailOperation,
    cache: Arc<OrdinalCache>,
}

impl std::fmt::Debug for ExposureClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExposureClient")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ExposureClient {
    pub fn builder() -> ExposureClientBuilder {
        ExposureClientBuilder::default()
    }

    /// Fetch the constituent count for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::exhausted`](crate::FetchError::exhausted) once
    /// the retry budget is spent, or
    /// [`FetchError::cancelled`](crate::FetchError::cancelled) when `cancel`
    /// fires first.
    pub async fn constituent_count(
        &self,
        symbol: &IndexSymbol,
        cancel: &CancellationToken,
    ) -> FetchResult<u64> {
        debug!(symbol = %symbol, "constituent count requested");
        let operation = self.count.clone();
        let symbol = symbol.clone();
        execute_with_retry(&self.policy, cancel, move |_attempt_cancel| {
            let operation = operation.clone();
            let symbol = symbol.clone();
            async move { operation.invoke(&symbol).await }
        })
        .await
    }

    /// Fetch the exposure detail rows for `symbol` as a lazy record
    /// sequence.
    ///
    /// Retry applies to acquiring the cursor; traversal itself is
    /// single-pass and not re-attempted.
    ///
    /// # Errors
    ///
    /// Same terminal outcomes as
    /// [`constituent_count`](ExposureClient::constituent_count).
    pub async fn exposures(
        &self,
        symbol: &IndexSymbol,
        flags: ExposureFlags,
        cancel: &CancellationToken,
    ) -> FetchResult<ExposureRows> {
        debug!(symbol = %symbol, ?flags, "exposure detail requested");
        let operation = self.detail.clone();
        let owned = symbol.clone();
        let cursor = execute_with_retry(&self.policy, cancel, move |_attempt_cancel| {
            let operation = operation.clone();
            let symbol = owned.clone();
            async move { operation.invoke(&symbol).await }
        })
        .await?;
        Ok(ExposureRows::new(cursor, flags, self.cache.clone()))
    }
}

/// Builder for [`ExposureClient`].
///
/// Defaults: no-op transport, empty static detail source, default retry
/// policy, the process-wide ordinal cache, and the base URL from
/// [`BASE_URL_VAR`] unless one is given explicitly.
pub struct ExposureClientBuilder {
    base_url: Option<String>,
    http: Arc<dyn HttpClient>,
    source: Arc<dyn DetailSource>,
    policy: RetryPolicy,
    cache: Arc<OrdinalCache>,
}

impl Default for ExposureClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            http: Arc::new(NoopHttpClient),
            source: Arc::new(StaticDetailSource::new(
                "exposure_detail",
                [
                    PRIMARY_COLUMN,
                    COUNTRY_COLUMN,
                    CURRENCY_COLUMN,
                    COMPOSITION_COLUMN,
                ],
            )),
            policy: RetryPolicy::default(),
            cache: OrdinalCache::shared(),
        }
    }
}

impl ExposureClientBuilder {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = http;
        self
    }

    pub fn with_detail_source(mut self, source: Arc<dyn DetailSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use a dedicated ordinal cache instead of the process-wide one.
    pub fn with_ordinal_cache(mut self, cache: Arc<OrdinalCache>) -> Self {
        self.cache = cache;
        self
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::MissingBaseUrl`] when no base URL was
    /// supplied and [`BASE_URL_VAR`] is unset, or
    /// [`ValidationError::EmptyBaseUrl`] when the supplied one is blank.
    pub fn build(self) -> Result<ExposureClient, ValidationError> {
        let base_url = match self.base_url {
            Some(base_url) => base_url,
            None => std::env::var(BASE_URL_VAR)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .ok_or(ValidationError::MissingBaseUrl { var: BASE_URL_VAR })?,
        };
        if base_url.trim().is_empty() {
            return Err(ValidationError::EmptyBaseUrl);
        }

        Ok(ExposureClient {
            policy: self.policy,
            count: CountOperation::new(self.http, base_url),
            detail: DetailOperation::new(self.source),
            cache: self.cache,
        })
    }
}
