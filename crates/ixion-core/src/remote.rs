//! Single-attempt remote operations and their outcome classification.
//!
//! Each operation performs exactly one call and reports through
//! [`FetchResult`]; retry scheduling lives with the caller. Both operations
//! are idempotent-safe to invoke repeatedly.

use std::sync::Arc;

use tracing::debug;

use ixion_store::{DetailSource, RowCursor};

use crate::domain::IndexSymbol;
use crate::error::{snippet, FetchError, FetchResult};
use crate::http_client::{HttpClient, HttpRequest};

/// Fetch the constituent count for an index over HTTP.
#[derive(Clone)]
pub struct CountOperation {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl CountOperation {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, symbol: &IndexSymbol) -> String {
        format!(
            "{}/v1/indexes/{}/constituents/count",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(symbol.as_str())
        )
    }

    /// Issue the count request once and classify the outcome.
    ///
    /// # Errors
    ///
    /// Transport failures and non-success statuses come back retryable; a
    /// success status with a body that is not an unsigned integer comes back
    /// as a retryable [`FetchError::malformed`] carrying the offending text.
    pub async fn invoke(&self, symbol: &IndexSymbol) -> FetchResult<u64> {
        let endpoint = self.endpoint(symbol);
        debug!(symbol = %symbol, endpoint = %endpoint, "requesting constituent count");

        let response = self
            .http
            .execute(HttpRequest::get(endpoint))
            .await
            .map_err(|error| {
                if error.retryable() {
                    FetchError::transport(format!("count transport error: {}", error.message()))
                } else {
                    FetchError::internal(format!("count transport error: {}", error.message()))
                }
            })?;

        if !response.is_success() {
            return Err(FetchError::upstream_status(response.status, &response.body));
        }

        response.body.trim().parse::<u64>().map_err(|_| {
            FetchError::malformed(format!(
                "count body is not an unsigned integer: '{}'",
                snippet(&response.body)
            ))
        })
    }
}

/// Fetch the exposure detail rows for an index from the detail source.
#[derive(Clone)]
pub struct DetailOperation {
    source: Arc<dyn DetailSource>,
}

impl DetailOperation {
    pub fn new(source: Arc<dyn DetailSource>) -> Self {
        Self { source }
    }

    /// Execute the detail query once and return its row cursor.
    ///
    /// # Errors
    ///
    /// Acquisition failures come back as retryable transport errors.
    pub async fn invoke(&self, symbol: &IndexSymbol) -> FetchResult<Box<dyn RowCursor>> {
        debug!(symbol = %symbol, "requesting exposure detail rows");

        self.source
            .fetch(symbol.as_str())
            .await
            .map_err(|error| FetchError::transport(format!("detail source error: {error}")))
    }
}
