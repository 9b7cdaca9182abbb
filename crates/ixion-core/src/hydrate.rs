//! Lazy row-to-record hydration over a detail cursor.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::warn;

use ixion_store::{OrdinalCache, RowCursor};

use crate::domain::{ExposureFlags, ExposureRecord};
use crate::error::{snippet, FetchError, FetchResult};

/// Column carrying the index symbol.
pub const PRIMARY_COLUMN: &str = "index_symbol";
/// Column carrying the country exposure payload.
pub const COUNTRY_COLUMN: &str = "country_exposure";
/// Column carrying the currency exposure payload.
pub const CURRENCY_COLUMN: &str = "currency_exposure";
/// Column carrying the composition payload.
pub const COMPOSITION_COLUMN: &str = "composition_exposure";

/// Lazy, single-pass hydrator producing one [`ExposureRecord`] per row.
///
/// Rows come back in cursor order and cannot be revisited. Optional
/// payload columns are resolved and decoded only when their flag is set;
/// a malformed optional payload degrades that field to `None` without
/// failing the row or the traversal.
pub struct ExposureRows {
    cursor: Box<dyn RowCursor>,
    flags: ExposureFlags,
    cache: Arc<OrdinalCache>,
}

impl std::fmt::Debug for ExposureRows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExposureRows")
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl ExposureRows {
    pub fn new(cursor: Box<dyn RowCursor>, flags: ExposureFlags, cache: Arc<OrdinalCache>) -> Self {
        Self {
            cursor,
            flags,
            cache,
        }
    }

    pub const fn flags(&self) -> ExposureFlags {
        self.flags
    }

    /// Hydrate the next row, or `Ok(None)` once the cursor is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::transport`] when the underlying row stream
    /// fails mid-traversal; the hydrator is unusable afterwards.
    pub async fn try_next(&mut self) -> FetchResult<Option<ExposureRecord>> {
        let advanced = self.cursor.advance().await.map_err(|error| {
            FetchError::transport(format!("row stream failed mid-traversal: {error}"))
        })?;
        if !advanced {
            return Ok(None);
        }

        let mut record = ExposureRecord {
            index_symbol: self.read_text(PRIMARY_COLUMN).await,
            ..ExposureRecord::default()
        };
        if self.flags.include_country {
            record.country = self.decode_payload(COUNTRY_COLUMN).await;
        }
        if self.flags.include_currency {
            record.currency = self.decode_payload(CURRENCY_COLUMN).await;
        }
        if self.flags.include_composition {
            record.composition = self.decode_payload(COMPOSITION_COLUMN).await;
        }
        Ok(Some(record))
    }

    /// Drain the remaining rows into a vector.
    ///
    /// # Errors
    ///
    /// Propagates the first traversal failure; rows hydrated before it are
    /// discarded.
    pub async fn collect(mut self) -> FetchResult<Vec<ExposureRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.try_next().await? {
            records.push(record);
        }
        Ok(records)
    }

    /// Read a cell as text, treating every unreachable cell as absent:
    /// unresolvable column, null cell, or a cell the cursor cannot render
    /// as text.
    async fn read_text(&self, column: &str) -> Option<String> {
        let ordinal = self.cache.resolve(self.cursor.as_ref(), column).await?;
        if self.cursor.is_null(ordinal) {
            return None;
        }
        match self.cursor.text(ordinal) {
            Ok(value) => value,
            Err(error) => {
                warn!(column, error = %error, "cell unreadable as text; treating as absent");
                None
            }
        }
    }

    async fn decode_payload<T>(&self, column: &str) -> Option<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let text = self.read_text(column).await?;
        match serde_json::from_str(&text) {
            Ok(entries) => Some(entries),
            Err(error) => {
                warn!(
                    column,
                    error = %error,
                    payload = %snippet(&text),
                    "optional payload failed to decode; leaving the field absent"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ixion_store::MemoryCursor;

    fn exposure_cursor(shape_id: &str) -> MemoryCursor {
        MemoryCursor::new(
            shape_id,
            [
                PRIMARY_COLUMN,
                COUNTRY_COLUMN,
                CURRENCY_COLUMN,
                COMPOSITION_COLUMN,
            ],
        )
    }

    fn rows(cursor: MemoryCursor, flags: ExposureFlags) -> ExposureRows {
        ExposureRows::new(Box::new(cursor), flags, Arc::new(OrdinalCache::new()))
    }

    #[tokio::test]
    async fn exhausted_cursor_yields_an_empty_sequence() {
        let hydrator = rows(exposure_cursor("hydrate_empty"), ExposureFlags::all());
        let records = hydrator.collect().await.expect("traversal should succeed");
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn null_primary_cell_is_absent_not_an_error() {
        let cursor = exposure_cursor("hydrate_null_primary")
            .with_row([None::<&str>, None, None, None]);
        let mut hydrator = rows(cursor, ExposureFlags::none());

        let record = hydrator
            .try_next()
            .await
            .expect("row should hydrate")
            .expect("one row");

        assert_eq!(record.index_symbol, None);
        assert!(hydrator.try_next().await.expect("exhaustion").is_none());
    }

    #[tokio::test]
    async fn country_flag_decodes_country_and_leaves_the_rest_absent() {
        let cursor = exposure_cursor("hydrate_country_only").with_row([
            Some("TEST"),
            Some(r#"[{"country":"US","weight":0.62}]"#),
            Some(r#"[{"currency":"USD","weight":1.0}]"#),
            Some(r#"[{"symbol":"AAPL","weight":0.07}]"#),
        ]);
        let flags = ExposureFlags::new(true, false, false);

        let records = rows(cursor, flags).collect().await.expect("traversal");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].index_symbol.as_deref(), Some("TEST"));
        let country = records[0].country.as_ref().expect("country decoded");
        assert_eq!(country[0].country, "US");
        assert!(records[0].currency.is_none());
        assert!(records[0].composition.is_none());
    }

    #[tokio::test]
    async fn malformed_optional_payload_degrades_only_that_field() {
        let cursor = exposure_cursor("hydrate_malformed").with_row([
            Some("SPX"),
            Some("<not json>"),
            Some(r#"[{"currency":"EUR","weight":0.4}]"#),
            None,
        ]);

        let records = rows(cursor, ExposureFlags::all())
            .collect()
            .await
            .expect("the call still succeeds");

        assert_eq!(records[0].index_symbol.as_deref(), Some("SPX"));
        assert!(records[0].country.is_none());
        let currency = records[0].currency.as_ref().expect("currency decoded");
        assert_eq!(currency[0].currency, "EUR");
        assert!(records[0].composition.is_none());
    }

    #[tokio::test]
    async fn flagged_null_cell_skips_decoding() {
        let cursor = exposure_cursor("hydrate_flagged_null")
            .with_row([Some("NDX"), None, None, None]);

        let records = rows(cursor, ExposureFlags::all())
            .collect()
            .await
            .expect("traversal");

        assert_eq!(records[0].index_symbol.as_deref(), Some("NDX"));
        assert!(records[0].country.is_none());
        assert!(records[0].currency.is_none());
        assert!(records[0].composition.is_none());
    }

    #[tokio::test]
    async fn absent_optional_column_is_simply_empty() {
        let cursor = MemoryCursor::new("hydrate_narrow_shape", [PRIMARY_COLUMN])
            .with_row([Some("RUT")]);

        let records = rows(cursor, ExposureFlags::all())
            .collect()
            .await
            .expect("traversal");

        assert_eq!(records[0].index_symbol.as_deref(), Some("RUT"));
        assert!(records[0].country.is_none());
    }

    #[tokio::test]
    async fn hydrates_every_row_in_cursor_order() {
        let cursor = exposure_cursor("hydrate_order")
            .with_row([Some("SPX"), None, None, None])
            .with_row([Some("NDX"), None, None, None])
            .with_row([Some("RUT"), None, None, None]);

        let records = rows(cursor, ExposureFlags::none())
            .collect()
            .await
            .expect("traversal");

        let symbols: Vec<_> = records
            .iter()
            .map(|record| record.index_symbol.as_deref())
            .collect();
        assert_eq!(symbols, [Some("SPX"), Some("NDX"), Some("RUT")]);
    }
}
