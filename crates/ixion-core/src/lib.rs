//! # Ixion Core
//!
//! Resilient retrieval and row hydration for index exposure data.
//!
//! ## Overview
//!
//! This crate is the client layer of ixion:
//!
//! - **Error taxonomy** with retryability classification and stable codes
//! - **Retry executor** with exponential backoff and cancellation
//! - **HTTP transport seam** with reqwest and no-op implementations
//! - **Remote operations** for constituent counts and exposure details
//! - **Row hydrator** producing typed, flag-gated exposure records
//! - **Client entry point** composing the above behind a builder
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | `ExposureClient` entry point and builder |
//! | [`domain`] | Domain models (`IndexSymbol`, `ExposureRecord`, flags) |
//! | [`error`] | `FetchError` taxonomy and validation errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`hydrate`] | Lazy row-to-record hydration |
//! | [`remote`] | Single-attempt remote operations |
//! | [`retry`] | Retry policy and executor |
//!
//! ## Quick Start
//!
//! ```rust
//! use ixion_core::{ExposureClient, ExposureFlags, IndexSymbol};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ExposureClient::builder()
//!     .with_base_url("https://indexes.example.test")
//!     .build()?;
//!
//! let symbol = IndexSymbol::parse("SPX")?;
//! let cancel = CancellationToken::new();
//!
//! let count = client.constituent_count(&symbol, &cancel).await?;
//! let flags = ExposureFlags::new(true, false, false);
//! let records = client.exposures(&symbol, flags, &cancel).await?.collect().await?;
//! println!("{count} constituents, {} exposure rows", records.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  ExposureClient  │
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │  Retry Executor  │────▶│ Remote Operation │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                   ┌───────────────┴───────────────┐
//!                   ▼                               ▼
//!          ┌─────────────────┐            ┌──────────────────┐
//!          │ HttpClient seam │            │ DetailSource seam│
//!          │ (reqwest/noop)  │            │ (postgres/memory)│
//!          └─────────────────┘            └────────┬─────────┘
//!                                                  ▼
//!                                         ┌──────────────────┐
//!                                         │  ExposureRows    │
//!                                         │  + OrdinalCache  │
//!                                         └──────────────────┘
//! ```

pub mod client;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod hydrate;
pub mod remote;
pub mod retry;

pub use client::{ExposureClient, ExposureClientBuilder, BASE_URL_VAR};
pub use domain::{
    ConstituentWeight, CountryWeight, CurrencyWeight, ExposureFlags, ExposureRecord, IndexSymbol,
};
pub use error::{FetchError, FetchErrorKind, FetchResult, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use hydrate::ExposureRows;
pub use remote::{CountOperation, DetailOperation};
pub use retry::{execute_with_retry, RetryPolicy};

// Store seams callers wire through the builder.
pub use ixion_store::{
    CursorError, DetailSource, MemoryCursor, OrdinalCache, PgProcSource, RowCursor,
    StaticDetailSource,
};
