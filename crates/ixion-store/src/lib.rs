//! # Ixion Store
//!
//! Tabular access seam for the ixion retrieval layer.
//!
//! ## Overview
//!
//! This crate owns everything row-shaped:
//!
//! - **Row cursor contract** for single-pass, forward-only traversal
//! - **Detail source contract** for acquiring a cursor per query
//! - **Ordinal cache** for amortized column-name resolution
//! - **In-memory doubles** for deterministic offline behavior
//! - **PostgreSQL source** streaming rows from a set-returning procedure
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cursor`] | `RowCursor`/`DetailSource` traits and `CursorError` |
//! | [`memory`] | `MemoryCursor` and `StaticDetailSource` doubles |
//! | [`ordinal`] | Shared column-ordinal cache |
//! | [`postgres`] | `PgProcSource` streaming procedure results |
//!
//! ## Quick Start
//!
//! ```rust
//! use ixion_store::{MemoryCursor, OrdinalCache, RowCursor};
//!
//! # async fn demo() -> Result<(), ixion_store::CursorError> {
//! let mut cursor = MemoryCursor::new("exposures", ["index_symbol"])
//!     .with_row([Some("SPX")]);
//!
//! let cache = OrdinalCache::new();
//! while cursor.advance().await? {
//!     if let Some(ordinal) = cache.resolve(&cursor, "index_symbol").await {
//!         let _symbol = cursor.text(ordinal)?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cursor;
pub mod memory;
pub mod ordinal;
pub mod postgres;

pub use cursor::{CursorError, DetailSource, RowCursor};
pub use memory::{MemoryCursor, StaticDetailSource};
pub use ordinal::{OrdinalCache, LINEAR_SCAN_MAX_COLUMNS};
pub use postgres::{PgProcCursor, PgProcSource};
