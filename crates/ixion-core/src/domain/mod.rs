//! # Domain Models
//!
//! Typed values flowing through the retrieval layer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`IndexSymbol`] | Validated index identifier |
//! | [`ExposureFlags`] | Which optional payloads to decode |
//! | [`ExposureRecord`] | One hydrated exposure row |
//! | [`CountryWeight`] | Country exposure entry |
//! | [`CurrencyWeight`] | Currency exposure entry |
//! | [`ConstituentWeight`] | Composition entry |
//!
//! All identifiers validate at construction time; records are plain data
//! with full serde support.

mod exposure;
mod symbol;

pub use exposure::{
    ConstituentWeight, CountryWeight, CurrencyWeight, ExposureFlags, ExposureRecord,
};
pub use symbol::IndexSymbol;
