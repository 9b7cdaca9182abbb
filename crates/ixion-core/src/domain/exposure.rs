use serde::{Deserialize, Serialize};

/// Country weight entry decoded from a country exposure payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryWeight {
    pub country: String,
    pub weight: f64,
}

/// Currency weight entry decoded from a currency exposure payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyWeight {
    pub currency: String,
    pub weight: f64,
}

/// Constituent entry decoded from a composition payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentWeight {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub weight: f64,
}

/// Which optional exposure payloads to decode during hydration.
///
/// Unset flags skip ordinal resolution and decoding for their column
/// entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExposureFlags {
    pub include_country: bool,
    pub include_currency: bool,
    pub include_composition: bool,
}

impl ExposureFlags {
    pub const fn new(
        include_country: bool,
        include_currency: bool,
        include_composition: bool,
    ) -> Self {
        Self {
            include_country,
            include_currency,
            include_composition,
        }
    }

    pub const fn none() -> Self {
        Self::new(false, false, false)
    }

    pub const fn all() -> Self {
        Self::new(true, true, true)
    }

    pub const fn any(self) -> bool {
        self.include_country || self.include_currency || self.include_composition
    }
}

/// One hydrated exposure row.
///
/// Every optional field is `None` unless its flag was set, the source cell
/// was non-null, and the payload decoded successfully.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExposureRecord {
    pub index_symbol: Option<String>,
    pub country: Option<Vec<CountryWeight>>,
    pub currency: Option<Vec<CurrencyWeight>>,
    pub composition: Option<Vec<ConstituentWeight>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_request_nothing() {
        let flags = ExposureFlags::default();
        assert_eq!(flags, ExposureFlags::none());
        assert!(!flags.any());
        assert!(ExposureFlags::all().any());
    }

    #[test]
    fn country_payload_decodes_from_json() {
        let payload = r#"[{"country":"US","weight":0.62},{"country":"JP","weight":0.08}]"#;
        let entries: Vec<CountryWeight> =
            serde_json::from_str(payload).expect("payload should decode");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].country, "US");
        assert!((entries[0].weight - 0.62).abs() < f64::EPSILON);
    }

    #[test]
    fn constituent_name_is_optional() {
        let payload = r#"[{"symbol":"AAPL","weight":0.07}]"#;
        let entries: Vec<ConstituentWeight> =
            serde_json::from_str(payload).expect("payload should decode");

        assert_eq!(entries[0].symbol, "AAPL");
        assert!(entries[0].name.is_none());
    }
}
