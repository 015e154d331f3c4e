//! Currency code value type.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

/// A 3-letter uppercase currency code (ISO 4217 style).
///
/// Stored inline as three ASCII bytes so codes are `Copy` and order
/// deterministically in symbol sets and rate maps.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "USD")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// Parses a currency code, normalizing to uppercase.
    ///
    /// # Validation
    /// - Exactly 3 ASCII letters after trimming
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let bytes = input.trim().as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrency(input.to_string()));
        }

        let mut code = [0u8; 3];
        for (dst, src) in code.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Invariant: parse only admits ASCII letters.
        std::str::from_utf8(&self.0).expect("currency code is ASCII")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurrencyCode({})", self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_string()
    }
}

/// Parses a comma-separated symbol list into a set of currency codes.
///
/// Duplicates collapse; an empty list or an empty segment is rejected.
pub fn parse_symbol_list(symbols: &str) -> Result<BTreeSet<CurrencyCode>, DomainError> {
    if symbols.trim().is_empty() {
        return Err(DomainError::Validation(
            "Symbols parameter cannot be empty".into(),
        ));
    }

    let mut set = BTreeSet::new();
    for segment in symbols.split(',') {
        if segment.trim().is_empty() {
            return Err(DomainError::Validation(
                "Symbols parameter contains empty values".into(),
            ));
        }
        set.insert(CurrencyCode::parse(segment)?);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_code() {
        let code = CurrencyCode::parse("USD").unwrap();
        assert_eq!(code.as_str(), "USD");
    }

    #[test]
    fn test_parse_normalizes_case() {
        let code = CurrencyCode::parse("usd").unwrap();
        assert_eq!(code.as_str(), "USD");
        assert_eq!(code, CurrencyCode::parse("USD").unwrap());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let code = CurrencyCode::parse(" GBP ").unwrap();
        assert_eq!(code.as_str(), "GBP");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(CurrencyCode::parse("US").is_err());
        assert!(CurrencyCode::parse("USDX").is_err());
        assert!(CurrencyCode::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_non_letters() {
        assert!(CurrencyCode::parse("U1D").is_err());
        assert!(CurrencyCode::parse("U-D").is_err());
    }

    #[test]
    fn test_symbol_list_collapses_duplicates() {
        let set = parse_symbol_list("USD,GBP,usd").unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&CurrencyCode::parse("USD").unwrap()));
        assert!(set.contains(&CurrencyCode::parse("GBP").unwrap()));
    }

    #[test]
    fn test_symbol_list_rejects_empty() {
        assert!(parse_symbol_list("").is_err());
        assert!(parse_symbol_list("   ").is_err());
    }

    #[test]
    fn test_symbol_list_rejects_empty_segment() {
        assert!(parse_symbol_list("USD,,GBP").is_err());
        assert!(parse_symbol_list("USD,").is_err());
    }

    #[test]
    fn test_symbol_list_rejects_bad_symbol() {
        assert!(parse_symbol_list("USD,EURO").is_err());
    }
}
