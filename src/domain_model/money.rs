use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_CURRENCY: &str = "usd";

/// Positive amount in minor currency units.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub fn new(minor_units: i64) -> Option<Self> {
        u64::try_from(minor_units)
            .ok()
            .filter(|v| *v > 0)
            .map(Amount)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase three-letter ISO currency code.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_lowercase();
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_lowercase()) {
            Some(Currency(code))
        } else {
            None
        }
    }

    /// Falls back to the default currency when nothing was supplied.
    pub fn parse_or_default(raw: Option<&str>) -> Option<Self> {
        match raw {
            Some(code) => Currency::parse(code),
            None => Some(Currency(DEFAULT_CURRENCY.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_must_be_positive() {
        assert!(Amount::new(0).is_none());
        assert!(Amount::new(-5).is_none());
        assert_eq!(Amount::new(1999).map(Amount::get), Some(1999));
    }

    #[test]
    fn currency_is_normalized() {
        assert_eq!(Currency::parse(" EUR ").unwrap().as_str(), "eur");
        assert!(Currency::parse("euro").is_none());
        assert!(Currency::parse("e1r").is_none());
        assert_eq!(Currency::parse_or_default(None).unwrap().as_str(), "usd");
        assert!(Currency::parse_or_default(Some("")).is_none());
    }
}
