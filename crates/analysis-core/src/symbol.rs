use crate::error::AnalysisError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const MAX_BASE_LEN: usize = 20;
const MAX_COMPARISON_TICKERS: usize = 5;
const MIN_COMPARISON_TICKERS: usize = 2;

/// Exchange a symbol is quoted on. NSE is the default when a raw ticker
/// carries no suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    #[serde(rename = "NSE")]
    Nse,
    #[serde(rename = "BSE")]
    Bse,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Nse => "NSE",
            Exchange::Bse => "BSE",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Exchange::Nse => "NS",
            Exchange::Bse => "BO",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized exchange-qualified ticker, e.g. `RELIANCE.NS`.
///
/// Built once per request from raw user input and immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TickerSymbol {
    base: String,
    exchange: Exchange,
}

impl TickerSymbol {
    /// Parse and validate a raw ticker. Uppercases, resolves a recognized
    /// `.NS`/`.BO` suffix (defaulting to NSE), and requires the bare symbol
    /// to be alphanumeric with length 1-20.
    pub fn parse(raw: &str) -> Result<Self, AnalysisError> {
        let trimmed = raw.trim().to_uppercase();

        let (base, exchange) = if let Some(stripped) = trimmed.strip_suffix(".NS") {
            (stripped, Exchange::Nse)
        } else if let Some(stripped) = trimmed.strip_suffix(".BO") {
            (stripped, Exchange::Bse)
        } else {
            (trimmed.as_str(), Exchange::Nse)
        };

        if base.is_empty() || base.len() > MAX_BASE_LEN {
            return Err(AnalysisError::InvalidTicker(format!(
                "'{raw}' must be 1-{MAX_BASE_LEN} characters"
            )));
        }
        if !base.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AnalysisError::InvalidTicker(format!(
                "'{raw}' contains non-alphanumeric characters"
            )));
        }

        Ok(Self {
            base: base.to_string(),
            exchange,
        })
    }

    /// Parse a comma-separated comparison list; 2-5 tickers are accepted.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, AnalysisError> {
        let symbols: Vec<Self> = raw
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Self::parse)
            .collect::<Result<_, _>>()?;

        if symbols.len() < MIN_COMPARISON_TICKERS || symbols.len() > MAX_COMPARISON_TICKERS {
            return Err(AnalysisError::InvalidTicker(format!(
                "comparison accepts {MIN_COMPARISON_TICKERS}-{MAX_COMPARISON_TICKERS} tickers, got {}",
                symbols.len()
            )));
        }
        Ok(symbols)
    }

    /// Bare symbol without the exchange suffix, e.g. `RELIANCE`.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// Provider-facing qualified form, e.g. `RELIANCE.NS`.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.base, self.exchange.suffix())
    }
}

impl fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.base, self.exchange.suffix())
    }
}

impl Serialize for TickerSymbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.qualified())
    }
}

impl<'de> Deserialize<'de> for TickerSymbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_ticker_to_nse() {
        let symbol = TickerSymbol::parse("reliance").unwrap();
        assert_eq!(symbol.base(), "RELIANCE");
        assert_eq!(symbol.exchange(), Exchange::Nse);
        assert_eq!(symbol.qualified(), "RELIANCE.NS");
    }

    #[test]
    fn preserves_bse_suffix() {
        let symbol = TickerSymbol::parse("TCS.BO").unwrap();
        assert_eq!(symbol.exchange(), Exchange::Bse);
        assert_eq!(symbol.qualified(), "TCS.BO");
    }

    #[test]
    fn rejects_empty_and_overlong() {
        assert!(TickerSymbol::parse("").is_err());
        assert!(TickerSymbol::parse("   ").is_err());
        assert!(TickerSymbol::parse(&"A".repeat(21)).is_err());
        assert!(TickerSymbol::parse(&"A".repeat(20)).is_ok());
    }

    #[test]
    fn rejects_non_alphanumeric() {
        assert!(TickerSymbol::parse("REL-IANCE").is_err());
        assert!(TickerSymbol::parse("REL IANCE").is_err());
        assert!(TickerSymbol::parse("TCS@NS").is_err());
    }

    #[test]
    fn accepts_digits() {
        let symbol = TickerSymbol::parse("500325.BO").unwrap();
        assert_eq!(symbol.base(), "500325");
    }

    #[test]
    fn comparison_list_bounds() {
        assert!(TickerSymbol::parse_list("RELIANCE").is_err());
        assert!(TickerSymbol::parse_list("RELIANCE,TCS").is_ok());
        assert!(TickerSymbol::parse_list("A,B,C,D,E").is_ok());
        assert!(TickerSymbol::parse_list("A,B,C,D,E,F").is_err());

        let symbols = TickerSymbol::parse_list(" infy , tcs.bo ").unwrap();
        assert_eq!(symbols[0].qualified(), "INFY.NS");
        assert_eq!(symbols[1].qualified(), "TCS.BO");
    }
}
