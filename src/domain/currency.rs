use serde::{Deserialize, Serialize};

/// Currencies a loan can be denominated in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Thb,
    Usd,
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Thb, Currency::Usd, Currency::Eur];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Thb => "THB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "THB" => Some(Currency::Thb),
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            _ => None,
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_str(s).ok_or_else(|| format!("unknown currency: {}", s))
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_roundtrip() {
        for currency in Currency::ALL {
            let parsed = Currency::from_str(currency.as_str()).unwrap();
            assert_eq!(currency, parsed);
        }
    }

    #[test]
    fn test_currency_is_case_insensitive() {
        assert_eq!(Currency::from_str("usd"), Some(Currency::Usd));
        assert_eq!(Currency::from_str(" eur "), Some(Currency::Eur));
        assert_eq!(Currency::from_str("JPY"), None);
    }

    #[test]
    fn test_default_currency_is_thb() {
        assert_eq!(Currency::default(), Currency::Thb);
    }

    #[test]
    fn test_display_honors_width() {
        assert_eq!(format!("[{:<5}]", Currency::Usd), "[USD  ]");
    }

    #[test]
    fn test_currency_serializes_uppercase() {
        let json = serde_json::to_string(&Currency::Usd).unwrap();
        assert_eq!(json, "\"USD\"");
    }
}
