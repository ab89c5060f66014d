//! Supported site languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language variant of the site.
///
/// Carried either as the first path segment (`/en/...`) or as the
/// `locale` cookie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vi,
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Vi, Locale::En];

    /// Path segment / cookie representation.
    pub fn code(self) -> &'static str {
        match self {
            Locale::Vi => "vi",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown locale code: {0:?}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    /// Exact, case-sensitive match; `/EN/` is not a locale segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|l| l.code() == s)
            .ok_or_else(|| UnknownLocale(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!("vi".parse::<Locale>().unwrap(), Locale::Vi);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert!("EN".parse::<Locale>().is_err());
        assert!("".parse::<Locale>().is_err());
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_display_matches_code() {
        for locale in Locale::ALL {
            assert_eq!(locale.to_string(), locale.code());
        }
    }
}
