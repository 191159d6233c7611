use core::str::FromStr;

use serde::{Deserialize, Serialize};

use roost_core::{DomainError, DomainResult};

/// Two-letter country code, always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CountryCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let code = value.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::invalid_id(format!(
                "country code '{value}' must be two letters"
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }
}

impl From<CountryCode> for String {
    fn from(value: CountryCode) -> Self {
        value.0
    }
}

impl FromStr for CountryCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl core::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A country. Unlike every other record it has no uuid and no timestamps:
/// the code is the identity and the collection is read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub code: CountryCode,
    pub name: String,
}

impl Country {
    pub fn new(code: CountryCode, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("country name cannot be empty"));
        }
        Ok(Self { code, name })
    }

    /// Built-in reference set seeded into the store at startup.
    pub fn reference_set() -> Vec<Country> {
        const ENTRIES: &[(&str, &str)] = &[
            ("AR", "Argentina"),
            ("AU", "Australia"),
            ("BR", "Brazil"),
            ("CA", "Canada"),
            ("CH", "Switzerland"),
            ("CN", "China"),
            ("CO", "Colombia"),
            ("DE", "Germany"),
            ("EG", "Egypt"),
            ("ES", "Spain"),
            ("FR", "France"),
            ("GB", "United Kingdom"),
            ("GR", "Greece"),
            ("IN", "India"),
            ("IT", "Italy"),
            ("JP", "Japan"),
            ("KE", "Kenya"),
            ("MA", "Morocco"),
            ("MX", "Mexico"),
            ("NG", "Nigeria"),
            ("NL", "Netherlands"),
            ("NZ", "New Zealand"),
            ("PT", "Portugal"),
            ("TH", "Thailand"),
            ("US", "United States"),
            ("UY", "Uruguay"),
        ];

        ENTRIES
            .iter()
            .map(|(code, name)| Country {
                code: CountryCode(code.to_string()),
                name: name.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_normalise_to_uppercase() {
        let code: CountryCode = "fr".parse().unwrap();
        assert_eq!(code.as_str(), "FR");
        assert_eq!(code.to_string(), "FR");
    }

    #[test]
    fn codes_reject_bad_shapes() {
        for raw in ["", "F", "FRA", "F1", "  ", "éé"] {
            assert!(raw.parse::<CountryCode>().is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn codes_serialize_as_plain_strings() {
        let code: CountryCode = "us".parse().unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"US\"");
        let back: CountryCode = serde_json::from_str("\"us\"").unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<CountryCode>("\"USA\"").is_err());
    }

    #[test]
    fn reference_set_has_unique_codes() {
        let set = Country::reference_set();
        let mut codes: Vec<&str> = set.iter().map(|c| c.code.as_str()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), set.len());
        assert!(codes.contains(&"US"));
    }

    #[test]
    fn country_requires_a_name() {
        let code: CountryCode = "US".parse().unwrap();
        assert!(Country::new(code, "  ").is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            #[test]
            fn two_letter_codes_always_parse(raw in "[A-Za-z]{2}") {
                let code: CountryCode = raw.parse().unwrap();
                prop_assert_eq!(code.as_str(), raw.to_ascii_uppercase());
            }

            #[test]
            fn parse_display_round_trip(raw in "[A-Z]{2}") {
                let code: CountryCode = raw.parse().unwrap();
                let again: CountryCode = code.to_string().parse().unwrap();
                prop_assert_eq!(again, code);
            }
        }
    }
}
