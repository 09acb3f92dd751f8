use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

/// An IATA airport code, e.g. `HND`. Identifies a shard.
#[derive(
    Clone,
    Debug,
    Default,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    Hash,
    FromStr,
)]
pub struct AirportCode(pub String);

impl AirportCode {
    /// The code as a string slice.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code is blank, which only happens for malformed routes.
    #[must_use]
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for AirportCode {
    #[inline]
    fn from(s: &str) -> Self {
        AirportCode(s.to_owned())
    }
}

impl From<String> for AirportCode {
    #[inline]
    fn from(s: String) -> Self {
        AirportCode(s)
    }
}

/// A carrier (airline) code. Case-sensitive, usually the two character IATA designator.
#[derive(
    Clone,
    Debug,
    Default,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    Hash,
    FromStr,
)]
pub struct CarrierCode(pub String);

impl CarrierCode {
    /// The code as a string slice.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CarrierCode {
    #[inline]
    fn from(s: &str) -> Self {
        CarrierCode(s.to_owned())
    }
}

impl From<String> for CarrierCode {
    #[inline]
    fn from(s: String) -> Self {
        CarrierCode(s)
    }
}

/// An ISO 3166-1 alpha-2 country code.
#[derive(
    Clone,
    Debug,
    Default,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    Hash,
    FromStr,
)]
pub struct CountryCode(pub String);

impl CountryCode {
    /// Japan, the only country whose internal routes count as domestic.
    #[must_use]
    #[inline]
    pub fn japan() -> Self {
        CountryCode("JP".to_owned())
    }
}

impl From<&str> for CountryCode {
    #[inline]
    fn from(s: &str) -> Self {
        CountryCode(s.to_owned())
    }
}

/// A calendar date in `YYYY-MM-DD` form, as stored in `updatedAt` and `lastChecked`.
#[derive(
    Clone,
    Debug,
    Default,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Deserialize,
    Serialize,
    Hash,
    FromStr,
)]
pub struct IsoDate(pub String);

impl IsoDate {
    /// Today's date in UTC.
    #[must_use]
    #[inline]
    pub fn today() -> Self {
        IsoDate(chrono::Utc::now().format("%Y-%m-%d").to_string())
    }
}

impl From<&str> for IsoDate {
    #[inline]
    fn from(s: &str) -> Self {
        IsoDate(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_formats_today_as_an_iso_date() {
        let today = IsoDate::today();
        assert_eq!(today.0.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&today.0, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn it_treats_whitespace_codes_as_blank() {
        assert!(AirportCode::from(" ").is_blank());
        assert!(!AirportCode::from("HND").is_blank());
    }

    #[test]
    fn it_keeps_carrier_codes_case_sensitive() {
        assert_ne!(CarrierCode::from("nh"), CarrierCode::from("NH"));
        assert_eq!(CarrierCode::from("NH").to_string(), "NH");
    }
}
