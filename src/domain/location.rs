use std::{fmt, str::FromStr};

use non_empty_string::NonEmptyString;

/// A `country-province-city` location as stored in cause metadata.
///
/// The city may itself contain dashes; only the first two separate fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    country: NonEmptyString,
    province: NonEmptyString,
    city: NonEmptyString,
}

/// Error returned when a location string is not `country-province-city`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location '{0}': expected country-province-city")]
pub struct LocationError(String);

impl Location {
    /// Build a location from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] if any part is empty, or the country or
    /// province contain the `-` separator.
    pub fn new(country: &str, province: &str, city: &str) -> Result<Self, LocationError> {
        let joined = format!("{country}-{province}-{city}");
        if country.contains('-') || province.contains('-') {
            return Err(LocationError(joined));
        }
        let part = |s: &str| {
            NonEmptyString::new(s.trim().to_string()).map_err(|_| LocationError(joined.clone()))
        };
        Ok(Self {
            country: part(country)?,
            province: part(province)?,
            city: part(city)?,
        })
    }

    /// The country name.
    #[must_use]
    pub fn country(&self) -> &str {
        self.country.as_str()
    }

    /// The province or state name.
    #[must_use]
    pub fn province(&self) -> &str {
        self.province.as_str()
    }

    /// The city name.
    #[must_use]
    pub fn city(&self) -> &str {
        self.city.as_str()
    }

    /// Compact upper-case form for cards, e.g. `CALGARY, ALBERTA`.
    #[must_use]
    pub fn short(&self) -> String {
        format!("{}, {}", self.city, self.province).to_uppercase()
    }

    /// Render a stored location string for display.
    ///
    /// Strings that do not parse render as empty rather than failing, since
    /// older records carry no location at all.
    #[must_use]
    pub fn format(raw: &str) -> String {
        raw.parse::<Self>().map(|l| l.short()).unwrap_or_default()
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(country), Some(province), Some(city)) => Self::new(country, province, city),
            _ => Err(LocationError(s.to_string())),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.country, self.province, self.city)
    }
}
