use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A latitude/longitude pair as typed by the user.
///
/// Both components are trimmed and non-empty. They are kept as text and are
/// never range-checked: a malformed number surfaces later as a provider error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinates {
    /// Build a pair from raw components, or `None` if either is blank.
    pub fn new(latitude: &str, longitude: &str) -> Option<Self> {
        let latitude = latitude.trim();
        let longitude = longitude.trim();

        if latitude.is_empty() || longitude.is_empty() {
            return None;
        }

        Some(Self {
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinates {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        split_pair(s).ok_or_else(|| ConfigError::InvalidFallback(s.to_string()))
    }
}

/// Extract coordinates from the first line of a note block.
///
/// A blank or absent query yields `fallback` unchanged. Otherwise the query is
/// split on its first comma; `None` means the text could not be parsed and the
/// caller must report it rather than fetch anything.
pub fn parse_query(query: Option<&str>, fallback: &Coordinates) -> Option<Coordinates> {
    match query {
        Some(q) if !q.trim().is_empty() => split_pair(q),
        _ => Some(fallback.clone()),
    }
}

fn split_pair(text: &str) -> Option<Coordinates> {
    let (latitude, longitude) = text.split_once(',')?;
    Coordinates::new(latitude, longitude)
}
