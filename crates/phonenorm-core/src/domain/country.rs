use crate::error::CoreError;
use std::borrow::Borrow;
use std::fmt;

/// Short country key such as `SN` or `CI`, stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountryId(String);

impl CountryId {
    pub fn new(raw: &str) -> Result<Self, CoreError> {
        let normalized = normalize_country_id(raw)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CountryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

pub fn normalize_country_id(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(CoreError::InvalidCountryId(raw.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}
