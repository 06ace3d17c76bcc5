use crate::domain::{CountryId, CountryRule, Registry};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Why a number was not accepted. Callers of [`Normalizer::normalize`] only
/// ever see "invalid"; the reason is kept for diagnostics and tests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("unknown country: {0}")]
    UnknownCountry(String),
    #[error("expected {expected} digits, found {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("digits do not match the country pattern")]
    PatternMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPhone {
    pub country: CountryId,
    pub dialing_code: String,
    pub national: String,
}

impl NormalizedPhone {
    pub fn international(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NormalizedPhone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.dialing_code, self.national)
    }
}

/// Keeps ASCII digits in their original order and drops everything else.
pub fn clean_digits(raw: &str) -> String {
    raw.chars().filter(|ch| ch.is_ascii_digit()).collect()
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    registry: Registry,
}

impl Normalizer {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the canonical international number, or `None` when the input
    /// is not valid for the resolved country.
    pub fn normalize(&self, raw: &str, country: Option<&str>) -> Option<String> {
        let resolved = self.registry.resolve_country(country);
        match self.rule_for(resolved).and_then(|(_, rule)| rule.apply(raw)) {
            Ok(normalized) => Some(normalized),
            Err(reason) => {
                debug!(country = resolved, reason = %reason, "phone number rejected");
                None
            }
        }
    }

    pub fn check(&self, raw: &str, country: Option<&str>) -> Result<NormalizedPhone, Rejection> {
        let resolved = self.registry.resolve_country(country);
        let (id, rule) = self.rule_for(resolved)?;
        let national = rule.validate(raw)?;
        Ok(NormalizedPhone {
            country: id.clone(),
            dialing_code: rule.dialing_code().to_string(),
            national,
        })
    }

    fn rule_for(&self, country: &str) -> Result<(&CountryId, &CountryRule), Rejection> {
        self.registry
            .lookup_entry(country)
            .ok_or_else(|| Rejection::UnknownCountry(country.to_string()))
    }
}
