use crate::domain::country::CountryId;
use crate::domain::rule::CountryRule;
use crate::error::CoreError;
use std::collections::BTreeMap;

/// Immutable set of country rules plus the default country used when a
/// caller does not name one.
///
/// Built once at startup and only read afterwards, so it can be shared
/// across threads behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct Registry {
    default_country: CountryId,
    rules: BTreeMap<CountryId, CountryRule>,
}

impl Registry {
    /// The default country does not have to be present in `rules`; calls
    /// that fall back to a missing default are rejected as unknown.
    pub fn new<I>(default_country: CountryId, rules: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (CountryId, CountryRule)>,
    {
        let mut map = BTreeMap::new();
        for (id, rule) in rules {
            if map.contains_key(&id) {
                return Err(CoreError::DuplicateCountry(id.to_string()));
            }
            map.insert(id, rule);
        }
        Ok(Self {
            default_country,
            rules: map,
        })
    }

    pub fn default_country(&self) -> &CountryId {
        &self.default_country
    }

    /// Picks the explicit identifier when it is present and non-empty,
    /// otherwise the configured default. Existence is not checked.
    pub fn resolve_country<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        match explicit {
            Some(id) if !id.is_empty() => id,
            _ => self.default_country.as_str(),
        }
    }

    /// Exact match on the stored identifier.
    pub fn lookup_rule(&self, country: &str) -> Option<&CountryRule> {
        self.rules.get(country)
    }

    pub(crate) fn lookup_entry(&self, country: &str) -> Option<(&CountryId, &CountryRule)> {
        self.rules.get_key_value(country)
    }

    pub fn contains(&self, country: &str) -> bool {
        self.lookup_rule(country).is_some()
    }

    /// Rules ordered by identifier.
    pub fn countries(&self) -> impl Iterator<Item = (&CountryId, &CountryRule)> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
