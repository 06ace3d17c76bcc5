use crate::error::CoreError;
use crate::normalize::{clean_digits, Rejection};
use regex::Regex;

const MAX_DIALING_CODE_DIGITS: usize = 4;

/// Normalization rule for one country.
///
/// The validation pattern is compiled once here and always matched against
/// the whole cleaned digit string, whether or not the source carries its own
/// `^`/`$` anchors. Length and pattern are checked independently.
#[derive(Debug, Clone)]
pub struct CountryRule {
    dialing_code: String,
    pattern: String,
    matcher: Regex,
    length: usize,
}

impl CountryRule {
    pub fn new(dialing_code: &str, pattern: &str, length: usize) -> Result<Self, CoreError> {
        let dialing_code = validate_dialing_code(dialing_code)?;
        if length == 0 {
            return Err(CoreError::InvalidLength(length));
        }
        let matcher =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|err| CoreError::InvalidPattern {
                pattern: pattern.to_string(),
                message: err.to_string(),
            })?;

        Ok(Self {
            dialing_code,
            pattern: pattern.to_string(),
            matcher,
            length,
        })
    }

    pub fn dialing_code(&self) -> &str {
        &self.dialing_code
    }

    /// Pattern source as authored, without the added anchoring.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn matches(&self, digits: &str) -> bool {
        self.matcher.is_match(digits)
    }

    /// Cleans `raw`, checks length then pattern, and returns the canonical
    /// international form.
    pub fn apply(&self, raw: &str) -> Result<String, Rejection> {
        let digits = self.validate(raw)?;
        Ok(format!("{}{}", self.dialing_code, digits))
    }

    pub(crate) fn validate(&self, raw: &str) -> Result<String, Rejection> {
        let digits = clean_digits(raw);
        if digits.len() != self.length {
            return Err(Rejection::LengthMismatch {
                expected: self.length,
                actual: digits.len(),
            });
        }
        if !self.matches(&digits) {
            return Err(Rejection::PatternMismatch);
        }
        Ok(digits)
    }
}

fn validate_dialing_code(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let valid = match trimmed.strip_prefix('+') {
        Some(digits) => {
            !digits.is_empty()
                && digits.len() <= MAX_DIALING_CODE_DIGITS
                && digits.chars().all(|ch| ch.is_ascii_digit())
        }
        None => false,
    };
    if !valid {
        return Err(CoreError::InvalidDialingCode(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::CountryRule;
    use crate::error::CoreError;
    use crate::normalize::Rejection;

    fn senegal() -> CountryRule {
        CountryRule::new("+221", "^7[05678][0-9]{7}$", 9).expect("rule")
    }

    #[test]
    fn apply_prefixes_dialing_code() {
        let rule = senegal();
        assert_eq!(rule.apply("78 485 28 12").unwrap(), "+221784852812");
    }

    #[test]
    fn apply_checks_length_before_pattern() {
        let rule = senegal();
        let err = rule.apply("7848528").unwrap_err();
        assert_eq!(
            err,
            Rejection::LengthMismatch {
                expected: 9,
                actual: 7
            }
        );
    }

    #[test]
    fn apply_rejects_pattern_mismatch() {
        let rule = senegal();
        assert_eq!(rule.apply("600000000").unwrap_err(), Rejection::PatternMismatch);
    }

    #[test]
    fn unanchored_pattern_still_matches_whole_string() {
        let rule = CountryRule::new("+1", "55", 4).expect("rule");
        assert!(rule.matches("55"));
        assert_eq!(rule.apply("1551").unwrap_err(), Rejection::PatternMismatch);
    }

    #[test]
    fn alternation_is_anchored_as_a_group() {
        let rule = CountryRule::new("+225", "0[157]|2[57]", 2).expect("rule");
        assert!(rule.matches("01"));
        assert!(!rule.matches("011"));
    }

    #[test]
    fn new_rejects_bad_dialing_code() {
        for code in ["221", "+", "+22a", "+12345", ""] {
            assert!(matches!(
                CountryRule::new(code, "[0-9]+", 9),
                Err(CoreError::InvalidDialingCode(_))
            ));
        }
    }

    #[test]
    fn new_rejects_zero_length() {
        assert_eq!(
            CountryRule::new("+221", "[0-9]+", 0).unwrap_err(),
            CoreError::InvalidLength(0)
        );
    }

    #[test]
    fn new_rejects_invalid_pattern() {
        let err = CountryRule::new("+221", "7[0-9", 9).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPattern { .. }));
    }

    #[test]
    fn pattern_keeps_authored_source() {
        assert_eq!(senegal().pattern(), "^7[05678][0-9]{7}$");
    }
}
