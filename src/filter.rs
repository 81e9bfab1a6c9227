use regex::Regex;

use crate::error::Result;

/// The global filter applied to every panel.
///
/// Patterns are compiled when the filter is set, so matching at render time
/// cannot fail.
#[derive(Clone, Debug)]
pub struct ActiveFilter {
    /// The pattern string as typed
    pub pattern: String,
    compiled: Regex,
}

impl ActiveFilter {
    /// Compile `pattern`. Empty input means "no filter" and yields `Ok(None)`.
    pub fn parse(pattern: &str) -> Result<Option<Self>> {
        if pattern.is_empty() {
            return Ok(None);
        }
        let compiled = Regex::new(pattern)?;
        Ok(Some(Self {
            pattern: pattern.to_string(),
            compiled,
        }))
    }

    /// Case-sensitive, unanchored match
    pub fn matches(&self, line: &str) -> bool {
        self.compiled.is_match(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LogwallError;

    #[test]
    fn empty_pattern_clears() {
        assert!(ActiveFilter::parse("").unwrap().is_none());
    }

    #[test]
    fn matches_anywhere_case_sensitive() {
        let filter = ActiveFilter::parse("ERROR").unwrap().unwrap();
        assert!(filter.matches("2024-01-01 ERROR bad"));
        assert!(!filter.matches("error bad"));
    }

    #[test]
    fn regex_syntax_is_honoured() {
        let filter = ActiveFilter::parse(r"^\d+ (WARN|ERROR)").unwrap().unwrap();
        assert!(filter.matches("12 WARN disk"));
        assert!(!filter.matches("x 12 WARN disk"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = ActiveFilter::parse("[unclosed").unwrap_err();
        assert!(matches!(err, LogwallError::FilterSyntax(_)));
    }
}
