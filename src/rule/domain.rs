//! Domain pattern classification.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{LineError, ParseError, ValidationError};
use crate::RuleType;

/// Labels of 1-63 hostname characters joined by dots, ending in an
/// alphabetic TLD of 2-63 letters.
static HOSTNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z0-9-]{1,63}\.)+[A-Za-z]{2,63}$").unwrap());

static KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9.-]+$").unwrap());

const WILDCARD: char = '*';

/// Result of classifying a pattern: the rule kind and its canonical value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: RuleType,
    pub value: String,
}

impl Classified {
    pub fn new(kind: RuleType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Check a string against the hostname grammar.
pub fn is_hostname(s: &str) -> bool {
    HOSTNAME.is_match(s)
}

/// Check a string against the keyword alphabet.
pub fn is_keyword(s: &str) -> bool {
    KEYWORD.is_match(s)
}

/// Classify a domain pattern into one of the domain rule kinds.
///
/// Branches are tried in order:
/// 1. `*.host` with a valid `host` → `DOMAIN-SUFFIX`
/// 2. a valid hostname without wildcards → `DOMAIN`
/// 3. any other pattern with a wildcard → `DOMAIN-KEYWORD` on the text with
///    wildcards removed and outer dots trimmed
///
/// # Examples
/// ```
/// use k2merge::rule::classify;
/// use k2merge::RuleType;
///
/// let c = classify("*.example.com").unwrap();
/// assert_eq!((c.kind, c.value.as_str()), (RuleType::DomainSuffix, "example.com"));
///
/// let c = classify("*ads*.example.com").unwrap();
/// assert_eq!((c.kind, c.value.as_str()), (RuleType::DomainKeyword, "ads.example.com"));
/// ```
pub fn classify(line: &str) -> Result<Classified, LineError> {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix("*.") {
        if is_hostname(rest) {
            return Ok(Classified::new(RuleType::DomainSuffix, rest.to_lowercase()));
        }
    }

    if !line.contains(WILDCARD) {
        if is_hostname(line) {
            return Ok(Classified::new(RuleType::Domain, line.to_lowercase()));
        }
        return Err(ParseError::Unrecognized(line.to_string()).into());
    }

    let stripped: String = line.chars().filter(|&c| c != WILDCARD).collect();
    let keyword = stripped.trim_matches('.');
    if keyword.is_empty() {
        return Err(ParseError::EmptyPattern(line.to_string()).into());
    }
    if !is_keyword(keyword) {
        return Err(ValidationError::InvalidKeyword(line.to_string()).into());
    }

    Ok(Classified::new(
        RuleType::DomainKeyword,
        keyword.to_lowercase(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_value(line: &str) -> (RuleType, String) {
        let c = classify(line).unwrap();
        (c.kind, c.value)
    }

    #[test]
    fn test_hostname_grammar() {
        assert!(is_hostname("example.com"));
        assert!(is_hostname("a-b.c1.example.co"));
        assert!(is_hostname("xn--fiqs8s.cn"));
        assert!(!is_hostname("localhost"));
        assert!(!is_hostname("example.c"));
        assert!(!is_hostname("example.123"));
        assert!(!is_hostname("exa_mple.com"));
        assert!(!is_hostname(".example.com"));
        assert!(!is_hostname(&format!("{}.com", "a".repeat(64))));
        assert!(is_hostname(&format!("{}.com", "a".repeat(63))));
    }

    #[test]
    fn test_classify_suffix() {
        assert_eq!(
            kind_value("*.example.com"),
            (RuleType::DomainSuffix, "example.com".to_string())
        );
        assert_eq!(
            kind_value("*.Bank.COM"),
            (RuleType::DomainSuffix, "bank.com".to_string())
        );
    }

    #[test]
    fn test_classify_exact() {
        assert_eq!(
            kind_value("example.com"),
            (RuleType::Domain, "example.com".to_string())
        );
        assert_eq!(
            kind_value("  www.example.com  "),
            (RuleType::Domain, "www.example.com".to_string())
        );
    }

    #[test]
    fn test_classify_keyword() {
        assert_eq!(
            kind_value("*ads*.example.com"),
            (RuleType::DomainKeyword, "ads.example.com".to_string())
        );
        assert_eq!(
            kind_value("*.google.*"),
            (RuleType::DomainKeyword, "google".to_string())
        );
        assert_eq!(
            kind_value("cdn*.example.org"),
            (RuleType::DomainKeyword, "cdn.example.org".to_string())
        );
        // Suffix branch falls through when the remainder is not a hostname
        assert_eq!(
            kind_value("*.*.example.com"),
            (RuleType::DomainKeyword, "example.com".to_string())
        );
    }

    #[test]
    fn test_classify_rejects() {
        assert!(matches!(
            classify("localhost"),
            Err(LineError::Parse(ParseError::Unrecognized(_)))
        ));
        assert!(matches!(
            classify("*"),
            Err(LineError::Parse(ParseError::EmptyPattern(_)))
        ));
        assert!(matches!(
            classify("*.*"),
            Err(LineError::Parse(ParseError::EmptyPattern(_)))
        ));
        assert!(matches!(
            classify("*bad_host*.com"),
            Err(LineError::Validation(ValidationError::InvalidKeyword(_)))
        ));
    }
}
