//! Whitelist text parser.
//!
//! Each data line is either a dotted wildcard IPv4 pattern (or CIDR) or a
//! domain pattern. Domain lines may carry a URL-style path, which is dropped.

use crate::error::LineError;
use crate::rule::{classify, is_ip_pattern, wildcard_to_cidr, Classified, Rule};
use crate::RuleType;

use super::filter::filter_lines;
use super::{Dialect, ExactDomainMode, ParseOptions, ParsedSource};

/// Whitelist text parser.
pub struct WhitelistParser;

impl WhitelistParser {
    /// Parse whitelist text into DIRECT rules.
    pub fn parse(text: &str, options: &ParseOptions) -> ParsedSource {
        let mut parsed = ParsedSource::default();
        let target = Dialect::Whitelist.policy();

        for line in filter_lines(text) {
            parsed.stats.lines += 1;
            match classify_pattern(line, options) {
                Ok(classified) => {
                    parsed.rules.push(Rule::from_classified(classified, target));
                    parsed.stats.accepted += 1;
                }
                Err(e) => parsed.stats.record_error("whitelist", line, &e),
            }
        }

        parsed
    }
}

/// Classify one pattern as an IP rule or a domain rule.
///
/// This is the single entry point used by every dialect that carries raw
/// patterns, so wildcard IPs and domain patterns behave the same no matter
/// where they came from.
pub fn classify_pattern(pattern: &str, options: &ParseOptions) -> Result<Classified, LineError> {
    let pattern = pattern.trim();

    if is_ip_pattern(pattern) {
        let cidr = wildcard_to_cidr(pattern)?;
        return Ok(Classified::new(RuleType::IpCidr, cidr));
    }

    let host = match pattern.find('/') {
        Some(idx) => &pattern[..idx],
        None => pattern,
    };

    let mut classified = classify(host)?;
    if classified.kind == RuleType::Domain && options.exact_domain == ExactDomainMode::DomainSuffix
    {
        classified.kind = RuleType::DomainSuffix;
    }
    Ok(classified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Target;

    #[test]
    fn test_parse_whitelist() {
        let text = r#"
// SwitchyOmega whitelist
; generated
10.*.*.*
192.168.*.*
*.bank.com
example.org
*cdn*.example.net
10.*.1.*
not_a_domain
"#;

        let parsed = WhitelistParser::parse(text, &ParseOptions::default());
        let lines: Vec<String> = parsed.rules.iter().map(|r| r.to_string()).collect();

        assert_eq!(
            lines,
            vec![
                "IP-CIDR,10.0.0.0/8,DIRECT",
                "IP-CIDR,192.168.0.0/16,DIRECT",
                "DOMAIN-SUFFIX,bank.com,DIRECT",
                "DOMAIN,example.org,DIRECT",
                "DOMAIN-KEYWORD,cdn.example.net,DIRECT",
            ]
        );
        assert_eq!(parsed.stats.lines, 7);
        assert_eq!(parsed.stats.accepted, 5);
        assert_eq!(parsed.stats.parse_errors, 2);
        assert_eq!(parsed.stats.validation_errors, 0);
        assert!(parsed.rules.iter().all(|r| r.target() == Target::Direct));
    }

    #[test]
    fn test_exact_domain_as_suffix() {
        let options = ParseOptions {
            exact_domain: ExactDomainMode::DomainSuffix,
        };
        let c = classify_pattern("example.com", &options).unwrap();
        assert_eq!(c.kind, RuleType::DomainSuffix);

        // Keywords and suffixes are unaffected
        let c = classify_pattern("*ads*.example.com", &options).unwrap();
        assert_eq!(c.kind, RuleType::DomainKeyword);
    }

    #[test]
    fn test_domain_with_path() {
        let c = classify_pattern("example.com/some/path", &ParseOptions::default()).unwrap();
        assert_eq!(c, Classified::new(RuleType::Domain, "example.com"));
    }

    #[test]
    fn test_cidr_line() {
        let c = classify_pattern("100.64.0.0/10", &ParseOptions::default()).unwrap();
        assert_eq!(c, Classified::new(RuleType::IpCidr, "100.64.0.0/10"));
    }
}
