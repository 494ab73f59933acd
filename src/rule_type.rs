//! Rule kind definitions.

use serde::Serialize;
use std::fmt;

/// RuleType represents the kind of a rule in the output grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RuleType {
    /// IPv4 CIDR range
    #[serde(rename = "IP-CIDR")]
    IpCidr,
    /// Exact domain match
    #[serde(rename = "DOMAIN")]
    Domain,
    /// Domain and all of its subdomains
    #[serde(rename = "DOMAIN-SUFFIX")]
    DomainSuffix,
    /// Any domain containing the value
    #[serde(rename = "DOMAIN-KEYWORD")]
    DomainKeyword,
}

impl RuleType {
    /// Parse a rule type from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "IP-CIDR" | "IPCIDR" => Some(RuleType::IpCidr),
            "DOMAIN" => Some(RuleType::Domain),
            "DOMAIN-SUFFIX" | "DOMAINSUFFIX" => Some(RuleType::DomainSuffix),
            "DOMAIN-KEYWORD" | "DOMAINKEYWORD" => Some(RuleType::DomainKeyword),
            _ => None,
        }
    }

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::IpCidr => "IP-CIDR",
            RuleType::Domain => "DOMAIN",
            RuleType::DomainSuffix => "DOMAIN-SUFFIX",
            RuleType::DomainKeyword => "DOMAIN-KEYWORD",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_type_from_str() {
        assert_eq!(RuleType::parse("DOMAIN"), Some(RuleType::Domain));
        assert_eq!(RuleType::parse("domain"), Some(RuleType::Domain));
        assert_eq!(RuleType::parse("IP-CIDR"), Some(RuleType::IpCidr));
        assert_eq!(RuleType::parse("IPCIDR"), Some(RuleType::IpCidr));
        assert_eq!(RuleType::parse("Domain-Suffix"), Some(RuleType::DomainSuffix));
        assert_eq!(RuleType::parse("DOMAIN-KEYWORD"), Some(RuleType::DomainKeyword));
        assert_eq!(RuleType::parse("GEOIP"), None);
    }

    #[test]
    fn test_rule_type_display() {
        assert_eq!(RuleType::IpCidr.to_string(), "IP-CIDR");
        assert_eq!(RuleType::DomainSuffix.to_string(), "DOMAIN-SUFFIX");
    }
}
