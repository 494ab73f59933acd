//! Rule values and the pattern converters that produce them.

pub mod cidr;
pub mod domain;

pub use cidr::{is_ip_pattern, wildcard_to_cidr};
pub use domain::{classify, is_hostname, Classified};

use ipnet::Ipv4Net;
use std::fmt;

use crate::error::{LineError, ParseError, ValidationError};
use crate::{RuleType, Target};

/// A single compiled rule: kind, value and policy.
///
/// Rules are immutable once constructed. Values are validated on
/// construction through [`Rule::parse_classical`] or the converters in this
/// module, so they never contain the `,` separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    kind: RuleType,
    value: String,
    target: Target,
}

/// Uniqueness key of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    pub kind: RuleType,
    pub value: String,
    pub target: Target,
}

impl Rule {
    pub(crate) fn new(kind: RuleType, value: impl Into<String>, target: Target) -> Self {
        Self {
            kind,
            value: value.into(),
            target,
        }
    }

    /// Build a rule from a classifier result.
    pub fn from_classified(classified: Classified, target: Target) -> Self {
        Self::new(classified.kind, classified.value, target)
    }

    /// Parse a `KIND,value[,POLICY]` line and validate the value.
    ///
    /// The policy field, when present, is ignored in favour of `target`.
    pub fn parse_classical(line: &str, target: Target) -> Result<Self, LineError> {
        let mut parts = line.split(',').map(str::trim);
        let kind_str = parts.next().unwrap_or_default();
        let value = parts
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ParseError::Unrecognized(line.to_string()))?;

        let kind = RuleType::parse(kind_str)
            .ok_or_else(|| ValidationError::UnsupportedKind(kind_str.to_string()))?;

        let value = match kind {
            RuleType::IpCidr => {
                let net: Ipv4Net = value
                    .parse()
                    .map_err(|_| ParseError::InvalidCidr(value.to_string()))?;
                net.to_string()
            }
            RuleType::Domain | RuleType::DomainSuffix => {
                if !is_hostname(value) {
                    return Err(ValidationError::InvalidHostname(value.to_string()).into());
                }
                value.to_lowercase()
            }
            RuleType::DomainKeyword => {
                if !domain::is_keyword(value) {
                    return Err(ValidationError::InvalidKeyword(value.to_string()).into());
                }
                value.to_lowercase()
            }
        };

        Ok(Self::new(kind, value, target))
    }

    /// Get the kind of this rule.
    pub fn kind(&self) -> RuleType {
        self.kind
    }

    /// Get the rule value (CIDR, domain or keyword).
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get the policy of this rule.
    pub fn target(&self) -> Target {
        self.target
    }

    /// Get the deduplication key of this rule.
    pub fn signature(&self) -> Signature {
        Signature {
            kind: self.kind,
            value: self.value.clone(),
            target: self.target,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.kind, self.value, self.target)
    }
}
