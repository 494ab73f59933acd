//! Source dialect parsers.
//!
//! Every upstream format is a [`Dialect`]. Dispatch happens in one place,
//! [`Dialect::parse`], and all pattern-carrying dialects share the same
//! IP/domain classifier.

mod adblock;
mod filter;
mod pac;
mod text;

pub use adblock::{import_line, BlocklistParser};
pub use filter::{filter_lines, is_comment};
pub use pac::PacParser;
pub use text::{classify_pattern, WhitelistParser};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LineError;
use crate::rule::Rule;
use crate::Target;

/// Upstream source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Sorted whitelist text: wildcard IPs and domain patterns
    #[default]
    Whitelist,
    /// Proxy auto-config script, patterns extracted textually
    Pac,
    /// Pre-formatted `DOMAIN-SUFFIX` block list
    Blocklist,
}

impl Dialect {
    /// Policy assigned to every rule produced from this dialect.
    pub fn policy(self) -> Target {
        match self {
            Dialect::Whitelist | Dialect::Pac => Target::Direct,
            Dialect::Blocklist => Target::Reject,
        }
    }

    /// Parse source text in this dialect.
    pub fn parse(self, text: &str, options: &ParseOptions) -> ParsedSource {
        match self {
            Dialect::Whitelist => WhitelistParser::parse(text, options),
            Dialect::Pac => PacParser::parse(text, options),
            Dialect::Blocklist => BlocklistParser::parse(text),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Whitelist => "whitelist",
            Dialect::Pac => "pac",
            Dialect::Blocklist => "blocklist",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whitelist" | "sorl" | "text" => Ok(Dialect::Whitelist),
            "pac" => Ok(Dialect::Pac),
            "blocklist" | "adblock" => Ok(Dialect::Blocklist),
            other => Err(format!("unknown source dialect: {}", other)),
        }
    }
}

/// Rule kind emitted for plain (non-wildcard) domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExactDomainMode {
    /// Exact `DOMAIN` rule
    #[default]
    Domain,
    /// Broader `DOMAIN-SUFFIX` rule
    DomainSuffix,
}

/// Options shared by the pattern classifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub exact_domain: ExactDomainMode,
}

/// Per-source line accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineStats {
    /// Data lines (or extracted patterns) examined
    pub lines: usize,
    /// Lines that produced a rule
    pub accepted: usize,
    /// Accepted rules already present in the store
    pub duplicates: usize,
    /// Lines skipped for a malformed shape
    pub parse_errors: usize,
    /// Lines skipped for failing grammar validation
    pub validation_errors: usize,
    /// Lines that are not rules at all
    pub ignored: usize,
}

impl LineStats {
    /// Total number of skipped lines.
    pub fn skipped(&self) -> usize {
        self.parse_errors + self.validation_errors
    }

    /// Count a skipped line and surface a warning.
    pub(crate) fn record_error(&mut self, source: &str, line: &str, err: &LineError) {
        match err {
            LineError::Parse(_) => self.parse_errors += 1,
            LineError::Validation(_) => self.validation_errors += 1,
        }
        log::warn!("Skipping {} line {:?}: {}", source, line, err);
    }
}

/// Output of parsing one source.
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    /// Rules in source order
    pub rules: Vec<Rule>,
    /// Leading comment block (block lists only)
    pub header_comments: Vec<String>,
    pub stats: LineStats,
}
