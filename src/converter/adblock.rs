//! Curated block list importer.
//!
//! Block lists arrive already shaped as `DOMAIN-SUFFIX,<domain>` lines,
//! preceded by a block of `#` comment lines. Only the domain is kept and
//! re-validated; every accepted rule gets the REJECT policy.

use crate::error::{LineError, ValidationError};
use crate::rule::{is_hostname, Rule};
use crate::RuleType;

use super::filter::is_comment;
use super::{Dialect, ParsedSource};

const RULE_PREFIX: &str = "DOMAIN-SUFFIX,";

/// Import a single block list line.
///
/// Returns `None` for lines that are not `DOMAIN-SUFFIX` rules; those are
/// metadata and not an error.
pub fn import_line(line: &str) -> Option<Result<Rule, LineError>> {
    let rest = line.trim().strip_prefix(RULE_PREFIX)?;

    let field = rest.split(',').next().unwrap_or_default();
    let domain = field.split('#').next().unwrap_or_default().trim();

    if !is_hostname(domain) {
        return Some(Err(ValidationError::InvalidHostname(domain.to_string()).into()));
    }

    Some(Ok(Rule::new(
        RuleType::DomainSuffix,
        domain.to_lowercase(),
        Dialect::Blocklist.policy(),
    )))
}

/// Block list parser.
pub struct BlocklistParser;

impl BlocklistParser {
    /// Parse block list text into REJECT rules, keeping its leading comment
    /// block.
    pub fn parse(text: &str) -> ParsedSource {
        let mut parsed = ParsedSource::default();
        let mut in_header = true;

        for line in text.lines().map(str::trim) {
            if in_header {
                if line.starts_with('#') {
                    parsed.header_comments.push(line.to_string());
                    continue;
                }
                if line.is_empty() {
                    continue;
                }
                in_header = false;
            }

            if line.is_empty() || is_comment(line) {
                continue;
            }

            parsed.stats.lines += 1;
            match import_line(line) {
                Some(Ok(rule)) => {
                    parsed.rules.push(rule);
                    parsed.stats.accepted += 1;
                }
                Some(Err(e)) => parsed.stats.record_error("blocklist", line, &e),
                None => {
                    log::debug!("Ignoring block list line {:?}", line);
                    parsed.stats.ignored += 1;
                }
            }
        }

        parsed
    }
}
