//! PAC pattern extraction.
//!
//! PAC files are never executed. Host patterns are pulled out of the script
//! text: `isInNet(host, "addr", "mask")` calls become CIDR blocks and quoted
//! string literals that look like hosts or IP patterns are fed to the shared
//! pattern classifier.

use ipnet::Ipv4Net;
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::Ipv4Addr;

use crate::error::{LineError, ParseError};
use crate::rule::Rule;
use crate::RuleType;

use super::filter::filter_lines;
use super::text::classify_pattern;
use super::{Dialect, ParseOptions, ParsedSource};

static IS_IN_NET: Lazy<Regex> = Lazy::new(|| {
    // The host argument may be one nested call, as in isInNet(dnsResolve(host), ..)
    Regex::new(
        r#"isInNet\s*\(\s*(?:[^,()]|\([^()]*\))+,\s*["']([0-9.]+)["']\s*,\s*["']([0-9.]+)["']\s*\)"#,
    )
    .unwrap()
});

static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"\s]*)"|'([^'\s]*)'"#).unwrap());

/// Characters a literal may contain to be considered a pattern.
static PATTERN_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9.*/-]+$").unwrap());

/// PAC script pattern extractor.
pub struct PacParser;

impl PacParser {
    /// Extract DIRECT rules from PAC script text.
    pub fn parse(text: &str, options: &ParseOptions) -> ParsedSource {
        let mut parsed = ParsedSource::default();
        let target = Dialect::Pac.policy();

        for line in filter_lines(text) {
            for caps in IS_IN_NET.captures_iter(line) {
                parsed.stats.lines += 1;
                match netmask_to_cidr(&caps[1], &caps[2]) {
                    Ok(cidr) => {
                        parsed.rules.push(Rule::new(RuleType::IpCidr, cidr, target));
                        parsed.stats.accepted += 1;
                    }
                    Err(e) => parsed.stats.record_error("pac", &caps[0], &LineError::from(e)),
                }
            }

            let rest = IS_IN_NET.replace_all(line, "");
            for literal in extract_literals(&rest) {
                if !literal.contains('.') || !PATTERN_CHARS.is_match(literal) {
                    parsed.stats.ignored += 1;
                    continue;
                }

                parsed.stats.lines += 1;
                // dnsDomainIs(host, ".example.com") style suffixes
                let pattern = match literal.strip_prefix('.') {
                    Some(host) => format!("*.{}", host),
                    None => literal.to_string(),
                };

                match classify_pattern(&pattern, options) {
                    Ok(classified) => {
                        parsed.rules.push(Rule::from_classified(classified, target));
                        parsed.stats.accepted += 1;
                    }
                    Err(e) => parsed.stats.record_error("pac", literal, &e),
                }
            }
        }

        parsed
    }
}

fn extract_literals(line: &str) -> impl Iterator<Item = &str> {
    STRING_LITERAL.captures_iter(line).filter_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
    })
}

/// Convert an address and dotted netmask into a network-aligned CIDR.
fn netmask_to_cidr(addr: &str, mask: &str) -> Result<String, ParseError> {
    let invalid = || ParseError::InvalidCidr(format!("{}/{}", addr, mask));

    let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
    let mask: Ipv4Addr = mask.parse().map_err(|_| invalid())?;
    let net = Ipv4Net::with_netmask(addr, mask).map_err(|_| invalid())?;

    Ok(net.trunc().to_string())
}
