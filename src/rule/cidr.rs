//! Wildcard IPv4 pattern to CIDR conversion.

use ipnet::Ipv4Net;
use std::net::Ipv4Addr;

use crate::error::ParseError;

/// Wildcard symbol used in dotted IP patterns.
pub const WILDCARD: &str = "*";

/// Check whether a line should be treated as an IPv4 pattern.
///
/// IP patterns consist only of digits, wildcards, dots and an optional
/// `/prefix`. Anything else goes to the domain classifier.
pub fn is_ip_pattern(line: &str) -> bool {
    !line.is_empty()
        && line.contains('.')
        && line
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '*' | '.' | '/'))
}

/// Convert a dotted wildcard IPv4 pattern into a network-aligned CIDR.
///
/// The prefix length is `8 × index of the first wildcard component`, or 32
/// when there is none. Patterns already in `address/prefix` form are
/// validated and returned unchanged.
///
/// # Examples
/// ```
/// use k2merge::rule::wildcard_to_cidr;
///
/// assert_eq!(wildcard_to_cidr("192.168.*.*").unwrap(), "192.168.0.0/16");
/// assert_eq!(wildcard_to_cidr("10.*.*.*").unwrap(), "10.0.0.0/8");
/// assert!(wildcard_to_cidr("10.*.1.*").is_err());
/// ```
pub fn wildcard_to_cidr(pattern: &str) -> Result<String, ParseError> {
    let pattern = pattern.trim();

    if pattern.contains('/') {
        pattern
            .parse::<Ipv4Net>()
            .map_err(|_| ParseError::InvalidCidr(pattern.to_string()))?;
        return Ok(pattern.to_string());
    }

    let parts: Vec<&str> = pattern.split('.').collect();
    if parts.len() != 4 {
        return Err(ParseError::ComponentCount(pattern.to_string()));
    }

    let mut octets = [0u8; 4];
    let mut prefix_len: Option<u8> = None;

    for (i, part) in parts.iter().enumerate() {
        if *part == WILDCARD {
            prefix_len.get_or_insert((i * 8) as u8);
            continue;
        }
        if prefix_len.is_some() {
            return Err(ParseError::NonContiguousWildcard(pattern.to_string()));
        }
        octets[i] = parse_octet(part, pattern)?;
    }

    let net = Ipv4Net::new(Ipv4Addr::from(octets), prefix_len.unwrap_or(32))
        .map_err(|_| ParseError::InvalidCidr(pattern.to_string()))?
        .trunc();

    Ok(net.to_string())
}

fn parse_octet(part: &str, pattern: &str) -> Result<u8, ParseError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::Unrecognized(pattern.to_string()));
    }
    part.parse::<u8>()
        .map_err(|_| ParseError::OctetOutOfRange(pattern.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_to_cidr() {
        assert_eq!(wildcard_to_cidr("192.168.*.*").unwrap(), "192.168.0.0/16");
        assert_eq!(wildcard_to_cidr("10.*.*.*").unwrap(), "10.0.0.0/8");
        assert_eq!(wildcard_to_cidr("172.16.5.*").unwrap(), "172.16.5.0/24");
        assert_eq!(wildcard_to_cidr("*.*.*.*").unwrap(), "0.0.0.0/0");
        assert_eq!(wildcard_to_cidr("8.8.8.8").unwrap(), "8.8.8.8/32");
    }

    #[test]
    fn test_prefix_is_eight_times_first_wildcard() {
        let patterns = [
            ("*.*.*.*", 0),
            ("1.*.*.*", 1),
            ("1.2.*.*", 2),
            ("1.2.3.*", 3),
        ];
        for (pattern, index) in patterns {
            let cidr = wildcard_to_cidr(pattern).unwrap();
            let net: Ipv4Net = cidr.parse().unwrap();
            assert_eq!(net.prefix_len() as usize, 8 * index, "{}", pattern);
            assert_eq!(net, net.trunc(), "{} is not network aligned", pattern);
        }
    }

    #[test]
    fn test_cidr_passthrough() {
        assert_eq!(wildcard_to_cidr("10.0.0.0/8").unwrap(), "10.0.0.0/8");
        assert_eq!(wildcard_to_cidr("100.64.0.0/10").unwrap(), "100.64.0.0/10");
        assert!(matches!(
            wildcard_to_cidr("10.0.0.0/40"),
            Err(ParseError::InvalidCidr(_))
        ));
        assert!(matches!(
            wildcard_to_cidr("10.*.0.0/8"),
            Err(ParseError::InvalidCidr(_))
        ));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            wildcard_to_cidr("10.*.*"),
            Err(ParseError::ComponentCount(_))
        ));
        assert!(matches!(
            wildcard_to_cidr("1.2.3.4.5"),
            Err(ParseError::ComponentCount(_))
        ));
        assert!(matches!(
            wildcard_to_cidr("10.*.1.*"),
            Err(ParseError::NonContiguousWildcard(_))
        ));
        assert!(matches!(
            wildcard_to_cidr("256.1.*.*"),
            Err(ParseError::OctetOutOfRange(_))
        ));
        assert!(matches!(
            wildcard_to_cidr("1..2.3"),
            Err(ParseError::Unrecognized(_))
        ));
    }

    #[test]
    fn test_is_ip_pattern() {
        assert!(is_ip_pattern("10.*.*.*"));
        assert!(is_ip_pattern("192.168.0.0/16"));
        assert!(is_ip_pattern("*.*.*.*"));
        assert!(is_ip_pattern("1.2.3"));
        assert!(!is_ip_pattern("*.example.com"));
        assert!(!is_ip_pattern("123"));
        assert!(!is_ip_pattern(""));
    }
}
