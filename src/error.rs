//! Error types for k2merge.

use thiserror::Error;

/// Error type for run-level k2merge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A source could not be retrieved
    #[error("failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },

    /// The compiled config could not be produced or persisted
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Download error
    #[error("download error: {0}")]
    Download(#[from] reqwest::Error),
}

impl Error {
    /// Build a fetch error for a location.
    pub fn fetch(location: &str, reason: impl ToString) -> Self {
        Error::Fetch {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for k2merge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A line that does not have the expected low-level shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Dotted IP pattern without exactly four components
    #[error("expected 4 dot-separated components: {0}")]
    ComponentCount(String),

    /// A numeric component follows a wildcard
    #[error("wildcards must form a contiguous suffix: {0}")]
    NonContiguousWildcard(String),

    /// Component is not a number in 0..=255
    #[error("octet out of range: {0}")]
    OctetOutOfRange(String),

    /// Malformed `address/prefix` notation
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),

    /// Nothing is left once wildcards are removed
    #[error("pattern is empty without wildcards: {0}")]
    EmptyPattern(String),

    /// Line matches none of the known shapes
    #[error("unrecognized pattern: {0}")]
    Unrecognized(String),
}

/// A candidate that has the right shape but fails grammar validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Not a valid hostname
    #[error("invalid hostname: {0}")]
    InvalidHostname(String),

    /// Keyword contains characters outside the hostname alphabet
    #[error("invalid keyword: {0}")]
    InvalidKeyword(String),

    /// Rule kind not supported in the output grammar
    #[error("unsupported rule kind: {0}")]
    UnsupportedKind(String),
}

/// Line-level error. Always non-fatal: the line is skipped and counted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = Error::fetch("https://example.com/list", "HTTP 404");
        assert_eq!(
            err.to_string(),
            "failed to fetch https://example.com/list: HTTP 404"
        );
    }

    #[test]
    fn test_line_error_is_transparent() {
        let err: LineError = ParseError::ComponentCount("1.2.3".to_string()).into();
        assert_eq!(err.to_string(), "expected 4 dot-separated components: 1.2.3");

        let err: LineError = ValidationError::InvalidHostname("bad_host".to_string()).into();
        assert!(matches!(err, LineError::Validation(_)));
    }
}
