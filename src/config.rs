//! Merge configuration.
//!
//! All run parameters live in one [`MergeConfig`] value that is passed to
//! the pipeline. It can be loaded from YAML; every field has a default
//! matching the historical upstream sources.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::conf::HeaderConfig;
use crate::converter::{Dialect, ExactDomainMode, ParseOptions};
use crate::remote::{RetryPolicy, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::rule::Rule;
use crate::ruleset::RuleOrder;
use crate::{Error, Result, Target};

/// Default whitelist source (SwitchyOmega sorted whitelist).
pub const DEFAULT_WHITELIST_URL: &str =
    "https://raw.githubusercontent.com/entr0pia/SwitchyOmega-Whitelist/master/white-list.sorl";

/// Default block list source (Clash-formatted ad block list).
pub const DEFAULT_BLOCKLIST_URL: &str =
    "https://raw.githubusercontent.com/217heidai/adblockfilters/main/rules/adblockclash.list";

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "shadowrocket.conf";

/// A single upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL, `file://` URL or local path
    pub url: String,
    /// Format of the source text; unset means the default for the source's role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
}

impl SourceConfig {
    pub fn new(url: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            url: url.into(),
            dialect: Some(dialect),
        }
    }

    /// Dialect of this source, or `default` when none is configured.
    pub fn dialect_or(&self, default: Dialect) -> Dialect {
        self.dialect.unwrap_or(default)
    }
}

/// Configuration for a merge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Mandatory source; failure to fetch it aborts the run
    pub whitelist: SourceConfig,
    /// Optional source; failure to fetch it leaves the REJECT tier empty
    pub blocklist: Option<SourceConfig>,
    /// Output file path
    pub output: PathBuf,
    /// Order of rules within a tier
    pub order: RuleOrder,
    /// Rule kind for plain domain lines
    pub exact_domain: ExactDomainMode,
    /// Extra `KIND,value` rules placed in the PROXY tier
    pub proxy_rules: Vec<String>,
    pub retry: RetryPolicy,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
    pub header: HeaderConfig,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            whitelist: SourceConfig::new(DEFAULT_WHITELIST_URL, Dialect::Whitelist),
            blocklist: Some(SourceConfig::new(DEFAULT_BLOCKLIST_URL, Dialect::Blocklist)),
            output: PathBuf::from(DEFAULT_OUTPUT),
            order: RuleOrder::default(),
            exact_domain: ExactDomainMode::default(),
            proxy_rules: Vec::new(),
            retry: RetryPolicy::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            header: HeaderConfig::default(),
        }
    }
}

impl MergeConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that cannot be expressed in the types.
    pub fn validate(&self) -> Result<()> {
        if self.whitelist.url.trim().is_empty() {
            return Err(Error::Config("whitelist url is empty".to_string()));
        }
        if self.whitelist_dialect() == Dialect::Blocklist {
            return Err(Error::Config(
                "whitelist source cannot use the blocklist dialect".to_string(),
            ));
        }
        if let Some(blocklist) = &self.blocklist {
            if blocklist.url.trim().is_empty() {
                return Err(Error::Config("blocklist url is empty".to_string()));
            }
            let dialect = blocklist.dialect_or(Dialect::Blocklist);
            if dialect != Dialect::Blocklist {
                return Err(Error::Config(format!(
                    "blocklist source must use the blocklist dialect, got {}",
                    dialect
                )));
            }
        }
        self.fallback_rules()?;
        Ok(())
    }

    /// Parse `proxy_rules` into PROXY-tier rules.
    pub fn fallback_rules(&self) -> Result<Vec<Rule>> {
        self.proxy_rules
            .iter()
            .map(|line| {
                Rule::parse_classical(line, Target::Proxy)
                    .map_err(|e| Error::Config(format!("proxy rule {:?}: {}", line, e)))
            })
            .collect()
    }

    /// Dialect of the whitelist source.
    pub fn whitelist_dialect(&self) -> Dialect {
        self.whitelist.dialect_or(Dialect::Whitelist)
    }

    /// Options for the pattern classifiers.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            exact_domain: self.exact_domain,
        }
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
