//! K2Merge - merge proxy whitelists and ad block lists into one Shadowrocket config.
//!
//! This crate turns heterogeneous upstream rule sources into a single,
//! deduplicated, policy-ordered rule file.
//!
//! # Features
//!
//! - **Wildcard IP conversion**: `10.*.*.*` becomes `IP-CIDR,10.0.0.0/8`
//! - **Domain classification**: exact, suffix (`*.example.com`) and keyword patterns
//! - **Block list import**: Clash-style `DOMAIN-SUFFIX` lists become REJECT rules
//! - **PAC extraction**: domains and `isInNet` ranges pulled out of PAC scripts
//! - **Deduplication**: a rule appears once per `(kind, value, policy)`
//! - **Tiered output**: DIRECT, then REJECT, then PROXY, then `FINAL,PROXY`
//!
//! # Quick Start
//!
//! ```no_run
//! use k2merge::{pipeline, HttpFetcher, MergeConfig};
//!
//! let config = MergeConfig::default();
//! let fetcher = HttpFetcher::with_options(config.timeout(), &config.user_agent)?;
//! let output = pipeline::run_to_file(&config, &fetcher)?;
//! println!("{}", output.summary);
//! # Ok::<(), k2merge::Error>(())
//! ```
//!
//! # Building rules by hand
//!
//! ```
//! use k2merge::converter::{Dialect, ParseOptions};
//! use k2merge::{ConfWriter, HeaderConfig, RuleStore};
//!
//! let parsed = Dialect::Whitelist.parse("10.*.*.*\n*.bank.com\n", &ParseOptions::default());
//!
//! let mut store = RuleStore::default();
//! store.extend(parsed.rules);
//!
//! let header = HeaderConfig::default();
//! let text = ConfWriter::new(&header).write(&store)?;
//! assert!(text.contains("IP-CIDR,10.0.0.0/8,DIRECT\n"));
//! assert!(text.ends_with("FINAL,PROXY\n"));
//! # Ok::<(), k2merge::Error>(())
//! ```
//!
//! # Rule Types
//!
//! - **IP-CIDR**: IPv4 network in CIDR notation
//! - **DOMAIN**: exact host name
//! - **DOMAIN-SUFFIX**: a domain and all its subdomains
//! - **DOMAIN-KEYWORD**: any host containing the keyword
//!
//! # Error Handling
//!
//! Per-line problems ([`ParseError`], [`ValidationError`]) are counted and
//! logged, never fatal. Run-level problems ([`Error`]) abort the run before
//! any output file is touched.

mod error;
mod rule_type;
mod target;

pub mod conf;
pub mod config;
pub mod converter;
pub mod pipeline;
pub mod remote;
pub mod rule;
pub mod ruleset;

// Re-export core types
pub use error::{Error, LineError, ParseError, Result, ValidationError};
pub use rule_type::RuleType;
pub use target::Target;

// Re-export rule and store types
pub use rule::{Rule, Signature};
pub use ruleset::{RuleOrder, RuleStore};

// Re-export configuration
pub use conf::{ConfWriter, HeaderConfig};
pub use config::{MergeConfig, SourceConfig};
pub use converter::{Dialect, ExactDomainMode, LineStats, ParseOptions};

// Re-export fetching and pipeline entry points
pub use pipeline::{run, MergeOutput, Summary};
pub use remote::{fetch_with_retry, Fetch, HttpFetcher, RetryPolicy};
