//! Merge pipeline: fetch, parse, deduplicate, render, write.
//!
//! The run is strictly sequential. The whitelist source is mandatory: if it
//! cannot be fetched after retries, the run fails before anything is
//! written. The block list is optional: if it is unavailable the run goes on
//! with an empty REJECT tier.

use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::{MergeConfig, SourceConfig};
use crate::conf::ConfWriter;
use crate::converter::{Dialect, LineStats, ParsedSource};
use crate::remote::{fetch_with_retry, Fetch};
use crate::ruleset::RuleStore;
use crate::{Error, Result, Target};

/// Timestamp format used in the header description.
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome for one source.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub location: String,
    pub dialect: Dialect,
    /// Whether the source text was retrieved
    pub available: bool,
    pub stats: LineStats,
}

/// Per-tier counts of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub direct: usize,
    pub reject: usize,
    pub proxy: usize,
    pub total: usize,
    /// Comment lines carried over from the block list
    pub blocklist_comments: usize,
    pub whitelist: SourceReport,
    pub blocklist: Option<SourceReport>,
}

impl Summary {
    /// Render the summary as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Direct rules: {}", self.direct)?;
        writeln!(f, "Reject rules: {}", self.reject)?;
        writeln!(f, "Proxy rules: {}", self.proxy)?;
        writeln!(f, "Total rules: {} (+ FINAL,PROXY)", self.total)?;
        write_source(f, "Whitelist", &self.whitelist)?;
        match &self.blocklist {
            Some(report) => write_source(f, "Blocklist", report),
            None => write!(f, "Blocklist: disabled"),
        }
    }
}

fn write_source(f: &mut fmt::Formatter<'_>, name: &str, report: &SourceReport) -> fmt::Result {
    if !report.available {
        return writeln!(f, "{}: unavailable ({})", name, report.location);
    }
    writeln!(
        f,
        "{}: {} accepted, {} duplicates, {} skipped, {} ignored",
        name,
        report.stats.accepted,
        report.stats.duplicates,
        report.stats.skipped(),
        report.stats.ignored
    )
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// Rendered config text
    pub text: String,
    pub summary: Summary,
}

/// Run the pipeline and return the rendered config without writing it.
pub fn run<F: Fetch + ?Sized>(config: &MergeConfig, fetcher: &F) -> Result<MergeOutput> {
    let generated_at = config
        .header
        .stamp_time
        .then(|| chrono::Local::now().format(TIME_FORMAT).to_string());
    run_at(config, fetcher, generated_at)
}

/// Run the pipeline with an explicit generation time.
pub fn run_at<F: Fetch + ?Sized>(
    config: &MergeConfig,
    fetcher: &F,
    generated_at: Option<String>,
) -> Result<MergeOutput> {
    config.validate()?;

    log::info!("Fetching whitelist: {}", config.whitelist.url);
    let whitelist_text = fetch_with_retry(fetcher, &config.whitelist.url, &config.retry)?;

    let blocklist_text = config.blocklist.as_ref().map(|source| {
        log::info!("Fetching block list: {}", source.url);
        fetch_with_retry(fetcher, &source.url, &config.retry)
            .map_err(|e| {
                log::warn!(
                    "Block list unavailable, continuing without REJECT rules: {}",
                    e
                );
            })
            .ok()
    });

    let options = config.parse_options();
    let mut store = RuleStore::new(config.order);

    let whitelist_dialect = config.whitelist_dialect();
    let mut whitelist = whitelist_dialect.parse(&whitelist_text, &options);
    insert_source(&mut store, &mut whitelist);
    let whitelist_report = report(&config.whitelist, whitelist_dialect, true, whitelist.stats);

    let mut blocklist_comments = Vec::new();
    let blocklist_report = match (&config.blocklist, blocklist_text) {
        (Some(source), Some(Some(text))) => {
            let mut parsed = Dialect::Blocklist.parse(&text, &options);
            insert_source(&mut store, &mut parsed);
            blocklist_comments = parsed.header_comments;
            Some(report(source, Dialect::Blocklist, true, parsed.stats))
        }
        (Some(source), _) => Some(report(
            source,
            Dialect::Blocklist,
            false,
            LineStats::default(),
        )),
        (None, _) => None,
    };

    let fallback = config.fallback_rules()?;
    let proxy_added = store.extend(fallback);
    log::debug!("Added {} fallback proxy rules", proxy_added);

    let text = ConfWriter::new(&config.header)
        .generated_at(generated_at)
        .blocklist_comments(&blocklist_comments)
        .write(&store)?;

    let summary = Summary {
        direct: store.tier_len(Target::Direct),
        reject: store.tier_len(Target::Reject),
        proxy: store.tier_len(Target::Proxy),
        total: store.len(),
        blocklist_comments: blocklist_comments.len(),
        whitelist: whitelist_report,
        blocklist: blocklist_report,
    };

    log::info!(
        "Merged {} rules: {} direct, {} reject, {} proxy",
        summary.total,
        summary.direct,
        summary.reject,
        summary.proxy
    );

    Ok(MergeOutput { text, summary })
}

/// Run the pipeline and atomically write the result to `config.output`.
///
/// Nothing is written when the run fails.
pub fn run_to_file<F: Fetch + ?Sized>(config: &MergeConfig, fetcher: &F) -> Result<MergeOutput> {
    let output = run(config, fetcher)?;
    write_atomic(&config.output, &output.text)?;
    log::info!("Wrote {:?} ({} bytes)", config.output, output.text.len());
    Ok(output)
}

/// Write `text` to `path` through a temporary file in the same directory,
/// so readers see either the old file or the complete new one.
pub fn write_atomic(path: &Path, text: &str) -> Result<()> {
    let to_error =
        |e: std::io::Error| Error::Serialization(format!("cannot write {:?}: {}", path, e));

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(to_error)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(to_error)?;
    temp.write_all(text.as_bytes()).map_err(to_error)?;
    temp.as_file().sync_all().map_err(to_error)?;
    temp.persist(path).map_err(|e| to_error(e.error))?;

    Ok(())
}

fn insert_source(store: &mut RuleStore, parsed: &mut ParsedSource) {
    for rule in parsed.rules.drain(..) {
        if !store.insert(rule) {
            parsed.stats.duplicates += 1;
        }
    }
}

fn report(
    source: &SourceConfig,
    dialect: Dialect,
    available: bool,
    stats: LineStats,
) -> SourceReport {
    SourceReport {
        location: source.url.clone(),
        dialect,
        available,
        stats,
    }
}
