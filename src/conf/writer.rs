//! Shadowrocket config writer.

use std::fmt::Write;

use crate::ruleset::RuleStore;
use crate::{Error, Result, Rule, Target};

use super::header::HeaderConfig;

/// Terminal catch-all line.
pub const FINAL_RULE: &str = "FINAL,PROXY";

/// Renders a [`RuleStore`] into the textual config format.
///
/// Output layout:
/// - `#!name=` / `#!desc=` metadata
/// - `[General]` and `[Host]` sections
/// - `[Rule]` with the DIRECT, REJECT and PROXY tiers, each under a banner
/// - `FINAL,PROXY` as the last line
pub struct ConfWriter<'a> {
    header: &'a HeaderConfig,
    generated_at: Option<String>,
    blocklist_comments: &'a [String],
    buffer: String,
}

impl<'a> ConfWriter<'a> {
    /// Create a new writer.
    pub fn new(header: &'a HeaderConfig) -> Self {
        Self {
            header,
            generated_at: None,
            blocklist_comments: &[],
            buffer: String::with_capacity(64 * 1024),
        }
    }

    /// Set the generation time stamped into the description.
    pub fn generated_at(mut self, time: Option<String>) -> Self {
        self.generated_at = time;
        self
    }

    /// Set the comment block reproduced before the REJECT tier.
    pub fn blocklist_comments(mut self, comments: &'a [String]) -> Self {
        self.blocklist_comments = comments;
        self
    }

    /// Render the full config text.
    pub fn write(mut self, store: &RuleStore) -> Result<String> {
        self.write_header()?;

        writeln!(self.buffer, "[Rule]").map_err(fmt_error)?;

        self.write_tier(store, Target::Direct, "Direct whitelist", &[])?;
        let comments = if self.header.preserve_blocklist_comments {
            self.blocklist_comments
        } else {
            &[]
        };
        self.write_tier(store, Target::Reject, "Ad blocking", comments)?;
        self.write_tier(store, Target::Proxy, "Proxy", &[])?;

        writeln!(self.buffer, "{}", FINAL_RULE).map_err(fmt_error)?;

        Ok(self.buffer)
    }

    fn write_header(&mut self) -> Result<()> {
        let header = self.header;
        check_header_value(&header.name)?;
        writeln!(self.buffer, "#!name={}", header.name).map_err(fmt_error)?;

        if let Some(desc) = header.render_description(self.generated_at.as_deref()) {
            check_header_value(&desc)?;
            writeln!(self.buffer, "#!desc={}", desc).map_err(fmt_error)?;
        }
        writeln!(self.buffer).map_err(fmt_error)?;

        self.write_section("General", &header.general)?;
        self.write_section("Host", &header.hosts)?;
        Ok(())
    }

    fn write_section(&mut self, name: &str, entries: &[(String, String)]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        writeln!(self.buffer, "[{}]", name).map_err(fmt_error)?;
        for (key, value) in entries {
            check_header_value(key)?;
            check_header_value(value)?;
            writeln!(self.buffer, "{} = {}", key, value).map_err(fmt_error)?;
        }
        writeln!(self.buffer).map_err(fmt_error)?;
        Ok(())
    }

    fn write_tier(
        &mut self,
        store: &RuleStore,
        target: Target,
        title: &str,
        comments: &[String],
    ) -> Result<()> {
        let rules = store.tier(target);
        if rules.is_empty() {
            return Ok(());
        }

        for comment in comments {
            check_header_value(comment)?;
            writeln!(self.buffer, "{}", comment).map_err(fmt_error)?;
        }
        writeln!(self.buffer, "# ================= {} =================", title)
            .map_err(fmt_error)?;

        for rule in rules {
            check_rule(rule)?;
            writeln!(self.buffer, "{}", rule).map_err(fmt_error)?;
        }
        writeln!(self.buffer).map_err(fmt_error)?;
        Ok(())
    }
}

/// Every rule value has passed grammar validation; this guards the line
/// syntax against rules built by other means.
fn check_rule(rule: &Rule) -> Result<()> {
    let value = rule.value();
    if value.is_empty() || value.contains(|c: char| c == ',' || c.is_whitespace()) {
        return Err(Error::Serialization(format!(
            "rule value cannot be written: {:?}",
            value
        )));
    }
    Ok(())
}

fn check_header_value(value: &str) -> Result<()> {
    if value.contains(['\n', '\r']) {
        return Err(Error::Serialization(format!(
            "header value spans multiple lines: {:?}",
            value
        )));
    }
    Ok(())
}

fn fmt_error(e: std::fmt::Error) -> Error {
    Error::Serialization(e.to_string())
}
