//! Header block of the generated config.

use serde::{Deserialize, Serialize};

/// Placeholder replaced with the generation time in the description.
pub const TIME_PLACEHOLDER: &str = "{time}";

/// Header metadata and the fixed `[General]` / `[Host]` sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Value of `#!name=`
    pub name: String,
    /// Value of `#!desc=`; `{time}` is replaced by the generation time
    pub description: String,
    /// Stamp the generation time into the description
    pub stamp_time: bool,
    /// `[General]` entries, in output order
    pub general: Vec<(String, String)>,
    /// `[Host]` entries, in output order
    pub hosts: Vec<(String, String)>,
    /// Reproduce the block list's leading comments before the REJECT tier
    pub preserve_blocklist_comments: bool,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            name: "Shadowrocket-Merged".to_string(),
            description: format!("Last Updated: {}", TIME_PLACEHOLDER),
            stamp_time: true,
            general: default_general(),
            hosts: vec![pair("localhost", "127.0.0.1")],
            preserve_blocklist_comments: true,
        }
    }
}

impl HeaderConfig {
    /// Render the description for a generation time.
    ///
    /// Returns `None` when the template needs a time and none is given, so
    /// unstamped output stays byte-identical across runs.
    pub fn render_description(&self, generated_at: Option<&str>) -> Option<String> {
        match generated_at {
            Some(time) => Some(self.description.replace(TIME_PLACEHOLDER, time)),
            None if self.description.contains(TIME_PLACEHOLDER) => None,
            None => Some(self.description.clone()),
        }
    }
}

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn default_general() -> Vec<(String, String)> {
    vec![
        pair("ipv6", "false"),
        pair(
            "dns-server",
            "https://doh.pub/dns-query, https://dns.alidns.com/dns-query",
        ),
        pair("bypass-system", "true"),
        pair(
            "skip-proxy",
            "192.168.0.0/16, 10.0.0.0/8, 172.16.0.0/12, localhost, *.local, e.crashlytics.com, captive.apple.com",
        ),
        pair(
            "bypass-tun",
            "10.0.0.0/8,100.64.0.0/10,127.0.0.0/8,169.254.0.0/16,172.16.0.0/12,192.0.0.0/24,192.0.2.0/24,192.88.99.0/24,192.168.0.0/16,198.18.0.0/15,198.51.100.0/24,203.0.113.0/24,224.0.0.0/4,255.255.255.255/32",
        ),
        pair("exclude-simple-hostnames", "true"),
        pair("prefer-ipv6", "false"),
        pair("allow-wifi-access", "false"),
        pair("proxy-test-url", "http://cp.cloudflare.com/generate_204"),
        pair("test-timeout", "3"),
        pair("interface-mode", "auto"),
    ]
}
