//! Policy targets for rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target represents the policy applied when a rule matches.
///
/// The declaration order is the tier precedence in the output: every
/// `Direct` rule is emitted before every `Reject` rule, which precede the
/// fallback `Proxy` rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Target {
    /// Route directly without proxy
    Direct = 0,
    /// Reject the connection
    Reject = 1,
    /// Route through proxy
    #[default]
    Proxy = 2,
}

impl Target {
    /// All targets in tier order.
    pub const TIERS: [Target; 3] = [Target::Direct, Target::Reject, Target::Proxy];

    /// Position of this target's tier in the output.
    pub fn tier_index(self) -> usize {
        self as usize
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Direct => "DIRECT",
            Target::Reject => "REJECT",
            Target::Proxy => "PROXY",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order() {
        assert!(Target::Direct < Target::Reject);
        assert!(Target::Reject < Target::Proxy);
        assert_eq!(Target::TIERS.map(Target::tier_index), [0, 1, 2]);
    }

    #[test]
    fn test_target_display() {
        assert_eq!(Target::Direct.to_string(), "DIRECT");
        assert_eq!(Target::Proxy.to_string(), "PROXY");
        assert_eq!(Target::Reject.to_string(), "REJECT");
    }
}
