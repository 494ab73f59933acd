//! Rule store ordering configuration.

use serde::{Deserialize, Serialize};

/// Order of rules inside a policy tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOrder {
    /// First-seen order across sources
    #[default]
    Insertion,
    /// Lexicographic by `(kind, value)`
    Sorted,
}

impl RuleOrder {
    /// Get the internal name of this ordering.
    pub fn name(&self) -> &'static str {
        match self {
            RuleOrder::Insertion => "insertion",
            RuleOrder::Sorted => "sorted",
        }
    }
}
