//! Deduplicating, tier-ordered rule storage.

mod config;

pub use config::RuleOrder;

use ahash::AHashSet;

use crate::rule::{Rule, Signature};
use crate::Target;

/// RuleStore holds unique rules grouped by policy tier.
///
/// Rules are yielded in tier precedence:
/// 1. DIRECT
/// 2. REJECT
/// 3. fallback PROXY
///
/// The terminal catch-all is not stored; the serializer always emits it last.
/// Within a tier the order is given by [`RuleOrder`], so identical input
/// always produces an identical sequence.
///
/// # Examples
/// ```
/// use k2merge::ruleset::{RuleOrder, RuleStore};
/// use k2merge::rule::Rule;
/// use k2merge::Target;
///
/// let mut store = RuleStore::new(RuleOrder::Insertion);
/// let rule = Rule::parse_classical("DOMAIN-SUFFIX,bank.com", Target::Direct).unwrap();
/// assert!(store.insert(rule.clone()));
/// assert!(!store.insert(rule));
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RuleStore {
    order: RuleOrder,
    /// Signatures of every stored rule
    seen: AHashSet<Signature>,
    /// One vector per tier, indexed by `Target::tier_index`
    tiers: [Vec<Rule>; 3],
}

impl RuleStore {
    /// Create an empty store with the given in-tier ordering.
    pub fn new(order: RuleOrder) -> Self {
        Self {
            order,
            seen: AHashSet::new(),
            tiers: [Vec::new(), Vec::new(), Vec::new()],
        }
    }

    /// Insert a rule.
    ///
    /// Returns `true` if its signature was new, `false` for a duplicate
    /// (the store is left unchanged).
    pub fn insert(&mut self, rule: Rule) -> bool {
        if !self.seen.insert(rule.signature()) {
            log::debug!("Duplicate rule {}", rule);
            return false;
        }

        let tier = &mut self.tiers[rule.target().tier_index()];
        match self.order {
            RuleOrder::Insertion => tier.push(rule),
            RuleOrder::Sorted => {
                let pos = tier
                    .binary_search_by(|probe| sort_key(probe).cmp(&sort_key(&rule)))
                    .unwrap_or_else(|e| e);
                tier.insert(pos, rule);
            }
        }
        true
    }

    /// Insert every rule from an iterator, returning how many were new.
    pub fn extend<I: IntoIterator<Item = Rule>>(&mut self, rules: I) -> usize {
        let mut added = 0;
        for rule in rules {
            if self.insert(rule) {
                added += 1;
            }
        }
        added
    }

    /// Check whether a rule with the same signature is present.
    pub fn contains(&self, rule: &Rule) -> bool {
        self.seen.contains(&rule.signature())
    }

    /// Rules of a single tier, in output order.
    pub fn tier(&self, target: Target) -> &[Rule] {
        &self.tiers[target.tier_index()]
    }

    /// Number of rules in a tier.
    pub fn tier_len(&self, target: Target) -> usize {
        self.tier(target).len()
    }

    /// Iterate over all rules, tier by tier.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        Target::TIERS.into_iter().flat_map(move |t| self.tier(t).iter())
    }

    /// Total number of stored rules.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Get the in-tier ordering.
    pub fn order(&self) -> RuleOrder {
        self.order
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new(RuleOrder::default())
    }
}

fn sort_key(rule: &Rule) -> (&'static str, &str) {
    (rule.kind().as_str(), rule.value())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(line: &str, target: Target) -> Rule {
        Rule::parse_classical(line, target).unwrap()
    }

    fn lines(store: &RuleStore) -> Vec<String> {
        store.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut store = RuleStore::new(RuleOrder::Insertion);
        assert!(store.insert(rule("IP-CIDR,10.0.0.0/8", Target::Direct)));
        assert!(store.insert(rule("DOMAIN-SUFFIX,bank.com", Target::Direct)));
        let before = lines(&store);

        assert!(!store.insert(rule("DOMAIN-SUFFIX,bank.com", Target::Direct)));
        assert!(!store.insert(rule("IP-CIDR,10.0.0.0/8", Target::Direct)));

        assert_eq!(store.len(), 2);
        assert_eq!(lines(&store), before);
    }

    #[test]
    fn test_same_value_different_policy_is_kept() {
        let mut store = RuleStore::default();
        assert!(store.insert(rule("DOMAIN-SUFFIX,example.com", Target::Reject)));
        assert!(store.insert(rule("DOMAIN-SUFFIX,example.com", Target::Direct)));
        assert_eq!(store.len(), 2);

        // DIRECT comes first regardless of insertion order
        assert_eq!(
            lines(&store),
            vec![
                "DOMAIN-SUFFIX,example.com,DIRECT",
                "DOMAIN-SUFFIX,example.com,REJECT",
            ]
        );
    }

    #[test]
    fn test_tier_precedence() {
        let mut store = RuleStore::default();
        store.insert(rule("DOMAIN,proxy.example.com", Target::Proxy));
        store.insert(rule("DOMAIN-SUFFIX,ads.example.com", Target::Reject));
        store.insert(rule("IP-CIDR,10.0.0.0/8", Target::Direct));

        let targets: Vec<Target> = store.iter().map(|r| r.target()).collect();
        assert_eq!(targets, vec![Target::Direct, Target::Reject, Target::Proxy]);
        assert_eq!(store.tier_len(Target::Reject), 1);
    }

    #[test]
    fn test_insertion_order() {
        let mut store = RuleStore::new(RuleOrder::Insertion);
        store.insert(rule("IP-CIDR,10.0.0.0/8", Target::Direct));
        store.insert(rule("DOMAIN-SUFFIX,bank.com", Target::Direct));
        store.insert(rule("DOMAIN,a.com", Target::Direct));

        assert_eq!(
            lines(&store),
            vec![
                "IP-CIDR,10.0.0.0/8,DIRECT",
                "DOMAIN-SUFFIX,bank.com,DIRECT",
                "DOMAIN,a.com,DIRECT",
            ]
        );
    }

    #[test]
    fn test_sorted_order_is_input_order_independent() {
        let input = [
            "IP-CIDR,10.0.0.0/8",
            "DOMAIN-SUFFIX,zeta.com",
            "DOMAIN,a.com",
            "DOMAIN-SUFFIX,alpha.com",
            "DOMAIN-KEYWORD,cdn",
        ];

        let mut forward = RuleStore::new(RuleOrder::Sorted);
        let mut backward = RuleStore::new(RuleOrder::Sorted);
        forward.extend(input.iter().map(|l| rule(l, Target::Direct)));
        backward.extend(input.iter().rev().map(|l| rule(l, Target::Direct)));

        assert_eq!(lines(&forward), lines(&backward));
        assert_eq!(
            lines(&forward),
            vec![
                "DOMAIN,a.com,DIRECT",
                "DOMAIN-KEYWORD,cdn,DIRECT",
                "DOMAIN-SUFFIX,alpha.com,DIRECT",
                "DOMAIN-SUFFIX,zeta.com,DIRECT",
                "IP-CIDR,10.0.0.0/8,DIRECT",
            ]
        );
    }

    #[test]
    fn test_extend_counts_new_rules() {
        let mut store = RuleStore::default();
        let added = store.extend(vec![
            rule("DOMAIN,a.com", Target::Direct),
            rule("DOMAIN,a.com", Target::Direct),
            rule("DOMAIN,b.com", Target::Direct),
        ]);
        assert_eq!(added, 2);
        assert!(store.contains(&rule("DOMAIN,b.com", Target::Direct)));
        assert!(!store.contains(&rule("DOMAIN,b.com", Target::Reject)));
    }
}
