use std::collections::BTreeSet;
use crate::update::RuleId;

pub type PolicySet = BTreeSet<String>;

/// Renders a rule trace. Staged policies are skipped when `include_staged`
/// is false, and the remaining entries are renumbered contiguously.
pub fn policy_set(rules: &[RuleId], include_staged: bool) -> PolicySet {
    let mut skipped = 0;
    rules.iter().enumerate().filter_map(|(idx, rule)| {
        if !include_staged && rule.is_staged() {
            skipped += 1;
            return None;
        }
        Some(rule.trace(idx - skipped))
    }).collect()
}

/// Distinct policy traces seen within one interval.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PolicySets {
    sets: Vec<PolicySet>,
}

impl PolicySets {
    pub fn new(set: PolicySet) -> Self {
        Self {
            sets: vec![set],
        }
    }

    pub fn aggregate(&mut self, set: PolicySet) {
        if !self.sets.contains(&set) {
            self.sets.push(set);
        }
    }

    pub fn merge_with(&mut self, other: PolicySets) {
        for set in other.sets {
            self.aggregate(set);
        }
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    pub fn get(&self, idx: usize) -> Option<&PolicySet> {
        self.sets.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolicySet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
