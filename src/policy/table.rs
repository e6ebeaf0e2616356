//! State-action value table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identifiers::StateActionKey;

/// Mapping from (state, action) pairs to learned values.
///
/// Unseen keys read as `0.0` without being inserted. The table only grows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyTable {
    values: BTreeMap<StateActionKey, f64>,
}

impl PolicyTable {
    /// Value returned for keys that were never written
    pub const DEFAULT_VALUE: f64 = 0.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value for a key, `0.0` when absent
    pub fn get(&self, key: &StateActionKey) -> f64 {
        self.values
            .get(key)
            .copied()
            .unwrap_or(Self::DEFAULT_VALUE)
    }

    /// Value of taking `action` in `state`
    pub fn value_of(&self, state: &str, action: &str) -> f64 {
        self.get(&StateActionKey::new(state, action))
    }

    /// Set the value for a key
    pub fn set(&mut self, key: StateActionKey, value: f64) {
        self.values.insert(key, value);
    }

    /// Add `delta` to the value of a key (starting from the default)
    pub fn add(&mut self, key: StateActionKey, delta: f64) {
        *self.values.entry(key).or_insert(Self::DEFAULT_VALUE) += delta;
    }

    /// Greedy action among `legal_actions` with its value.
    ///
    /// Only a strictly greater value replaces the current best, so the first
    /// action in enumeration order wins ties. Returns `None` when no actions
    /// are given.
    pub fn greedy_action<'a>(
        &self,
        state: &str,
        legal_actions: &'a [String],
    ) -> Option<(&'a str, f64)> {
        let (first, rest) = legal_actions.split_first()?;
        let mut best = (first.as_str(), self.value_of(state, first));
        for action in rest {
            let value = self.value_of(state, action);
            if value > best.1 {
                best = (action.as_str(), value);
            }
        }
        Some(best)
    }

    /// Iterate over stored entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&StateActionKey, f64)> {
        self.values.iter().map(|(key, value)| (key, *value))
    }

    pub fn contains(&self, key: &StateActionKey) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(StateActionKey, f64)> for PolicyTable {
    fn from_iter<I: IntoIterator<Item = (StateActionKey, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|label| label.to_string()).collect()
    }

    #[test]
    fn test_absent_key_reads_default_without_inserting() {
        let table = PolicyTable::new();
        let key = StateActionKey::new("s0", "(noop)");
        assert_eq!(table.get(&key), 0.0);
        assert!(!table.contains(&key));
        assert!(table.is_empty());
    }

    #[test]
    fn test_set_then_get() {
        let mut table = PolicyTable::new();
        let key = StateActionKey::new("s0", "(pick a)");
        table.set(key.clone(), -12.5);
        assert_eq!(table.get(&key), -12.5);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_add_accumulates_from_default() {
        let mut table = PolicyTable::new();
        let key = StateActionKey::new("s0", "(pick a)");
        table.add(key.clone(), 300.0);
        table.add(key.clone(), -200.0);
        assert_eq!(table.get(&key), 100.0);
    }

    #[test]
    fn test_greedy_action_picks_maximum() {
        let mut table = PolicyTable::new();
        table.set(StateActionKey::new("s", "(a)"), 0.5);
        table.set(StateActionKey::new("s", "(b)"), 1.5);
        table.set(StateActionKey::new("s", "(c)"), 0.8);

        let legal = actions(&["(a)", "(b)", "(c)"]);
        assert_eq!(table.greedy_action("s", &legal), Some(("(b)", 1.5)));
    }

    #[test]
    fn test_greedy_action_first_wins_ties() {
        let mut table = PolicyTable::new();
        table.set(StateActionKey::new("s", "(b)"), 2.0);
        table.set(StateActionKey::new("s", "(c)"), 2.0);

        let legal = actions(&["(a)", "(b)", "(c)"]);
        assert_eq!(table.greedy_action("s", &legal), Some(("(b)", 2.0)));

        let unseen = actions(&["(x)", "(y)"]);
        assert_eq!(table.greedy_action("s", &unseen), Some(("(x)", 0.0)));
    }

    #[test]
    fn test_greedy_action_keeps_first_when_all_negative() {
        let mut table = PolicyTable::new();
        table.set(StateActionKey::new("s", "(a)"), -5.0);
        table.set(StateActionKey::new("s", "(b)"), -1.0);

        let legal = actions(&["(a)", "(b)"]);
        assert_eq!(table.greedy_action("s", &legal), Some(("(b)", -1.0)));
        assert_eq!(table.greedy_action("s", &[]), None);
    }
}
