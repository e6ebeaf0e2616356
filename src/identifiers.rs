//! Identifier types for policy lookups and policy files.
//!
//! [`StateActionKey`] addresses a single learned value; [`PolicyId`] names the
//! persisted store that holds the values for one domain/problem pair.

use std::{
    fmt, fs,
    hash::{Hash, Hasher},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lookup key combining a serialized world state and an action label.
///
/// The key's identity is its joined text `"<state> <action>"`, which is also
/// how it is persisted, so a key rebuilt from a policy file always matches the
/// key the learner built, wherever the text is split. Keys are immutable once
/// built; only the value stored under a key changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct StateActionKey {
    text: String,
    split: usize,
}

impl StateActionKey {
    /// Create a key from a state serialization and an action label.
    ///
    /// # Examples
    ///
    /// ```
    /// use empower::identifiers::StateActionKey;
    ///
    /// let key = StateActionKey::new("((at a))", "(move a b)");
    /// assert_eq!(key.to_string(), "((at a)) (move a b)");
    /// ```
    pub fn new(state: impl Into<String>, action: impl Into<String>) -> Self {
        let mut text = state.into();
        let split = text.len();
        let action = action.into();
        if !action.is_empty() {
            text.push(' ');
            text.push_str(&action);
        }
        Self { text, split }
    }

    /// Rebuild a key from its persisted text form.
    ///
    /// The text alone decides equality. The state/action split is a best
    /// guess: action labels are usually parenthesised, so the split happens at
    /// the last `" ("`, then at the last space, and text without any space
    /// becomes a state with an empty action.
    pub fn parse(text: &str) -> Self {
        let split = text
            .rfind(" (")
            .or_else(|| text.rfind(' '))
            .unwrap_or(text.len());
        Self {
            text: text.to_string(),
            split,
        }
    }

    /// The serialized world state.
    pub fn state(&self) -> &str {
        &self.text[..self.split]
    }

    /// The action label.
    pub fn action(&self) -> &str {
        self.text.get(self.split + 1..).unwrap_or("")
    }

    /// The joined text form.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq for StateActionKey {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for StateActionKey {}

impl PartialOrd for StateActionKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StateActionKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.text.cmp(&other.text)
    }
}

impl Hash for StateActionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl From<String> for StateActionKey {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<StateActionKey> for String {
    fn from(key: StateActionKey) -> Self {
        key.text
    }
}

impl fmt::Display for StateActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Name of a persisted policy store.
///
/// Derived from the names declared inside the domain and problem description
/// files, so the same pair always maps to the same store and distinct problems
/// never share one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyId(String);

impl PolicyId {
    /// Suffix appended to every policy file name.
    pub const SUFFIX: &'static str = "_policy.txt";

    /// Wrap an already-derived identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build the identifier from a domain name and a problem name.
    pub fn from_names(domain: &str, problem: &str) -> Self {
        Self(format!("{domain}_{problem}{}", Self::SUFFIX))
    }

    /// Derive the identifier from the text of the two description files.
    ///
    /// `domain_label` and `problem_label` only appear in error messages.
    pub fn from_descriptions(
        domain_text: &str,
        domain_label: &str,
        problem_text: &str,
        problem_label: &str,
    ) -> Result<Self> {
        let domain = declared_name(domain_text).ok_or_else(|| Error::MissingDescriptionMarker {
            path: domain_label.to_string(),
        })?;
        let problem =
            declared_name(problem_text).ok_or_else(|| Error::MissingDescriptionMarker {
                path: problem_label.to_string(),
            })?;
        Ok(Self::from_names(domain, problem))
    }

    /// Read both description files and derive the identifier.
    pub fn from_files(domain: &Path, problem: &Path) -> Result<Self> {
        let read = |path: &Path| {
            fs::read_to_string(path).map_err(|source| Error::Io {
                operation: format!("read description file {}", path.display()),
                source,
            })
        };
        let domain_text = read(domain)?;
        let problem_text = read(problem)?;
        Self::from_descriptions(
            &domain_text,
            &domain.display().to_string(),
            &problem_text,
            &problem.display().to_string(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PolicyId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Name declared on the first line containing `define`: the token between the
/// closing parenthesis and the preceding space, e.g. `blocks` in
/// `(define (domain blocks)`.
fn declared_name(text: &str) -> Option<&str> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| line.contains("define"))?;
    let head = line.split(')').next().unwrap_or(line);
    let (_, name) = head.rsplit_once(' ')?;
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_joins_with_space() {
        let key = StateActionKey::new("s1", "a1");
        assert_eq!(key.to_string(), "s1 a1");
    }

    #[test]
    fn test_key_parse_splits_at_parenthesised_action() {
        let key = StateActionKey::parse("{(at r1 a) (free b)} (move r1 a b)");
        assert_eq!(key.state(), "{(at r1 a) (free b)}");
        assert_eq!(key.action(), "(move r1 a b)");
    }

    #[test]
    fn test_key_parse_falls_back_to_last_space() {
        let key = StateActionKey::parse("s1 a1");
        assert_eq!(key, StateActionKey::new("s1", "a1"));

        let bare = StateActionKey::parse("lonely");
        assert_eq!(bare.state(), "lonely");
        assert_eq!(bare.action(), "");
        assert_eq!(bare.to_string(), "lonely");
    }

    #[test]
    fn test_parsed_key_equals_built_key_whatever_the_split() {
        let built = StateActionKey::new("((at a) (free b))", "move-a-b");
        let parsed = StateActionKey::parse(&built.to_string());
        assert_eq!(parsed, built);
        assert_eq!(parsed.as_str(), "((at a) (free b)) move-a-b");
        assert_eq!(built.state(), "((at a) (free b))");
        assert_eq!(built.action(), "move-a-b");
    }

    #[test]
    fn test_key_serializes_as_text() {
        let key = StateActionKey::new("s0", "(go)");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#""s0 (go)""#);
        let back: StateActionKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_keys_differ_when_any_component_differs() {
        assert_ne!(StateActionKey::new("s", "a"), StateActionKey::new("s", "b"));
        assert_ne!(StateActionKey::new("s", "a"), StateActionKey::new("t", "a"));
    }

    #[test]
    fn test_policy_id_from_descriptions() {
        let domain = ";; blocks world\n(define (domain blocks)\n  (:requirements :strips))";
        let problem = "(define (problem bw-01) (:domain blocks)\n (:objects a b))";
        let id = PolicyId::from_descriptions(domain, "domain.pddl", problem, "p01.pddl").unwrap();
        assert_eq!(id.as_str(), "blocks_bw-01_policy.txt");
    }

    #[test]
    fn test_policy_id_is_stable() {
        let domain = "(define (domain d)";
        let problem = "(define (problem p)";
        let first = PolicyId::from_descriptions(domain, "d", problem, "p").unwrap();
        let second = PolicyId::from_descriptions(domain, "d", problem, "p").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_define_marker() {
        let result =
            PolicyId::from_descriptions("(domain d)", "dom.pddl", "(define (problem p)", "p");
        match result {
            Err(Error::MissingDescriptionMarker { path }) => assert_eq!(path, "dom.pddl"),
            other => panic!("expected MissingDescriptionMarker, got {other:?}"),
        }
    }

    #[test]
    fn test_define_line_without_name_is_rejected() {
        let result = PolicyId::from_descriptions("(define)", "dom", "(define (problem p)", "p");
        assert!(matches!(result, Err(Error::MissingDescriptionMarker { .. })));
    }
}
