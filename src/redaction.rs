//! Sensitive field redaction.
//!
//! A [`RedactionRuleSet`] is an ordered set of field-name rules fixed at
//! logger construction time. Matching fields are removed from the emitted
//! record entirely, for every destination alike. Rules come in two shapes:
//!
//! - exact names (`password`), matched case-insensitively at the top level
//!   of a record and one level nested;
//! - wildcard-nested names (`*.password`), matched at any nesting depth.

use serde_json::Value;

/// Default sensitive field names, applied at any nesting depth.
const DEFAULT_RULES: &[&str] = &[
    "*.password",
    "*.token",
    "*.secret",
    "*.authorization",
    "*.api_key",
    "*.apikey",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    /// Matches at the top level and one level nested.
    Exact(String),
    /// Matches at any depth (`*.name`).
    Nested(String),
}

impl Rule {
    fn parse(raw: &str) -> Self {
        match raw.strip_prefix("*.") {
            Some(name) => Self::Nested(name.to_lowercase()),
            None => Self::Exact(raw.to_lowercase()),
        }
    }

    fn matches(&self, key: &str, depth: usize) -> bool {
        let key = key.to_lowercase();
        match self {
            Self::Exact(name) => depth <= 1 && key == *name,
            Self::Nested(name) => key == *name,
        }
    }
}

/// Ordered set of field-name redaction rules. Immutable after the logger
/// is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactionRuleSet {
    rules: Vec<Rule>,
}

impl Default for RedactionRuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl RedactionRuleSet {
    /// The standard rule set covering common credential field names.
    pub fn standard() -> Self {
        Self {
            rules: DEFAULT_RULES.iter().map(|r| Rule::parse(r)).collect(),
        }
    }

    /// An empty rule set that redacts nothing.
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    /// Builder: add a rule. `*.name` matches at any depth; a bare name
    /// matches at the top level and one level nested.
    #[must_use]
    pub fn with_rule(mut self, rule: impl AsRef<str>) -> Self {
        self.rules.push(Rule::parse(rule.as_ref()));
        self
    }

    /// Number of rules in the set.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set contains no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a field name at the given nesting depth would be removed.
    pub fn matches(&self, key: &str, depth: usize) -> bool {
        self.rules.iter().any(|r| r.matches(key, depth))
    }

    /// Remove all matching fields from a JSON value, recursively.
    pub fn apply(&self, value: &mut Value) {
        if self.rules.is_empty() {
            return;
        }
        self.apply_at(value, 0);
    }

    fn apply_at(&self, value: &mut Value, depth: usize) {
        match value {
            Value::Object(map) => {
                map.retain(|key, _| !self.matches(key, depth));
                for child in map.values_mut() {
                    self.apply_at(child, depth + 1);
                }
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.apply_at(item, depth);
                }
            }
            _ => {}
        }
    }
}
