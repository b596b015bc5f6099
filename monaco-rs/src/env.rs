//! Variable environment.
//!
//! Maps bare variable names (no `..`/`::` delimiters) to [`Value`]s.  A
//! render works on its own clone; `..define::` and `..undef::` mutate that
//! clone for the rest of the evaluation, regardless of block nesting.

use std::collections::HashMap;

use crate::template::Value;

/// Name → value store read and written by directives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    vars: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Remove a variable, returning its previous value.
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Iterate over all variables.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Environment {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Environment::new();
        env.extend(iter);
        env
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut env = Environment::new();
        env.set("temp", 27i64);
        assert_eq!(env.get("temp"), Some(&Value::Int(27)));
    }

    #[test]
    fn overwrite() {
        let mut env = Environment::new();
        env.set("x", "old");
        env.set("x", "new");
        assert_eq!(env.get("x"), Some(&Value::Str("new".into())));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn unset_returns_previous() {
        let mut env = Environment::new();
        env.set("gone", 1i64);
        assert_eq!(env.unset("gone"), Some(Value::Int(1)));
        assert_eq!(env.unset("gone"), None);
        assert!(env.is_empty());
    }

    #[test]
    fn contains() {
        let mut env = Environment::new();
        env.set("present", true);
        assert!(env.contains("present"));
        assert!(!env.contains("absent"));
    }

    #[test]
    fn collect_from_pairs() {
        let env: Environment = [("a", Value::Int(1)), ("b", Value::from(vec![1i64, 2]))]
            .into_iter()
            .collect();
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("b").and_then(Value::as_list).map(<[Value]>::len), Some(2));
    }

    #[test]
    fn clone_is_independent() {
        let base: Environment = [("x", 1i64)].into_iter().collect();
        let mut copy = base.clone();
        copy.set("x", 2i64);
        assert_eq!(base.get("x"), Some(&Value::Int(1)));
    }
}
