//! Action group expansion
//!
//! Action groups are named aliases for sets of permission patterns and may
//! reference other groups. Expansion is recursive with a visited-set guard;
//! a cyclic reference logs a warning and stops expanding that branch.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

/// Expands action-group names into flat permission pattern sets.
#[derive(Debug, Clone, Default)]
pub struct ActionGroupExpander {
    groups: BTreeMap<String, Vec<String>>,
}

impl ActionGroupExpander {
    pub fn new(groups: BTreeMap<String, Vec<String>>) -> Self {
        Self { groups }
    }

    /// Expand a list of permission patterns. Entries naming a configured
    /// group are substituted by the group's (recursively expanded) members;
    /// everything else passes through verbatim.
    pub fn expand<S: AsRef<str>>(&self, patterns: &[S]) -> BTreeSet<String> {
        let mut resolved = BTreeSet::new();
        let mut in_progress = BTreeSet::new();
        for pattern in patterns {
            self.expand_one(pattern.as_ref(), &mut resolved, &mut in_progress);
        }
        resolved
    }

    fn expand_one(&self, pattern: &str, resolved: &mut BTreeSet<String>, in_progress: &mut BTreeSet<String>) {
        match self.groups.get(pattern) {
            None => {
                resolved.insert(pattern.to_string());
            }
            Some(members) => {
                if !in_progress.insert(pattern.to_string()) {
                    warn!(group = pattern, "cyclic action group reference, stopping expansion");
                    return;
                }
                for member in members {
                    self.expand_one(member, resolved, in_progress);
                }
                in_progress.remove(pattern);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(entries: &[(&str, &[&str])]) -> ActionGroupExpander {
        ActionGroupExpander::new(
            entries
                .iter()
                .map(|(name, members)| {
                    (name.to_string(), members.iter().map(|m| m.to_string()).collect())
                })
                .collect(),
        )
    }

    #[test]
    fn unknown_names_pass_through() {
        let expander = groups(&[]);
        let out = expander.expand(&["indices:data/read/search", "READ"]);
        assert!(out.contains("indices:data/read/search"));
        assert!(out.contains("READ"));
    }

    #[test]
    fn flat_group_is_substituted() {
        let expander = groups(&[("READ", &["indices:data/read/*", "indices:admin/mappings/get"])]);
        let out = expander.expand(&["READ"]);
        assert_eq!(out.len(), 2);
        assert!(out.contains("indices:data/read/*"));
        assert!(!out.contains("READ"));
    }

    #[test]
    fn nested_groups_recurse() {
        let expander = groups(&[
            ("CRUD", &["READ", "WRITE"]),
            ("READ", &["indices:data/read/*"]),
            ("WRITE", &["indices:data/write/*"]),
        ]);
        let out = expander.expand(&["CRUD"]);
        assert_eq!(out.len(), 2);
        assert!(out.contains("indices:data/read/*"));
        assert!(out.contains("indices:data/write/*"));
    }

    #[test]
    fn cycles_terminate() {
        let expander = groups(&[
            ("A", &["B", "indices:data/read/get"]),
            ("B", &["A", "indices:data/read/search"]),
        ]);
        let out = expander.expand(&["A"]);
        assert!(out.contains("indices:data/read/get"));
        assert!(out.contains("indices:data/read/search"));
        assert_eq!(out.len(), 2);
    }
}
