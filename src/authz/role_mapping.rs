//! Principal-to-role mapping
//!
//! Mapping rules are compiled into pattern-keyed multimaps once per
//! configuration snapshot; `map_roles` then runs four independent matches
//! and unions the hits. The result is a sorted, deduplicated set so log
//! output stays deterministic.

use std::collections::{BTreeMap, BTreeSet};

use crate::authz::matcher;
use crate::authz::types::{Principal, SourceAddress};
use crate::config::models::RoleMappingSpec;

/// Compiled role mapping rules.
#[derive(Debug, Clone, Default)]
pub struct RoleMappingIndex {
    /// user-name pattern -> roles
    users: BTreeMap<String, BTreeSet<String>>,
    /// backend-role pattern -> roles
    backend_roles: BTreeMap<String, BTreeSet<String>>,
    /// conjunctive backend-role pattern set -> roles
    and_backend_roles: Vec<(Vec<String>, BTreeSet<String>)>,
    /// host pattern -> roles
    hosts: BTreeMap<String, BTreeSet<String>>,
}

impl RoleMappingIndex {
    pub fn compile(mappings: &BTreeMap<String, RoleMappingSpec>) -> Self {
        let mut index = RoleMappingIndex::default();

        for (role, rule) in mappings {
            for user in &rule.users {
                index.users.entry(user.clone()).or_default().insert(role.clone());
            }
            for backend_role in &rule.backend_roles {
                index
                    .backend_roles
                    .entry(backend_role.clone())
                    .or_default()
                    .insert(role.clone());
            }
            if !rule.and_backend_roles.is_empty() {
                let patterns = rule.and_backend_roles.clone();
                match index.and_backend_roles.iter_mut().find(|(p, _)| *p == patterns) {
                    Some((_, roles)) => {
                        roles.insert(role.clone());
                    }
                    None => {
                        let mut roles = BTreeSet::new();
                        roles.insert(role.clone());
                        index.and_backend_roles.push((patterns, roles));
                    }
                }
            }
            for host in &rule.hosts {
                index.hosts.entry(host.clone()).or_default().insert(role.clone());
            }
        }

        index
    }

    /// Map a principal (plus optional network origin) to its role set.
    ///
    /// An index compiled from an absent or empty mapping table yields an
    /// empty set; authorization then trivially denies everything that
    /// requires a role.
    pub fn map_roles(&self, principal: &Principal, source: Option<&SourceAddress>) -> BTreeSet<String> {
        let mut roles = BTreeSet::new();
        let backend_roles: Vec<&str> = principal.backend_roles.iter().map(String::as_str).collect();

        for (pattern, mapped) in &self.users {
            if matcher::matches(pattern, &principal.name) {
                roles.extend(mapped.iter().cloned());
            }
        }

        for (pattern, mapped) in &self.backend_roles {
            if backend_roles.iter().any(|br| matcher::matches(pattern, br)) {
                roles.extend(mapped.iter().cloned());
            }
        }

        for (patterns, mapped) in &self.and_backend_roles {
            if matcher::all_patterns_matched(patterns, &backend_roles) {
                roles.extend(mapped.iter().cloned());
            }
        }

        if let Some(source) = source {
            for (pattern, mapped) in &self.hosts {
                let address_hit = matcher::matches(pattern, &source.address);
                let hostname_hit = source
                    .hostname
                    .as_deref()
                    .map(|h| matcher::matches(pattern, h))
                    .unwrap_or(false);
                if address_hit || hostname_hit {
                    roles.extend(mapped.iter().cloned());
                }
            }
        }

        roles
    }
}
