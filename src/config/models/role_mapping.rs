//! Role mapping configuration documents

use serde::{Deserialize, Serialize};

/// One mapping rule: the conditions under which a principal receives the
/// role this rule is keyed by. A rule contributes its role as soon as any
/// one of its condition lists matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleMappingSpec {
    /// Exact-user name patterns
    #[serde(default)]
    pub users: Vec<String>,
    /// Backend-role patterns, any-match
    #[serde(default)]
    pub backend_roles: Vec<String>,
    /// Backend-role patterns that must ALL match (conjunctive)
    #[serde(default)]
    pub and_backend_roles: Vec<String>,
    /// Source address / hostname patterns
    #[serde(default)]
    pub hosts: Vec<String>,
}

impl RoleMappingSpec {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.backend_roles.is_empty()
            && self.and_backend_roles.is_empty()
            && self.hosts.is_empty()
    }
}
