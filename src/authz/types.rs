//! Core value types of the privilege engine

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::authz::matcher;

/// Reserved tenant name addressed when multi-tenancy is disabled or the
/// principal requested no tenant.
pub const GLOBAL_TENANT: &str = "__global__";

/// Reserved tenant name a principal may request to address its own private
/// tenant explicitly.
pub const PRIVATE_TENANT: &str = "__user__";

/// Wildcard sentinel used for "any doc kind" and "all indices".
pub const ALL: &str = "_all";

/// Authenticated identity consumed read-only by the engine.
///
/// Built by the authentication collaborator; one immutable snapshot per
/// request. The engine never validates credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Identity name
    pub name: String,
    /// Backend role memberships (from the authentication backend)
    #[serde(default)]
    pub backend_roles: BTreeSet<String>,
    /// Tenant the principal asked to act in, if any
    #[serde(default)]
    pub requested_tenant: Option<String>,
    /// Custom attributes attached by the authenticator
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Principal {
    /// Create a principal with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend_roles: BTreeSet::new(),
            requested_tenant: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Add backend roles (builder style).
    pub fn with_backend_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backend_roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Set the requested tenant (builder style).
    pub fn with_requested_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.requested_tenant = Some(tenant.into());
        self
    }

    /// Substitute `${user.name}` / `${user_name}` template variables.
    pub fn substitute(&self, pattern: &str) -> String {
        pattern
            .replace("${user.name}", &self.name)
            .replace("${user_name}", &self.name)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.name, self.backend_roles)
    }
}

/// Network origin of the request, used by host-based role mapping rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAddress {
    /// Literal peer address
    pub address: String,
    /// Reverse-resolved hostname, when the transport provides one
    pub hostname: Option<String>,
}

impl SourceAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into(), hostname: None }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }
}

/// A concrete (index, doc kind) pair a request touches.
///
/// The composite key is a real struct; equality and hashing are structural.
/// A doc kind of `_all` is normalized to the `*` wildcard on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef {
    index: String,
    doc_kind: String,
}

impl ResourceRef {
    pub fn new(index: impl Into<String>, doc_kind: impl Into<String>) -> Self {
        let doc_kind = doc_kind.into();
        Self {
            index: index.into(),
            doc_kind: if doc_kind == ALL { "*".to_string() } else { doc_kind },
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn doc_kind(&self) -> &str {
        &self.doc_kind
    }

    /// True if `self`, interpreted as a (possibly wildcarded) grant, covers
    /// the concrete entry `other`.
    pub fn covers(&self, other: &ResourceRef) -> bool {
        matcher::matches(&self.index, &other.index) && matcher::matches(&self.doc_kind, &other.doc_kind)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.doc_kind)
    }
}

/// A [`ResourceRef`] plus the permission required on it.
///
/// Only used by the snapshot-restore write-privilege check, where each
/// renamed target index needs every restore write permission individually.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceAction {
    pub resource: ResourceRef,
    pub permission: String,
}

impl ResourceAction {
    pub fn new(index: impl Into<String>, doc_kind: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            resource: ResourceRef::new(index, doc_kind),
            permission: permission.into(),
        }
    }

    /// Grant-side coverage check, permission compared for equality.
    pub fn covers(&self, other: &ResourceAction) -> bool {
        self.permission == other.permission && self.resource.covers(&other.resource)
    }
}

/// Tenant access level. Read-write dominates read-only on aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessLevel {
    #[serde(rename = "RO", alias = "ro")]
    ReadOnly,
    #[serde(rename = "RW", alias = "rw")]
    ReadWrite,
}

impl AccessLevel {
    pub fn is_read_write(self) -> bool {
        matches!(self, AccessLevel::ReadWrite)
    }
}

/// Map from index pattern or concrete index name to a set of filter values
/// (row-filter query strings, or column field names).
pub type FilterMap = BTreeMap<String, BTreeSet<String>>;

/// Row/column filters attached earlier in the same logical request chain.
///
/// The host threads this through internal sub-requests; a later evaluation
/// must reproduce the identical maps or fail with
/// [`crate::AuthzError::FilterPropagationMismatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterEcho {
    pub row_filters: Option<FilterMap>,
    pub column_filters: Option<FilterMap>,
}

impl FilterEcho {
    /// Capture the filters of a finished decision for propagation.
    pub fn from_decision(decision: &PrivilegeDecision) -> Self {
        Self {
            row_filters: decision.row_filters.clone(),
            column_filters: decision.column_filters.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_filters.is_none() && self.column_filters.is_none()
    }
}

/// Result of one evaluation call.
///
/// Mutable only inside the evaluator; callers receive it as the final,
/// immutable outcome. Decisions are valid only for the configuration
/// snapshot version under which they were computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivilegeDecision {
    pub(crate) allowed: bool,
    pub(crate) missing_permissions: BTreeSet<String>,
    pub(crate) row_filters: Option<FilterMap>,
    pub(crate) column_filters: Option<FilterMap>,
    pub(crate) disable_request_cache: bool,
    pub(crate) disable_realtime: bool,
    pub(crate) config_version: u64,
}

impl PrivilegeDecision {
    pub(crate) fn denied(action: &str, config_version: u64) -> Self {
        let mut missing = BTreeSet::new();
        missing.insert(action.to_string());
        Self {
            allowed: false,
            missing_permissions: missing,
            config_version,
            ..Default::default()
        }
    }

    pub(crate) fn allow(mut self) -> Self {
        self.allowed = true;
        self.missing_permissions.clear();
        self
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Permissions the principal lacked; empty on allow.
    pub fn missing_permissions(&self) -> &BTreeSet<String> {
        &self.missing_permissions
    }

    /// Row-level filters to attach downstream, keyed by pattern and by
    /// concrete index name.
    pub fn row_filters(&self) -> Option<&FilterMap> {
        self.row_filters.as_ref()
    }

    /// Column allow-lists to attach downstream.
    pub fn column_filters(&self) -> Option<&FilterMap> {
        self.column_filters.as_ref()
    }

    /// The host must bypass its request cache for this request.
    pub fn disable_request_cache(&self) -> bool {
        self.disable_request_cache
    }

    /// The host must disable realtime reads for this request.
    pub fn disable_realtime(&self) -> bool {
        self.disable_realtime
    }

    /// Version of the configuration snapshot that produced this decision.
    pub fn config_version(&self) -> u64 {
        self.config_version
    }
}
