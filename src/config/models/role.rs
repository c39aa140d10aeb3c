//! Role configuration documents

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::authz::types::AccessLevel;

/// Reserved key holding a row-filter query under an index grant.
pub const ROW_FILTER_KEY: &str = "_dls_";
/// Reserved key holding a column allow-list under an index grant.
pub const COLUMN_FILTER_KEY: &str = "_fls_";

/// One named role: cluster permissions, index grants and tenant access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleSpec {
    /// Cluster-level permission patterns (may name action groups)
    #[serde(default)]
    pub cluster: Vec<String>,
    /// Resource pattern -> grant. Patterns may contain wildcards and the
    /// `${user.name}` / `${user_name}` template variables.
    #[serde(default)]
    pub indices: BTreeMap<String, IndexGrantSpec>,
    /// Tenant name -> access level
    #[serde(default)]
    pub tenants: BTreeMap<String, AccessLevel>,
}

impl RoleSpec {
    /// A role with no cluster, index or tenant entries is a no-op and is
    /// skipped (logged) rather than treated as an error.
    pub fn is_empty(&self) -> bool {
        self.cluster.is_empty() && self.indices.is_empty() && self.tenants.is_empty()
    }
}

/// Grant attached to one resource pattern: doc-kind patterns with their
/// permission lists, plus the reserved `_dls_` / `_fls_` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexGrantSpec {
    /// Doc-kind pattern -> permission patterns (may name action groups)
    pub doc_kinds: BTreeMap<String, Vec<String>>,
    /// Row-filter query string (`_dls_`), if any
    pub row_filter: Option<String>,
    /// Column allow-list (`_fls_`), empty when absent
    pub column_filter: Vec<String>,
}

impl IndexGrantSpec {
    /// Grant for a single doc-kind pattern.
    pub fn permissions(doc_kind: impl Into<String>, perms: Vec<String>) -> Self {
        let mut doc_kinds = BTreeMap::new();
        doc_kinds.insert(doc_kind.into(), perms);
        Self { doc_kinds, ..Default::default() }
    }

    pub fn with_row_filter(mut self, query: impl Into<String>) -> Self {
        self.row_filter = Some(query.into());
        self
    }

    pub fn with_column_filter<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_filter = fields.into_iter().map(Into::into).collect();
        self
    }
}

// In the document form the reserved keys sit next to the doc-kind entries,
// so (de)serialization flattens them into one map.

impl Serialize for IndexGrantSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra = usize::from(self.row_filter.is_some()) + usize::from(!self.column_filter.is_empty());
        let mut map = serializer.serialize_map(Some(self.doc_kinds.len() + extra))?;
        if let Some(query) = &self.row_filter {
            map.serialize_entry(ROW_FILTER_KEY, query)?;
        }
        if !self.column_filter.is_empty() {
            map.serialize_entry(COLUMN_FILTER_KEY, &self.column_filter)?;
        }
        for (doc_kind, perms) in &self.doc_kinds {
            map.serialize_entry(doc_kind, perms)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GrantEntry {
    Query(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for IndexGrantSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GrantVisitor;

        impl<'de> Visitor<'de> for GrantVisitor {
            type Value = IndexGrantSpec;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of doc-kind patterns, _dls_ and _fls_ entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut spec = IndexGrantSpec::default();
                while let Some((key, value)) = access.next_entry::<String, GrantEntry>()? {
                    match (key.as_str(), value) {
                        (ROW_FILTER_KEY, GrantEntry::Query(query)) => spec.row_filter = Some(query),
                        (ROW_FILTER_KEY, GrantEntry::List(_)) => {
                            return Err(serde::de::Error::custom("_dls_ must be a query string"));
                        }
                        (COLUMN_FILTER_KEY, GrantEntry::List(fields)) => spec.column_filter = fields,
                        (COLUMN_FILTER_KEY, GrantEntry::Query(field)) => {
                            spec.column_filter = vec![field];
                        }
                        (_, GrantEntry::List(perms)) => {
                            spec.doc_kinds.insert(key, perms);
                        }
                        (_, GrantEntry::Query(perm)) => {
                            spec.doc_kinds.insert(key, vec![perm]);
                        }
                    }
                }
                Ok(spec)
            }
        }

        deserializer.deserialize_map(GrantVisitor)
    }
}
