//! Action name constants and classification
//!
//! Action names follow the `scope:group/operation` convention of the host
//! store. Classification is prefix-based; the composite read/write actions
//! are cluster-scoped only while `composite_enabled` is set.

pub const WRITE_INDEX: &str = "indices:data/write/index";
pub const WRITE_DELETE: &str = "indices:data/write/delete";
pub const WRITE_UPDATE: &str = "indices:data/write/update";
pub const WRITE_BULK: &str = "indices:data/write/bulk";
pub const WRITE_REINDEX: &str = "indices:data/write/reindex";
pub const READ_SEARCH: &str = "indices:data/read/search";
pub const READ_MGET: &str = "indices:data/read/mget";
pub const READ_MSEARCH: &str = "indices:data/read/msearch";
pub const READ_MTV: &str = "indices:data/read/mtv";
pub const ADMIN_ALIASES: &str = "indices:admin/aliases";
pub const ADMIN_CREATE: &str = "indices:admin/create";
pub const ADMIN_DELETE: &str = "indices:admin/delete";
pub const ADMIN_SEARCH_SHARDS: &str = "indices:admin/shards/search_shards";
pub const ADMIN_FIELD_MAPPINGS_GET: &str = "indices:admin/mappings/fields/get";

/// Prefix of every snapshot-restore action
pub const RESTORE_PREFIX: &str = "cluster:admin/snapshot/restore";
/// Prefix of engine-internal tenant actions
pub const TENANT_PREFIX: &str = "indexguard:tenant:";

/// Write privileges every renamed snapshot-restore target index needs
pub static RESTORE_WRITE_PRIVILEGES: &[&str] = &[ADMIN_CREATE, WRITE_INDEX];

/// Write-like action patterns that are never allowed against the engine's
/// own configuration index or the `_all` sentinel
pub static PROTECTED_INDEX_DENY_PATTERNS: &[&str] =
    &["indices:data/write*", "indices:admin/close", "indices:admin/delete"];

/// Composite actions that are treated as cluster-scoped when
/// `composite_enabled` is set
static COMPOSITE_ACTIONS: &[&str] =
    &[WRITE_BULK, ADMIN_ALIASES, READ_MGET, READ_MSEARCH, READ_MTV, WRITE_REINDEX];

/// Normalize internal action aliases to their public names.
pub fn normalize(action: &str) -> &str {
    if action.starts_with("internal:indices/admin/upgrade") {
        "indices:admin/upgrade"
    } else {
        action
    }
}

/// True if the action is checked against cluster-level permissions.
pub fn is_cluster_action(action: &str, composite_enabled: bool) -> bool {
    action.starts_with("cluster:")
        || action.starts_with("indexguard:cluster:")
        || action.starts_with("indices:admin/template/")
        || action.starts_with("indices:data/read/scroll")
        || (composite_enabled && COMPOSITE_ACTIONS.contains(&action))
}

/// True if the action is checked against tenant permissions.
pub fn is_tenant_action(action: &str) -> bool {
    action.starts_with(TENANT_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_internal_upgrade() {
        assert_eq!(normalize("internal:indices/admin/upgrade"), "indices:admin/upgrade");
        assert_eq!(normalize(READ_SEARCH), READ_SEARCH);
    }

    #[test]
    fn cluster_classification() {
        assert!(is_cluster_action("cluster:monitor/health", false));
        assert!(is_cluster_action("indices:admin/template/put", false));
        assert!(is_cluster_action("indices:data/read/scroll", false));
        assert!(is_cluster_action(WRITE_BULK, true));
        assert!(!is_cluster_action(WRITE_BULK, false));
        assert!(!is_cluster_action(READ_SEARCH, true));
    }

    #[test]
    fn tenant_classification() {
        assert!(is_tenant_action("indexguard:tenant:read/dashboard"));
        assert!(!is_tenant_action("cluster:monitor/health"));
    }
}
