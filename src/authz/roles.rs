//! Compiled role permission tables
//!
//! Role documents are compiled once per configuration snapshot: action
//! groups expanded, empty roles dropped. Evaluation works on a filtered
//! view restricted to the principal's mapped roles, so matching never
//! iterates configuration outside them.
//!
//! Matching reduces a working set of requested (index, doc-kind) entries:
//! a grant whose permissions satisfy every required permission removes the
//! entries it covers. A request is satisfied when the working set is empty
//! at the end of one role's evaluation (single-role mode) or after all
//! roles together (multi-role-span mode).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::authz::action_groups::ActionGroupExpander;
use crate::authz::matcher;
use crate::authz::resource::{Resolved, ResourceResolver};
use crate::authz::types::{AccessLevel, FilterMap, Principal, ResourceAction, ResourceRef};
use crate::config::models::RoleSpec;

/// Permissions granted on one doc-kind pattern, action groups expanded.
#[derive(Debug, Clone)]
pub struct TypeGrant {
    pub doc_kind: String,
    pub permissions: Vec<String>,
}

/// Grant attached to one resource pattern.
#[derive(Debug, Clone)]
pub struct IndexGrant {
    /// Raw pattern; may contain wildcards and `${user.name}` templates
    pub pattern: String,
    pub type_grants: Vec<TypeGrant>,
    pub row_filter: Option<String>,
    pub column_filter: Vec<String>,
}

/// One compiled role.
#[derive(Debug, Clone)]
pub struct CompiledRole {
    pub name: String,
    pub cluster_permissions: Vec<String>,
    pub index_grants: Vec<IndexGrant>,
    pub tenants: Vec<(String, AccessLevel)>,
}

impl CompiledRole {
    /// Grant-side index names relevant to one grant pattern: wildcard
    /// patterns match against the requested names, everything else resolves
    /// through the catalog (alias expansion) before the exact check.
    fn grant_indices(
        &self,
        grant: &IndexGrant,
        principal: &Principal,
        requested_indices: &[String],
        resolver: &dyn ResourceResolver,
    ) -> Vec<String> {
        let pattern = principal.substitute(&grant.pattern);
        if matcher::contains_wildcard(&pattern) {
            matcher::matching_candidates(&pattern, requested_indices)
                .into_iter()
                .map(str::to_string)
                .collect()
        } else if resolver.has_index_or_alias(&pattern) {
            resolver.concrete_index_names(&pattern)
        } else {
            vec![pattern]
        }
    }

    /// Single-role semantics: a grant removes the entries it covers only if
    /// its permission list satisfies ALL required permissions (conjunctive).
    fn reduce_working_set(
        &self,
        resolved: &Resolved,
        principal: &Principal,
        required: &[String],
        resolver: &dyn ResourceResolver,
        working: &mut BTreeSet<ResourceRef>,
    ) {
        let requested_indices = resolved.index_names();

        for grant in &self.index_grants {
            let matched_indices = self.grant_indices(grant, principal, &requested_indices, resolver);
            if matched_indices.is_empty() {
                continue;
            }

            for type_grant in &grant.type_grants {
                if !matcher::match_any_of(&type_grant.permissions, required, true) {
                    continue;
                }
                for index in &matched_indices {
                    let covered = ResourceRef::new(index.clone(), type_grant.doc_kind.clone());
                    wildcard_remove(working, &covered);
                }
            }
        }
    }

    /// Spanning semantics: every (resource, permission) pair is a separate
    /// working item, so permission coverage may be split across grants and
    /// roles.
    fn reduce_action_working_set(
        &self,
        resolved: &Resolved,
        principal: &Principal,
        required: &[String],
        resolver: &dyn ResourceResolver,
        working: &mut BTreeSet<ResourceAction>,
    ) {
        let requested_indices = resolved.index_names();

        for grant in &self.index_grants {
            let matched_indices = self.grant_indices(grant, principal, &requested_indices, resolver);
            if matched_indices.is_empty() {
                continue;
            }

            for type_grant in &grant.type_grants {
                let matched_perms: Vec<&String> = required
                    .iter()
                    .filter(|p| matcher::match_any(&type_grant.permissions, p.as_str()))
                    .collect();
                if matched_perms.is_empty() {
                    continue;
                }
                for index in &matched_indices {
                    for permission in &matched_perms {
                        let covered = ResourceAction::new(
                            index.clone(),
                            type_grant.doc_kind.clone(),
                            (*permission).clone(),
                        );
                        working.retain(|item| !covered.covers(item));
                    }
                }
            }
        }
    }
}

/// The (resource, permission) cross product the spanning and reduce paths
/// work on.
fn action_items(resolved: &Resolved, required: &[String]) -> BTreeSet<ResourceAction> {
    let mut items = BTreeSet::new();
    for r in resolved.refs() {
        for permission in required {
            items.insert(ResourceAction {
                resource: r.clone(),
                permission: permission.clone(),
            });
        }
    }
    items
}

/// Remove every entry of `set` covered by `grant` (wildcard-aware).
fn wildcard_remove(set: &mut BTreeSet<ResourceRef>, grant: &ResourceRef) -> bool {
    if set.remove(grant) {
        return true;
    }
    let before = set.len();
    set.retain(|entry| !grant.covers(entry));
    set.len() != before
}

/// All compiled roles of one configuration snapshot.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    roles: BTreeMap<String, Arc<CompiledRole>>,
}

impl RoleTable {
    /// Compile role documents, expanding action groups up front. Roles with
    /// no resolvable entries are skipped, not errors.
    pub fn compile(specs: &BTreeMap<String, RoleSpec>, expander: &ActionGroupExpander) -> Self {
        let mut roles = BTreeMap::new();

        for (name, spec) in specs {
            if spec.is_empty() {
                debug!(role = name.as_str(), "role has no entries, skipping");
                continue;
            }

            let cluster_permissions: Vec<String> =
                expander.expand(&spec.cluster).into_iter().collect();

            let index_grants = spec
                .indices
                .iter()
                .map(|(pattern, grant)| IndexGrant {
                    pattern: pattern.clone(),
                    type_grants: grant
                        .doc_kinds
                        .iter()
                        .map(|(doc_kind, perms)| TypeGrant {
                            doc_kind: doc_kind.clone(),
                            permissions: expander.expand(perms).into_iter().collect(),
                        })
                        .collect(),
                    row_filter: grant.row_filter.clone(),
                    column_filter: grant.column_filter.clone(),
                })
                .collect();

            let tenants = spec.tenants.iter().map(|(t, lvl)| (t.clone(), *lvl)).collect();

            roles.insert(
                name.clone(),
                Arc::new(CompiledRole {
                    name: name.clone(),
                    cluster_permissions,
                    index_grants,
                    tenants,
                }),
            );
        }

        Self { roles }
    }

    /// View restricted to the given role names.
    pub fn filter(&self, names: &BTreeSet<String>) -> RoleView {
        RoleView {
            roles: names.iter().filter_map(|n| self.roles.get(n).cloned()).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompiledRole>> {
        self.roles.values()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// The subset of the role table mapped to one principal.
#[derive(Debug, Clone)]
pub struct RoleView {
    roles: Vec<Arc<CompiledRole>>,
}

impl RoleView {
    pub fn role_names(&self) -> Vec<&str> {
        self.roles.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// True if any mapped role's cluster permissions cover the action.
    pub fn implies_cluster_permission(&self, action: &str) -> bool {
        self.roles
            .iter()
            .any(|role| matcher::match_any(&role.cluster_permissions, action))
    }

    /// Single-role mode: one role alone must cover every requested entry.
    pub fn implies_index_privilege(
        &self,
        resolved: &Resolved,
        principal: &Principal,
        required: &[String],
        resolver: &dyn ResourceResolver,
    ) -> bool {
        let refs = resolved.refs();
        self.roles.iter().any(|role| {
            let mut working = refs.clone();
            role.reduce_working_set(resolved, principal, required, resolver, &mut working);
            if !working.is_empty() {
                debug!(role = role.name.as_str(), leftovers = ?working, "role does not cover request");
            }
            working.is_empty()
        })
    }

    /// Multi-role-span mode: (resource, permission) items removed by any
    /// role count toward one shared working set, so coverage may be split
    /// across roles both by resource and by permission.
    pub fn implies_index_privilege_spanning(
        &self,
        resolved: &Resolved,
        principal: &Principal,
        required: &[String],
        resolver: &dyn ResourceResolver,
    ) -> bool {
        if self.roles.is_empty() {
            return false;
        }
        let mut working = action_items(resolved, required);
        for role in &self.roles {
            role.reduce_action_working_set(resolved, principal, required, resolver, &mut working);
        }
        working.is_empty()
    }

    /// The subset of requested indices the principal does have `required`
    /// for, accumulated across roles. Used by the DNFOF rewrite: always a
    /// subset of the requested indices, possibly empty.
    pub fn reduce(
        &self,
        resolved: &Resolved,
        principal: &Principal,
        required: &[String],
        resolver: &dyn ResourceResolver,
    ) -> BTreeSet<String> {
        let mut working = action_items(resolved, required);
        for role in &self.roles {
            role.reduce_action_working_set(resolved, principal, required, resolver, &mut working);
        }

        resolved
            .index_names()
            .into_iter()
            .filter(|index| !working.iter().any(|item| item.resource.index() == index.as_str()))
            .collect()
    }

    /// Union the row/column filters of every mapped role whose annotated
    /// pattern is relevant to the requested indices. Entries are keyed both
    /// by the original pattern and by each concrete index it resolves to.
    pub fn collect_document_filters(
        &self,
        resolved: &Resolved,
        principal: &Principal,
        resolver: &dyn ResourceResolver,
    ) -> (FilterMap, FilterMap) {
        let mut row_filters = FilterMap::new();
        let mut column_filters = FilterMap::new();

        for role in &self.roles {
            for grant in &role.index_grants {
                if grant.row_filter.is_none() && grant.column_filter.is_empty() {
                    continue;
                }

                let pattern = principal.substitute(&grant.pattern);
                let concrete = resolver.concrete_index_names(&pattern);

                if let Some(query) = &grant.row_filter {
                    let query = principal.substitute(query);
                    row_filters.entry(pattern.clone()).or_default().insert(query.clone());
                    for index in &concrete {
                        row_filters.entry(index.clone()).or_default().insert(query.clone());
                    }
                }

                if !grant.column_filter.is_empty() {
                    column_filters
                        .entry(pattern.clone())
                        .or_default()
                        .extend(grant.column_filter.iter().cloned());
                    for index in &concrete {
                        column_filters
                            .entry(index.clone())
                            .or_default()
                            .extend(grant.column_filter.iter().cloned());
                    }
                }
            }
        }

        // keep only entries relevant to what was requested; an all-indices
        // request keeps everything
        let requested = resolved.index_names();
        if !requested.is_empty() && !resolved.is_all() {
            row_filters.retain(|key, _| !matcher::matching_candidates(key, &requested).is_empty());
            column_filters.retain(|key, _| !matcher::matching_candidates(key, &requested).is_empty());
        }

        (row_filters, column_filters)
    }

    /// Remove from `targets` every (index, permission) pair covered by the
    /// catch-all doc-kind grant of any mapped role. Snapshot-restore write
    /// checks accumulate across roles by design.
    pub fn reduce_resource_actions(&self, targets: &mut BTreeSet<ResourceAction>, principal: &Principal) {
        for role in &self.roles {
            for grant in &role.index_grants {
                let pattern = principal.substitute(&grant.pattern);
                let Some(star) = grant.type_grants.iter().find(|tg| tg.doc_kind == "*") else {
                    continue;
                };
                targets.retain(|target| {
                    !(matcher::matches(&pattern, target.resource.index())
                        && matcher::match_any(&star.permissions, &target.permission))
                });
            }
        }
    }

    /// True if any mapped role grants `permission` on `index` through its
    /// catch-all doc-kind entry.
    pub fn grants_index_permission(&self, index: &str, permission: &str, principal: &Principal) -> bool {
        self.roles.iter().any(|role| {
            role.index_grants.iter().any(|grant| {
                let pattern = principal.substitute(&grant.pattern);
                matcher::matches(&pattern, index)
                    && grant.type_grants.iter().any(|tg| {
                        tg.doc_kind == "*" && matcher::match_any(&tg.permissions, permission)
                    })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::request::{ActionRequest, IndexSpec};
    use crate::authz::resource::resolve_request;
    use crate::config::models::IndexGrantSpec;
    use std::collections::BTreeMap;

    struct FlatCatalog;

    impl ResourceResolver for FlatCatalog {
        fn concrete_index_names(&self, pattern: &str) -> Vec<String> {
            if pattern == "logs" {
                vec!["logs-2024-01".to_string(), "logs-2024-02".to_string()]
            } else {
                Vec::new()
            }
        }

        fn has_index_or_alias(&self, name: &str) -> bool {
            name == "logs" || name.starts_with("logs-2024") || name == "metrics-1"
        }
    }

    fn role_spec(pattern: &str, doc_kind: &str, perms: &[&str]) -> RoleSpec {
        let mut indices = BTreeMap::new();
        indices.insert(
            pattern.to_string(),
            IndexGrantSpec::permissions(doc_kind, perms.iter().map(|p| p.to_string()).collect()),
        );
        RoleSpec { indices, ..Default::default() }
    }

    fn table(specs: &[(&str, RoleSpec)]) -> RoleTable {
        let expander = ActionGroupExpander::default();
        RoleTable::compile(
            &specs.iter().map(|(n, s)| (n.to_string(), s.clone())).collect(),
            &expander,
        )
    }

    fn view(table: &RoleTable, names: &[&str]) -> RoleView {
        table.filter(&names.iter().map(|n| n.to_string()).collect())
    }

    fn resolved_for(indices: &[&str]) -> Resolved {
        resolve_request(
            &ActionRequest::Single(IndexSpec::indices(indices.iter().copied())),
            &FlatCatalog,
        )
    }

    fn required(actions: &[&str]) -> Vec<String> {
        actions.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn empty_roles_are_skipped() {
        let t = table(&[("noop", RoleSpec::default())]);
        assert!(t.is_empty());
    }

    #[test]
    fn wildcard_grant_covers_matching_indices() {
        let t = table(&[("reader", role_spec("logs-*", "*", &["indices:data/read/*"]))]);
        let v = view(&t, &["reader"]);
        let resolved = resolved_for(&["logs-2024-01"]);

        assert!(v.implies_index_privilege(
            &resolved,
            &Principal::new("kirk"),
            &required(&["indices:data/read/search"]),
            &FlatCatalog,
        ));
        assert!(!v.implies_index_privilege(
            &resolved,
            &Principal::new("kirk"),
            &required(&["indices:data/write/index"]),
            &FlatCatalog,
        ));
    }

    #[test]
    fn alias_grant_resolves_to_concrete_indices() {
        // grant on the alias "logs", request for a concrete backing index
        let t = table(&[("reader", role_spec("logs", "*", &["indices:data/read/*"]))]);
        let v = view(&t, &["reader"]);
        let resolved = resolved_for(&["logs-2024-02"]);

        assert!(v.implies_index_privilege(
            &resolved,
            &Principal::new("kirk"),
            &required(&["indices:data/read/get"]),
            &FlatCatalog,
        ));
    }

    #[test]
    fn doc_kind_pattern_restricts_coverage() {
        let t = table(&[("reader", role_spec("logs-*", "audit*", &["indices:data/read/*"]))]);
        let v = view(&t, &["reader"]);

        let audit = resolve_request(
            &ActionRequest::Single(IndexSpec::indices(["logs-2024-01"]).with_doc_kinds(["audit-trail"])),
            &FlatCatalog,
        );
        let event = resolve_request(
            &ActionRequest::Single(IndexSpec::indices(["logs-2024-01"]).with_doc_kinds(["event"])),
            &FlatCatalog,
        );

        let p = Principal::new("kirk");
        let req = required(&["indices:data/read/search"]);
        assert!(v.implies_index_privilege(&audit, &p, &req, &FlatCatalog));
        assert!(!v.implies_index_privilege(&event, &p, &req, &FlatCatalog));
    }

    #[test]
    fn conjunctive_required_permissions() {
        // mixed bulk needs both index and delete on the same grant
        let t = table(&[
            ("writer", role_spec("logs-*", "*", &["indices:data/write/index"])),
            ("full", role_spec("logs-*", "*", &["indices:data/write/*"])),
        ]);
        let resolved = resolved_for(&["logs-2024-01"]);
        let p = Principal::new("kirk");
        let both = required(&["indices:data/write/index", "indices:data/write/delete"]);

        assert!(!view(&t, &["writer"]).implies_index_privilege(&resolved, &p, &both, &FlatCatalog));
        assert!(view(&t, &["full"]).implies_index_privilege(&resolved, &p, &both, &FlatCatalog));
    }

    #[test]
    fn user_name_template_substitution() {
        let t = table(&[("own", role_spec("home-${user.name}", "*", &["indices:data/read/*"]))]);
        let v = view(&t, &["own"]);
        let p = Principal::new("kirk");

        let own = resolved_for(&["home-kirk"]);
        let foreign = resolved_for(&["home-spock"]);
        let req = required(&["indices:data/read/search"]);

        assert!(v.implies_index_privilege(&own, &p, &req, &FlatCatalog));
        assert!(!v.implies_index_privilege(&foreign, &p, &req, &FlatCatalog));
    }

    #[test]
    fn single_role_vs_spanning() {
        // each role covers one of the two requested indices
        let t = table(&[
            ("left", role_spec("logs-2024-01", "*", &["indices:data/read/*"])),
            ("right", role_spec("logs-2024-02", "*", &["indices:data/read/*"])),
        ]);
        let v = view(&t, &["left", "right"]);
        let resolved = resolved_for(&["logs-2024-01", "logs-2024-02"]);
        let p = Principal::new("kirk");
        let req = required(&["indices:data/read/search"]);

        assert!(!v.implies_index_privilege(&resolved, &p, &req, &FlatCatalog));
        assert!(v.implies_index_privilege_spanning(&resolved, &p, &req, &FlatCatalog));
    }

    #[test]
    fn spanning_allows_permission_split_across_roles() {
        // each role covers half the required permissions for one index
        let t = table(&[
            ("ix", role_spec("logs-*", "*", &["indices:data/write/index"])),
            ("del", role_spec("logs-*", "*", &["indices:data/write/delete"])),
        ]);
        let v = view(&t, &["ix", "del"]);
        let resolved = resolved_for(&["logs-2024-01"]);
        let p = Principal::new("kirk");
        let both = required(&["indices:data/write/index", "indices:data/write/delete"]);

        assert!(!v.implies_index_privilege(&resolved, &p, &both, &FlatCatalog));
        assert!(v.implies_index_privilege_spanning(&resolved, &p, &both, &FlatCatalog));
    }

    #[test]
    fn reduce_returns_permitted_subset() {
        let t = table(&[("reader", role_spec("logs-*", "*", &["indices:data/read/*"]))]);
        let v = view(&t, &["reader"]);
        let resolved = resolved_for(&["logs-2024-01", "metrics-1"]);
        let p = Principal::new("kirk");
        let req = required(&["indices:data/read/search"]);

        let reduced = v.reduce(&resolved, &p, &req, &FlatCatalog);
        assert_eq!(reduced.into_iter().collect::<Vec<_>>(), vec!["logs-2024-01".to_string()]);

        // reduced subset is itself fully permitted
        let narrowed = resolved_for(&["logs-2024-01"]);
        assert!(v.implies_index_privilege(&narrowed, &p, &req, &FlatCatalog));
    }

    #[test]
    fn reduce_is_empty_when_nothing_permitted() {
        let t = table(&[("reader", role_spec("logs-*", "*", &["indices:data/read/*"]))]);
        let v = view(&t, &["reader"]);
        let resolved = resolved_for(&["metrics-1"]);
        let reduced = v.reduce(
            &resolved,
            &Principal::new("kirk"),
            &required(&["indices:data/read/search"]),
            &FlatCatalog,
        );
        assert!(reduced.is_empty());
    }

    #[test]
    fn document_filters_union_across_roles() {
        let mut spec_a = role_spec("logs-*", "*", &["indices:data/read/*"]);
        spec_a.indices.get_mut("logs-*").unwrap().row_filter =
            Some(r#"{"term":{"tenant":"acme"}}"#.to_string());
        let mut spec_b = role_spec("logs-*", "*", &["indices:data/read/*"]);
        spec_b.indices.get_mut("logs-*").unwrap().row_filter =
            Some(r#"{"term":{"dept":"ops"}}"#.to_string());

        let t = table(&[("a", spec_a), ("b", spec_b)]);
        let v = view(&t, &["a", "b"]);
        let resolved = resolved_for(&["logs-2024-01"]);

        let (rows, _cols) = v.collect_document_filters(&resolved, &Principal::new("kirk"), &FlatCatalog);
        let on_pattern = &rows["logs-*"];
        assert_eq!(on_pattern.len(), 2);
        assert!(on_pattern.contains(r#"{"term":{"tenant":"acme"}}"#));
        assert!(on_pattern.contains(r#"{"term":{"dept":"ops"}}"#));
    }

    #[test]
    fn document_filters_keyed_by_concrete_index_too() {
        let mut spec = role_spec("logs", "*", &["indices:data/read/*"]);
        spec.indices.get_mut("logs").unwrap().row_filter =
            Some(r#"{"term":{"tenant":"acme"}}"#.to_string());
        spec.indices.get_mut("logs").unwrap().column_filter = vec!["message".to_string()];

        let t = table(&[("a", spec)]);
        let v = view(&t, &["a"]);
        let resolved = resolved_for(&["logs"]);

        let (rows, cols) = v.collect_document_filters(&resolved, &Principal::new("kirk"), &FlatCatalog);
        assert!(rows.contains_key("logs-2024-01"));
        assert!(rows.contains_key("logs-2024-02"));
        assert!(cols.contains_key("logs-2024-01"));
        // the alias key itself names no requested concrete index and is
        // dropped by the relevance pass
        assert!(!rows.contains_key("logs"));
    }

    #[test]
    fn irrelevant_filter_entries_are_dropped() {
        let mut spec = role_spec("metrics-*", "*", &["indices:data/read/*"]);
        spec.indices.get_mut("metrics-*").unwrap().row_filter = Some("{}".to_string());

        let t = table(&[("a", spec)]);
        let v = view(&t, &["a"]);
        let resolved = resolved_for(&["logs-2024-01"]);

        let (rows, _) = v.collect_document_filters(&resolved, &Principal::new("kirk"), &FlatCatalog);
        assert!(rows.is_empty());
    }

    #[test]
    fn row_filter_substitutes_user_name() {
        let mut spec = role_spec("logs-*", "*", &["indices:data/read/*"]);
        spec.indices.get_mut("logs-*").unwrap().row_filter =
            Some(r#"{"term":{"owner":"${user.name}"}}"#.to_string());

        let t = table(&[("a", spec)]);
        let v = view(&t, &["a"]);
        let resolved = resolved_for(&["logs-2024-01"]);

        let (rows, _) = v.collect_document_filters(&resolved, &Principal::new("kirk"), &FlatCatalog);
        assert!(rows["logs-*"].contains(r#"{"term":{"owner":"kirk"}}"#));
    }

    #[test]
    fn resource_action_reduction() {
        let t = table(&[("restorer", role_spec("restored-*", "*", &["indices:admin/create", "indices:data/write/index"]))]);
        let v = view(&t, &["restorer"]);

        let mut targets: BTreeSet<ResourceAction> = BTreeSet::new();
        targets.insert(ResourceAction::new("restored-logs", "*", "indices:admin/create"));
        targets.insert(ResourceAction::new("restored-logs", "*", "indices:data/write/index"));
        targets.insert(ResourceAction::new("other", "*", "indices:admin/create"));

        v.reduce_resource_actions(&mut targets, &Principal::new("kirk"));
        assert_eq!(targets.len(), 1);
        assert!(targets.contains(&ResourceAction::new("other", "*", "indices:admin/create")));
    }

    #[test]
    fn grants_index_permission_uses_catch_all_kind() {
        let t = table(&[
        ("writer", role_spec(".console", "*", &["indices:data/write/update"])),
        ("typed", role_spec(".console", "doc", &["indices:data/write/update"])),
        ]);
        let p = Principal::new("kirk");

        assert!(view(&t, &["writer"]).grants_index_permission(".console", "indices:data/write/update", &p));
        // a doc-kind-scoped grant does not make the console writable
        assert!(!view(&t, &["typed"]).grants_index_permission(".console", "indices:data/write/update", &p));
    }

    #[test]
    fn cluster_permission_matching() {
        let spec = RoleSpec {
            cluster: vec!["cluster:monitor/*".to_string()],
            ..role_spec("x", "*", &["indices:data/read/*"])
        };
        let t = table(&[("monitor", spec)]);
        let v = view(&t, &["monitor"]);

        assert!(v.implies_cluster_permission("cluster:monitor/health"));
        assert!(!v.implies_cluster_permission("cluster:admin/reroute"));
    }
}
