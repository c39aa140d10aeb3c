//! The privilege evaluation state machine
//!
//! One synchronous entry point, safe to call concurrently from many
//! threads: all shared state is the immutable configuration snapshot loaded
//! once per call. Decision order: initialization check, snapshot-restore
//! special case, protected-index guard, cluster branch, tenant branch,
//! index branch with DNFOF narrowing, filtered-alias finalization.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::authz::actions;
use crate::authz::audit::{AuditSink, NoopAuditSink};
use crate::authz::filtered_alias::{self, AliasCheck};
use crate::authz::interceptor::{InterceptorDecision, PrivilegesInterceptor};
use crate::authz::matcher;
use crate::authz::request::{ActionRequest, AliasAction, RestoreSpec};
use crate::authz::resource::{resolve_request, Resolved, ResolvedIndices, ResourceResolver};
use crate::authz::roles::RoleView;
use crate::authz::types::{
    FilterEcho, FilterMap, PrivilegeDecision, Principal, ResourceAction, SourceAddress, ALL,
};
use crate::config::snapshot::{ConfigSnapshot, EngineSnapshot, SnapshotPublisher};
use crate::utils::error::{AuthzError, Result};

/// Per-call context the host threads into an evaluation.
#[derive(Default)]
pub struct EvaluationContext {
    /// Network origin, used by host-based role mapping rules
    pub source: Option<SourceAddress>,
    /// Filters attached earlier in the same logical request chain
    pub filter_echo: FilterEcho,
    /// Pre-resolved roles (internal auth token path), bypassing the mapper
    pub roles_override: Option<BTreeSet<String>>,
}

/// The privilege evaluation engine.
pub struct PrivilegeEvaluator {
    publisher: SnapshotPublisher,
    resolver: Arc<dyn ResourceResolver>,
    audit: Arc<dyn AuditSink>,
    interceptor: Option<Arc<dyn PrivilegesInterceptor>>,
}

impl PrivilegeEvaluator {
    pub fn new(resolver: Arc<dyn ResourceResolver>) -> Self {
        Self {
            publisher: SnapshotPublisher::new(),
            resolver,
            audit: Arc::new(NoopAuditSink),
            interceptor: None,
        }
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn PrivilegesInterceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Push a new configuration bundle; see
    /// [`SnapshotPublisher::on_config_changed`].
    pub fn on_config_changed(&self, config: &ConfigSnapshot) -> Result<()> {
        self.publisher.on_config_changed(config)
    }

    pub fn is_initialized(&self) -> bool {
        self.publisher.is_initialized()
    }

    /// Version of the currently published snapshot.
    pub fn config_version(&self) -> Result<u64> {
        Ok(self.snapshot()?.version())
    }

    /// Map a principal to its role set under the current snapshot.
    pub fn map_roles(&self, principal: &Principal, source: Option<&SourceAddress>) -> Result<BTreeSet<String>> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.role_mappings.map_roles(principal, source))
    }

    /// Map a principal's roles to its addressable tenants.
    pub fn map_tenants(&self, principal: &Principal, roles: &BTreeSet<String>) -> Result<BTreeMap<String, bool>> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.tenant_table.map_tenants(principal, roles))
    }

    /// Evaluate a batch of tenant application privileges for the
    /// principal's requested tenant.
    pub fn tenant_application_privileges(
        &self,
        principal: &Principal,
        source: Option<&SourceAddress>,
        privileges: &[String],
    ) -> Result<BTreeMap<String, bool>> {
        let snapshot = self.snapshot()?;
        if privileges.is_empty() {
            return Ok(BTreeMap::new());
        }
        let roles = snapshot.role_mappings.map_roles(principal, source);
        Ok(snapshot.tenant_table.application_privileges(
            principal,
            &roles,
            privileges,
            snapshot.dynamic.multitenancy_enabled,
        ))
    }

    /// Name of the index backing the web console surface.
    pub fn console_index_name(&self) -> Result<String> {
        Ok(self.snapshot()?.dynamic.console_index.clone())
    }

    pub fn multitenancy_enabled(&self) -> Result<bool> {
        Ok(self.snapshot()?.dynamic.multitenancy_enabled)
    }

    pub fn not_fail_on_forbidden_enabled(&self) -> Result<bool> {
        Ok(self.snapshot()?.dynamic.do_not_fail_on_forbidden)
    }

    /// True unless some mapped role grants a write-update permission on the
    /// console index through a catch-all doc-kind entry.
    pub fn console_index_readonly(&self, principal: &Principal, source: Option<&SourceAddress>) -> Result<bool> {
        let snapshot = self.snapshot()?;
        let roles = snapshot.role_mappings.map_roles(principal, source);
        let view = snapshot.role_table.filter(&roles);
        Ok(!view.grants_index_permission(&snapshot.dynamic.console_index, actions::WRITE_UPDATE, principal))
    }

    /// The single primary entry point: decide ALLOW/DENY for one request.
    ///
    /// The request is mutable because a successful DNFOF pass narrows it to
    /// the permitted index subset in place. Decisions are valid only for
    /// the snapshot version they carry; a configuration reload invalidates
    /// all in-flight assumptions.
    pub fn evaluate(
        &self,
        principal: &Principal,
        action: &str,
        request: &mut ActionRequest,
        ctx: &EvaluationContext,
    ) -> Result<PrivilegeDecision> {
        let snapshot = self.snapshot()?;
        let settings = &snapshot.dynamic;
        let action = actions::normalize(action);

        let mapped_roles = match &ctx.roles_override {
            Some(roles) => roles.clone(),
            None => snapshot.role_mappings.map_roles(principal, ctx.source.as_ref()),
        };
        let view = snapshot.role_table.filter(&mapped_roles);

        debug!(
            user = principal.name.as_str(),
            action,
            roles = ?view.role_names(),
            "evaluating permissions"
        );

        let mut decision = PrivilegeDecision::denied(action, snapshot.version());

        if action.starts_with(actions::RESTORE_PREFIX) {
            if !settings.restore_privilege_enabled {
                warn!(action, "snapshot restore is not allowed for a regular user");
                self.audit.log_denied(principal, action, request);
                return Ok(decision);
            }
            return self.evaluate_snapshot_restore(principal, action, request, &view, &snapshot);
        }

        let resolved = resolve_request(request, self.resolver.as_ref());
        debug!(?resolved, "requested resolved resources");

        // nothing regular users may ever write to: the engine's own config
        // index, or everything at once
        let touches_protected = resolved.contains_index(&settings.protected_index) || resolved.contains_index(ALL);
        if touches_protected {
            if matcher::match_any(actions::PROTECTED_INDEX_DENY_PATTERNS, action) {
                warn!(
                    action,
                    index = settings.protected_index.as_str(),
                    "write-like action against a protected resource is not allowed for a regular user"
                );
                self.audit.log_protected_resource_attempt(principal, action, request);
                return Ok(decision);
            }
            decision.disable_request_cache = true;
            decision.disable_realtime = true;
        }

        let tenants = snapshot.tenant_table.map_tenants(principal, &mapped_roles);

        if actions::is_cluster_action(action, settings.composite_enabled) {
            if !view.implies_cluster_permission(action) {
                info!(
                    "no cluster-level perm match for {} {:?} [action [{}]] [roles checked {:?}]",
                    principal,
                    resolved.index_names(),
                    action,
                    view.role_names()
                );
                self.audit.log_denied(principal, action, request);
                return Ok(decision);
            }

            if let Some(verdict) = self.consult_interceptor(request, action, principal, settings, &resolved, &tenants) {
                return Ok(match verdict {
                    true => decision.allow(),
                    false => decision,
                });
            }

            // narrow composite reads to the permitted subset when possible
            if settings.do_not_fail_on_forbidden && action.starts_with("indices:data/read/") {
                if let ResolvedIndices::Named(_) = resolved.indices {
                    let required = vec![action.to_string()];
                    let reduced: Vec<String> = view
                        .reduce(&resolved, principal, &required, self.resolver.as_ref())
                        .into_iter()
                        .collect();
                    if reduced.is_empty() {
                        self.audit.log_denied(principal, action, request);
                        return Ok(decision);
                    }
                    if request.replace_indices(&reduced) {
                        return Ok(decision.allow());
                    }
                }
            }

            debug!(action, "allowed through cluster permissions");
            return Ok(decision.allow());
        }

        if actions::is_tenant_action(action) {
            let granted = snapshot.tenant_table.has_tenant_permission(
                principal,
                &mapped_roles,
                action,
                settings.multitenancy_enabled,
            );
            if !granted {
                info!(
                    "no tenant-level perm match for {} [action [{}]] [roles checked {:?}]",
                    principal,
                    action,
                    view.role_names()
                );
                self.audit.log_denied(principal, action, request);
                return Ok(decision);
            }
            return Ok(decision.allow());
        }

        // ---- index-level path

        let required = required_index_permissions(request, action, settings.check_restore_write_privileges);
        decision.missing_permissions = required.iter().cloned().collect();

        self.attach_document_filters(&mut decision, &view, &resolved, principal, ctx)?;

        if let Some(verdict) = self.consult_interceptor(request, action, principal, settings, &resolved, &tenants) {
            return Ok(match verdict {
                true => decision.allow(),
                false => decision,
            });
        }

        if resolved.is_none_sentinel() {
            debug!("no local resources resolved, nothing to check");
            return Ok(decision.allow());
        }

        let dnfof_applicable = settings.do_not_fail_on_forbidden
            && (action.starts_with("indices:data/read/")
                || action.starts_with(actions::ADMIN_FIELD_MAPPINGS_GET)
                || action == actions::ADMIN_SEARCH_SHARDS);

        if dnfof_applicable {
            let reduced: Vec<String> = view
                .reduce(&resolved, principal, &required, self.resolver.as_ref())
                .into_iter()
                .collect();

            if reduced.is_empty() {
                if settings.dnfof_empty_result_enabled && request.replace_indices(&[]) {
                    debug!(action, "narrowed to an explicitly empty result");
                    return Ok(decision.allow());
                }
                info!(
                    "no index-level perm match for {} {:?} [action [{:?}]] [roles checked {:?}]",
                    principal,
                    resolved.index_names(),
                    required,
                    view.role_names()
                );
                self.audit.log_denied(principal, action, request);
                return Ok(decision);
            }

            if request.replace_indices(&reduced) {
                debug!(action, ?reduced, "request narrowed to permitted subset");
                return Ok(decision.allow());
            }
            // shape cannot be rewritten; fall through to the strict check
        }

        let perm_given = if settings.multi_rolespan_enabled {
            view.implies_index_privilege_spanning(&resolved, principal, &required, self.resolver.as_ref())
        } else {
            view.implies_index_privilege(&resolved, principal, &required, self.resolver.as_ref())
        };

        if !perm_given {
            info!(
                "no index-level perm match for {} {:?} [action [{:?}]] [roles checked {:?}]",
                principal,
                resolved.index_names(),
                required,
                view.role_names()
            );
            info!("no permissions for {:?}", decision.missing_permissions);
            self.audit.log_denied(principal, action, request);
            return Ok(decision);
        }

        if filtered_alias::check(
            &resolved.index_names(),
            action,
            settings.filtered_alias_mode(),
            self.resolver.as_ref(),
        ) == AliasCheck::Deny
        {
            self.audit.log_denied(principal, action, request);
            return Ok(decision);
        }

        debug!(action, "allowed, all requested resources covered");
        Ok(decision.allow())
    }

    fn snapshot(&self) -> Result<Arc<EngineSnapshot>> {
        self.publisher.load().ok_or(AuthzError::NotInitialized)
    }

    /// Returns `Some(allow?)` when the interceptor short-circuits.
    fn consult_interceptor(
        &self,
        request: &mut ActionRequest,
        action: &str,
        principal: &Principal,
        settings: &crate::config::models::DynamicSettings,
        resolved: &Resolved,
        tenants: &BTreeMap<String, bool>,
    ) -> Option<bool> {
        let interceptor = self.interceptor.as_ref()?;
        match interceptor.try_replace(request, action, principal, settings, resolved, tenants) {
            InterceptorDecision::Allow => Some(true),
            InterceptorDecision::Deny => {
                self.audit.log_denied(principal, action, request);
                Some(false)
            }
            InterceptorDecision::NoOpinion => None,
        }
    }

    /// Aggregate row/column filters and enforce consistency against filters
    /// attached earlier in the request chain.
    fn attach_document_filters(
        &self,
        decision: &mut PrivilegeDecision,
        view: &RoleView,
        resolved: &Resolved,
        principal: &Principal,
        ctx: &EvaluationContext,
    ) -> Result<()> {
        let (rows, cols) = view.collect_document_filters(resolved, principal, self.resolver.as_ref());

        if !rows.is_empty() {
            check_filter_echo(&ctx.filter_echo.row_filters, &rows, "row")?;
            decision.row_filters = Some(rows);
        }
        if !cols.is_empty() {
            check_filter_echo(&ctx.filter_echo.column_filters, &cols, "column")?;
            decision.column_filters = Some(cols);
        }
        Ok(())
    }

    fn evaluate_snapshot_restore(
        &self,
        principal: &Principal,
        action: &str,
        request: &ActionRequest,
        view: &RoleView,
        snapshot: &EngineSnapshot,
    ) -> Result<PrivilegeDecision> {
        let settings = &snapshot.dynamic;
        let decision = PrivilegeDecision::denied(action, snapshot.version());

        let ActionRequest::SnapshotRestore(spec) = request else {
            warn!(action, "restore action carried a non-restore request shape");
            self.audit.log_denied(principal, action, request);
            return Ok(decision);
        };

        // restoring cluster-global state would overwrite security config
        if spec.include_global_state {
            warn!(action, "restore with global state is not allowed");
            self.audit.log_protected_resource_attempt(principal, action, request);
            return Ok(decision);
        }

        let Some(available) = self.resolver.snapshot_indices(&spec.repository, &spec.snapshot) else {
            warn!(
                repository = spec.repository.as_str(),
                snapshot = spec.snapshot.as_str(),
                "snapshot not found"
            );
            self.audit.log_denied(principal, action, request);
            return Ok(decision);
        };

        let restored = filter_snapshot_indices(&available, &spec.indices);
        debug!(?restored, "resolved indices for restore");

        if restored.iter().any(|i| i == &settings.protected_index || i == ALL) {
            warn!(action, "restore source includes a protected index");
            self.audit.log_protected_resource_attempt(principal, action, request);
            return Ok(decision);
        }

        let renamed = renamed_indices(spec, &restored);
        if renamed.iter().any(|i| i == &settings.protected_index) {
            warn!(action, "restore target includes a protected index");
            self.audit.log_protected_resource_attempt(principal, action, request);
            return Ok(decision);
        }

        let mut allowed = view.implies_cluster_permission(action);

        if settings.check_restore_write_privileges {
            let mut targets: BTreeSet<ResourceAction> = BTreeSet::new();
            for index in &renamed {
                for permission in actions::RESTORE_WRITE_PRIVILEGES {
                    targets.insert(ResourceAction::new(index.clone(), "*", *permission));
                }
            }
            view.reduce_resource_actions(&mut targets, principal);
            if !targets.is_empty() {
                debug!(?targets, "missing restore write privileges");
                allowed = false;
            }
        }

        if !allowed {
            info!(
                "no perm match for {} [action [{}]] [roles checked {:?}]",
                principal,
                action,
                view.role_names()
            );
            self.audit.log_denied(principal, action, request);
            return Ok(decision);
        }

        Ok(decision.allow())
    }
}

fn check_filter_echo(previous: &Option<FilterMap>, computed: &FilterMap, kind: &'static str) -> Result<()> {
    match previous {
        Some(previous) if previous != computed => Err(AuthzError::FilterPropagationMismatch { kind }),
        _ => Ok(()),
    }
}

/// The full permission set one request requires: the action itself plus
/// permissions synthesized from the request body.
fn required_index_permissions(
    request: &ActionRequest,
    action: &str,
    check_restore_write_privileges: bool,
) -> Vec<String> {
    let mut required = BTreeSet::new();
    required.insert(action.to_string());

    match request {
        ActionRequest::Bulk(items) => {
            for item in items {
                required.insert(item.op.required_permission().to_string());
            }
        }
        ActionRequest::AliasesUpdate(alias_actions) => {
            for alias_action in alias_actions {
                if matches!(alias_action, AliasAction::RemoveIndex { .. }) {
                    required.insert(actions::ADMIN_DELETE.to_string());
                }
            }
        }
        ActionRequest::CreateIndex { aliases, .. } if !aliases.is_empty() => {
            required.insert(actions::ADMIN_ALIASES.to_string());
        }
        ActionRequest::ClusterSearchShards(_) => {
            required.insert(actions::READ_SEARCH.to_string());
        }
        ActionRequest::SnapshotRestore(_) if check_restore_write_privileges => {
            for permission in actions::RESTORE_WRITE_PRIVILEGES {
                required.insert((*permission).to_string());
            }
        }
        _ => {}
    }

    if required.len() > 1 {
        debug!(?required, "additional permissions required");
    }

    required.into_iter().collect()
}

/// Restrict the snapshot's index list to the requested patterns.
fn filter_snapshot_indices(available: &[String], requested: &[String]) -> Vec<String> {
    if requested.is_empty() || requested.iter().any(|r| r == ALL || r == "*") {
        return available.to_vec();
    }
    available
        .iter()
        .filter(|index| matcher::match_any(requested, index.as_str()))
        .cloned()
        .collect()
}

/// Apply the restore rename substitution to each index name.
fn renamed_indices(spec: &RestoreSpec, indices: &[String]) -> Vec<String> {
    let (Some(pattern), Some(replacement)) = (&spec.rename_pattern, &spec.rename_replacement) else {
        return indices.to_vec();
    };

    match Regex::new(pattern) {
        Ok(regex) => indices
            .iter()
            .map(|index| regex.replace_all(index, replacement.as_str()).into_owned())
            .collect(),
        Err(e) => {
            warn!(pattern = pattern.as_str(), error = %e, "invalid rename pattern, names left unchanged");
            indices.to_vec()
        }
    }
}
