//! Tenant permission tables
//!
//! Tenants are named data partitions with their own read-only/read-write
//! access control, independent of index-level permissions. The table is
//! rebuilt on every configuration change; extraction fans out over a
//! bounded worker pool and the build is abandoned (previous snapshot stays
//! authoritative) if workers do not finish within the deadline.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel;
use tracing::{debug, error};

use crate::authz::matcher;
use crate::authz::roles::{CompiledRole, RoleTable};
use crate::authz::types::{Principal, GLOBAL_TENANT, PRIVATE_TENANT};
use crate::utils::error::{AuthzError, Result};

/// Permission patterns granted by read-write tenant access.
static RW_PATTERNS: &[&str] = &["indexguard:tenant:*"];
/// Permission patterns granted by read-only tenant access.
static RO_PATTERNS: &[&str] = &["indexguard:tenant:read/*"];

/// Per-role tenant access entries for one configuration snapshot.
#[derive(Debug, Clone, Default)]
pub struct TenantTable {
    /// role name -> (tenant, read-write?)
    entries: BTreeMap<String, Vec<(String, bool)>>,
}

impl TenantTable {
    /// Build the table by fanning per-role extraction out to a worker pool.
    ///
    /// The wait is bounded: on timeout or a worker failure the build is
    /// aborted with an error so the caller keeps the previous snapshot
    /// instead of publishing a partial table.
    pub fn build(roles: &RoleTable, timeout: Duration) -> Result<Self> {
        if roles.is_empty() {
            return Ok(Self::default());
        }

        let workers = num_cpus::get().min(roles.len()).max(1);
        let (work_tx, work_rx) = channel::unbounded::<Arc<CompiledRole>>();
        let (result_tx, result_rx) = channel::unbounded::<(String, Vec<(String, bool)>)>();

        for _ in 0..workers {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            std::thread::spawn(move || {
                while let Ok(role) = work_rx.recv() {
                    let tenants: Vec<(String, bool)> = role
                        .tenants
                        .iter()
                        .map(|(tenant, level)| (tenant.clone(), level.is_read_write()))
                        .collect();
                    if result_tx.send((role.name.clone(), tenants)).is_err() {
                        // collector gave up; nothing left to do
                        return;
                    }
                }
            });
        }
        drop(work_rx);
        drop(result_tx);

        let expected = roles.len();
        for role in roles.iter() {
            work_tx
                .send(Arc::clone(role))
                .map_err(|_| AuthzError::RebuildFailed("tenant worker pool unavailable".to_string()))?;
        }
        drop(work_tx);

        let deadline = Instant::now() + timeout;
        let mut entries = BTreeMap::new();
        for _ in 0..expected {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match result_rx.recv_timeout(remaining) {
                Ok((role, tenants)) => {
                    entries.insert(role, tenants);
                }
                Err(channel::RecvTimeoutError::Timeout) => {
                    error!("tenant table rebuild timed out, keeping previous snapshot");
                    return Err(AuthzError::RebuildTimeout { waited_ms: timeout.as_millis() as u64 });
                }
                Err(channel::RecvTimeoutError::Disconnected) => {
                    error!("tenant table rebuild worker failed, keeping previous snapshot");
                    return Err(AuthzError::RebuildFailed("worker pool disconnected".to_string()));
                }
            }
        }

        debug!(roles = entries.len(), "tenant table rebuilt");
        Ok(Self { entries })
    }

    /// Map a principal's roles to the tenants it can address.
    ///
    /// The principal's own name is always present mapped to read-write (a
    /// user owns its private tenant); read-write dominates read-only when
    /// the same tenant appears under multiple roles.
    pub fn map_tenants(&self, principal: &Principal, roles: &BTreeSet<String>) -> BTreeMap<String, bool> {
        let mut result = BTreeMap::new();
        result.insert(principal.name.clone(), true);

        for role in roles {
            let Some(tenants) = self.entries.get(role) else { continue };
            for (tenant, read_write) in tenants {
                if tenant == &principal.name {
                    continue;
                }
                // RW outperforms RO regardless of iteration order
                if *read_write || !result.contains_key(tenant) {
                    result.insert(tenant.clone(), *read_write);
                }
            }
        }

        result
    }

    /// Check a tenant-scoped permission for the principal's requested
    /// tenant, falling back to the global tenant when multi-tenancy is off
    /// or no tenant was requested.
    pub fn has_tenant_permission(
        &self,
        principal: &Principal,
        roles: &BTreeSet<String>,
        permission: &str,
        multitenancy_enabled: bool,
    ) -> bool {
        let tenants = self.map_tenants(principal, roles);
        let requested = requested_tenant(principal, multitenancy_enabled);

        match tenants.get(requested.as_str()).copied() {
            None => false,
            Some(true) => matcher::match_any(RW_PATTERNS, permission),
            Some(false) => matcher::match_any(RO_PATTERNS, permission),
        }
    }

    /// Evaluate a batch of application privileges against the requested
    /// tenant's granted pattern set.
    pub fn application_privileges(
        &self,
        principal: &Principal,
        roles: &BTreeSet<String>,
        privileges: &[String],
        multitenancy_enabled: bool,
    ) -> BTreeMap<String, bool> {
        let tenants = self.map_tenants(principal, roles);
        let requested = requested_tenant(principal, multitenancy_enabled);
        let granted: &[&str] = match tenants.get(requested.as_str()).copied() {
            None => &[],
            Some(true) => RW_PATTERNS,
            Some(false) => RO_PATTERNS,
        };

        privileges
            .iter()
            .map(|p| (p.clone(), matcher::match_any(granted, p)))
            .collect()
    }
}

fn requested_tenant(principal: &Principal, multitenancy_enabled: bool) -> String {
    if !multitenancy_enabled {
        return GLOBAL_TENANT.to_string();
    }
    match principal.requested_tenant.as_deref() {
        None | Some("") => GLOBAL_TENANT.to_string(),
        Some(PRIVATE_TENANT) => principal.name.clone(),
        Some(tenant) => tenant.to_string(),
    }
}
