//! Configuration snapshot building and publication
//!
//! All derived tables (role table, role-mapping index, tenant table, group
//! expansions) are rebuilt together off to the side and published with one
//! atomic pointer swap. Readers load the current snapshot once per
//! evaluation call and can never observe a torn mix of old and new
//! configuration. Writers serialize at the publish point; readers never
//! block.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::authz::action_groups::ActionGroupExpander;
use crate::authz::role_mapping::RoleMappingIndex;
use crate::authz::roles::RoleTable;
use crate::authz::tenants::TenantTable;
use crate::config::models::{DynamicSettings, RoleMappingSpec, RoleSpec, TenantSpec};
use crate::utils::error::{AuthzError, Result};

/// The raw configuration bundle a host's configuration repository delivers.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default)]
    pub roles: BTreeMap<String, RoleSpec>,
    #[serde(default)]
    pub action_groups: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub role_mappings: BTreeMap<String, RoleMappingSpec>,
    #[serde(default)]
    pub tenants: BTreeMap<String, TenantSpec>,
    #[serde(default)]
    pub dynamic: DynamicSettings,
}

impl ConfigSnapshot {
    /// Content fingerprint used for idempotent redelivery detection.
    fn fingerprint(&self) -> Result<u64> {
        let canonical = serde_json::to_string(self)
            .map_err(|e| AuthzError::Config(format!("cannot fingerprint configuration: {e}")))?;
        let mut hasher = DefaultHasher::new();
        canonical.hash(&mut hasher);
        Ok(hasher.finish())
    }
}

/// One published, fully derived configuration state.
#[derive(Debug)]
pub struct EngineSnapshot {
    pub(crate) version: u64,
    pub(crate) fingerprint: u64,
    pub(crate) role_table: RoleTable,
    pub(crate) role_mappings: RoleMappingIndex,
    pub(crate) tenant_table: TenantTable,
    pub(crate) tenant_names: BTreeSet<String>,
    pub(crate) dynamic: DynamicSettings,
}

impl EngineSnapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn dynamic(&self) -> &DynamicSettings {
        &self.dynamic
    }

    /// Names of all configured tenants.
    pub fn tenant_names(&self) -> &BTreeSet<String> {
        &self.tenant_names
    }
}

/// Owns the current snapshot pointer.
#[derive(Default)]
pub struct SnapshotPublisher {
    current: ArcSwapOption<EngineSnapshot>,
    version: AtomicU64,
    publish_lock: Mutex<()>,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and publish the derived state for a configuration bundle.
    ///
    /// Idempotent-safe: redelivery of an unchanged bundle is a no-op. On
    /// any build failure the previous snapshot stays authoritative.
    pub fn on_config_changed(&self, config: &ConfigSnapshot) -> Result<()> {
        config.dynamic.validate().map_err(AuthzError::Config)?;
        let fingerprint = config.fingerprint()?;

        let _publishing = self.publish_lock.lock();

        if let Some(current) = self.current.load_full() {
            if current.fingerprint == fingerprint {
                debug!(version = current.version, "configuration unchanged, skipping rebuild");
                return Ok(());
            }
        }

        let expander = ActionGroupExpander::new(config.action_groups.clone());
        let role_table = RoleTable::compile(&config.roles, &expander);
        let role_mappings = RoleMappingIndex::compile(&config.role_mappings);
        let tenant_table = TenantTable::build(
            &role_table,
            Duration::from_millis(config.dynamic.tenant_rebuild_timeout_ms),
        )?;
        let tenant_names: BTreeSet<String> = config.tenants.keys().cloned().collect();

        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = EngineSnapshot {
            version,
            fingerprint,
            role_table,
            role_mappings,
            tenant_table,
            tenant_names,
            dynamic: config.dynamic.clone(),
        };

        self.current.store(Some(Arc::new(snapshot)));
        info!(version, roles = config.roles.len(), "configuration snapshot published");
        Ok(())
    }

    /// The current snapshot, or `None` before the first publish.
    pub fn load(&self) -> Option<Arc<EngineSnapshot>> {
        self.current.load_full()
    }

    pub fn is_initialized(&self) -> bool {
        self.current.load().is_some()
    }
}
