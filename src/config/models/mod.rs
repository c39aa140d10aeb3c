//! Configuration model types
//!
//! These mirror the documents a host's configuration repository delivers:
//! roles, action groups, role mappings, tenants and the dynamic settings
//! block. All types are plain serde documents; semantics live in the
//! derived tables built by [`crate::config::snapshot`].

mod dynamic;
mod role;
mod role_mapping;
mod tenant;

pub use dynamic::{DynamicSettings, FilteredAliasMode};
pub use role::{IndexGrantSpec, RoleSpec};
pub use role_mapping::RoleMappingSpec;
pub use tenant::TenantSpec;
