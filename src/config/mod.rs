//! Configuration documents and snapshot publication
//!
//! The engine never parses files itself; hosts deserialize YAML/JSON into
//! the model types here and deliver them as one [`ConfigSnapshot`] bundle.

pub mod models;
pub mod snapshot;

pub use models::{
    DynamicSettings, FilteredAliasMode, IndexGrantSpec, RoleMappingSpec, RoleSpec, TenantSpec,
};
pub use snapshot::{ConfigSnapshot, EngineSnapshot, SnapshotPublisher};
