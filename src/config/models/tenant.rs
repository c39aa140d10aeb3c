//! Tenant configuration documents

use serde::{Deserialize, Serialize};

/// A configured tenant. Access control lives on the roles referencing the
/// tenant; this document only declares existence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantSpec {
    #[serde(default)]
    pub description: String,
}
