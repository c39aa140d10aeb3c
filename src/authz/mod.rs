//! The authorization engine
//!
//! Leaf-first: pattern matching, value types and the request model at the
//! bottom; role/tenant tables in the middle; the evaluator on top.

pub mod action_groups;
pub mod actions;
pub mod audit;
pub mod evaluator;
pub mod filtered_alias;
pub mod interceptor;
pub mod matcher;
pub mod request;
pub mod resource;
pub mod role_mapping;
pub mod roles;
pub mod tenants;
pub mod types;

// Re-export the main surface
pub use audit::{AuditSink, NoopAuditSink};
pub use evaluator::{EvaluationContext, PrivilegeEvaluator};
pub use filtered_alias::AliasCheck;
pub use interceptor::{InterceptorDecision, NoopInterceptor, PrivilegesInterceptor};
pub use request::{ActionRequest, AliasAction, BulkItem, BulkOp, IndexSpec, RestoreSpec};
pub use resource::{Resolved, ResolvedIndices, ResourceResolver};
pub use role_mapping::RoleMappingIndex;
pub use roles::{RoleTable, RoleView};
pub use tenants::TenantTable;
pub use types::{
    AccessLevel, FilterEcho, FilterMap, PrivilegeDecision, Principal, ResourceAction, ResourceRef,
    SourceAddress, ALL, GLOBAL_TENANT, PRIVATE_TENANT,
};
