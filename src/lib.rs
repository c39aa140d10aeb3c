//! # indexguard
//!
//! Privilege evaluation engine for multi-tenant, multi-index document
//! stores. Given an authenticated principal, a requested action and the
//! concrete resources the action touches, it decides ALLOW/DENY and, when
//! allowed, computes the row filters and column projections that must be
//! attached to the downstream request.
//!
//! The engine is authorization only: authentication, transport, audit
//! delivery and configuration storage are host collaborators behind small
//! trait seams. It holds exactly one piece of shared state, the current
//! configuration snapshot, published by atomic pointer swap, so evaluation
//! calls are safe from any number of threads without locking.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use indexguard::{
//!     ActionRequest, ConfigSnapshot, EvaluationContext, IndexSpec, PrivilegeEvaluator,
//!     Principal, ResourceResolver,
//! };
//!
//! struct Catalog;
//!
//! impl ResourceResolver for Catalog {
//!     fn concrete_index_names(&self, pattern: &str) -> Vec<String> {
//!         vec![pattern.to_string()]
//!     }
//!     fn has_index_or_alias(&self, _name: &str) -> bool {
//!         false
//!     }
//! }
//!
//! fn main() -> indexguard::Result<()> {
//!     let evaluator = PrivilegeEvaluator::new(Arc::new(Catalog));
//!     let document = r#"
//! roles:
//!   logs_reader:
//!     indices:
//!       "logs-*":
//!         "*":
//!           - "indices:data/read/*"
//! role_mappings:
//!   logs_reader:
//!     backend_roles:
//!       - crew
//! "#;
//!     let config: ConfigSnapshot = serde_yaml::from_str(document).unwrap();
//!     evaluator.on_config_changed(&config)?;
//!
//!     let principal = Principal::new("kirk").with_backend_roles(["crew"]);
//!     let mut request = ActionRequest::Single(IndexSpec::indices(["logs-2024"]));
//!     let decision = evaluator.evaluate(
//!         &principal,
//!         "indices:data/read/search",
//!         &mut request,
//!         &EvaluationContext::default(),
//!     )?;
//!
//!     if decision.is_allowed() {
//!         // forward the (possibly narrowed) request, attaching
//!         // decision.row_filters() / decision.column_filters()
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod authz;
pub mod config;
pub mod utils;

// Re-export main types
pub use authz::{
    ActionRequest, AliasAction, AuditSink, BulkItem, BulkOp, EvaluationContext, FilterEcho,
    FilterMap, IndexSpec, InterceptorDecision, NoopAuditSink, NoopInterceptor, PrivilegeDecision,
    PrivilegeEvaluator, PrivilegesInterceptor, Principal, Resolved, ResolvedIndices,
    ResourceResolver, RestoreSpec, SourceAddress,
};
pub use config::{ConfigSnapshot, DynamicSettings, RoleSpec};
pub use utils::error::{AuthzError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
