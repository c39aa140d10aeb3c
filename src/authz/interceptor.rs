//! Pluggable privileges interceptor
//!
//! An optional collaborator consulted before the main permission paths,
//! used downstream for tenant-index substitution. Absence means the
//! interceptor never has an opinion.

use std::collections::BTreeMap;

use crate::authz::request::ActionRequest;
use crate::authz::resource::Resolved;
use crate::authz::types::Principal;
use crate::config::models::DynamicSettings;

/// Interceptor verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptorDecision {
    /// Short-circuit to allow
    Allow,
    /// Short-circuit to deny
    Deny,
    /// Continue with the regular permission checks
    NoOpinion,
}

/// Optional request-replacement hook.
pub trait PrivilegesInterceptor: Send + Sync {
    fn try_replace(
        &self,
        request: &mut ActionRequest,
        action: &str,
        principal: &Principal,
        settings: &DynamicSettings,
        resolved: &Resolved,
        tenants: &BTreeMap<String, bool>,
    ) -> InterceptorDecision;
}

/// Default interceptor with no opinion on anything.
pub struct NoopInterceptor;

impl PrivilegesInterceptor for NoopInterceptor {
    fn try_replace(
        &self,
        _request: &mut ActionRequest,
        _action: &str,
        _principal: &Principal,
        _settings: &DynamicSettings,
        _resolved: &Resolved,
        _tenants: &BTreeMap<String, bool>,
    ) -> InterceptorDecision {
        InterceptorDecision::NoOpinion
    }
}
