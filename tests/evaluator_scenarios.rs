//! End-to-end tests against the public crate surface
//!
//! These exercise the engine the way a host embeds it: YAML configuration
//! documents in, decisions out, with concurrent evaluation during reloads.

use std::sync::Arc;

use indexguard::authz::matcher;
use indexguard::{
    ActionRequest, AuthzError, ConfigSnapshot, EvaluationContext, FilterEcho, IndexSpec,
    PrivilegeEvaluator, Principal, ResourceResolver,
};

const CONCRETE_INDICES: &[&str] = &["logs-2024-01", "logs-2024-02", "reports-1", "secret-1"];

struct Catalog;

impl ResourceResolver for Catalog {
    fn concrete_index_names(&self, pattern: &str) -> Vec<String> {
        CONCRETE_INDICES
            .iter()
            .filter(|name| matcher::matches(pattern, name))
            .map(|name| name.to_string())
            .collect()
    }

    fn has_index_or_alias(&self, name: &str) -> bool {
        CONCRETE_INDICES.contains(&name)
    }
}

const CONFIG: &str = r#"
action_groups:
  READ:
    - "indices:data/read/*"
roles:
  analysts:
    indices:
      "logs-*":
        "*":
          - READ
        _dls_: '{"term":{"visibility":"public"}}'
  report_owner:
    indices:
      "reports-${user.name}":
        "*":
          - READ
  finance_team:
    tenants:
      finance: RW
role_mappings:
  analysts:
    backend_roles:
      - analyst
  report_owner:
    users:
      - "*"
  finance_team:
    backend_roles:
      - accounting
tenants:
  finance: {}
"#;

fn engine() -> PrivilegeEvaluator {
    let config: ConfigSnapshot = serde_yaml::from_str(CONFIG).unwrap();
    let evaluator = PrivilegeEvaluator::new(Arc::new(Catalog));
    evaluator.on_config_changed(&config).unwrap();
    evaluator
}

#[test]
fn analyst_search_carries_row_filters() {
    let evaluator = engine();
    let principal = Principal::new("jane").with_backend_roles(["analyst"]);
    let mut request = ActionRequest::Single(IndexSpec::indices(["logs-*"]));

    let decision = evaluator
        .evaluate(&principal, "indices:data/read/search", &mut request, &EvaluationContext::default())
        .unwrap();

    assert!(decision.is_allowed());
    let rows = decision.row_filters().expect("row filters attached");
    assert!(rows["logs-2024-01"].contains(r#"{"term":{"visibility":"public"}}"#));

    // propagating the decision's filters through a sub-request succeeds
    let ctx = EvaluationContext {
        filter_echo: FilterEcho::from_decision(&decision),
        ..Default::default()
    };
    let mut sub_request = ActionRequest::Single(IndexSpec::indices(["logs-*"]));
    let sub = evaluator
        .evaluate(&principal, "indices:data/read/search", &mut sub_request, &ctx)
        .unwrap();
    assert!(sub.is_allowed());
}

#[test]
fn user_template_restricts_to_own_report_index() {
    let evaluator = engine();
    let ctx = EvaluationContext::default();

    // reports-1 belongs to user "1" under the template grant
    let owner = Principal::new("1");
    let mut request = ActionRequest::Single(IndexSpec::indices(["reports-1"]));
    let decision = evaluator
        .evaluate(&owner, "indices:data/read/get", &mut request, &ctx)
        .unwrap();
    assert!(decision.is_allowed());

    let stranger = Principal::new("2");
    let mut request = ActionRequest::Single(IndexSpec::indices(["reports-1"]));
    let decision = evaluator
        .evaluate(&stranger, "indices:data/read/get", &mut request, &ctx)
        .unwrap();
    assert!(!decision.is_allowed());
}

#[test]
fn unauthorized_user_sees_only_forbidden() {
    let evaluator = engine();
    let principal = Principal::new("nobody");
    let mut request = ActionRequest::Single(IndexSpec::indices(["secret-1"]));

    let decision = evaluator
        .evaluate(&principal, "indices:data/read/search", &mut request, &EvaluationContext::default())
        .unwrap();

    assert!(!decision.is_allowed());
    // the decision carries the missing permission for operator logs, nothing
    // about roles or grants
    assert!(decision.missing_permissions().contains("indices:data/read/search"));
}

#[test]
fn dnfof_reload_toggles_behavior() {
    let evaluator = engine();
    let principal = Principal::new("jane").with_backend_roles(["analyst"]);
    let make_request = || ActionRequest::Single(IndexSpec::indices(["logs-2024-01", "secret-1"]));

    let mut request = make_request();
    let decision = evaluator
        .evaluate(&principal, "indices:data/read/search", &mut request, &EvaluationContext::default())
        .unwrap();
    assert!(!decision.is_allowed());

    let mut config: ConfigSnapshot = serde_yaml::from_str(CONFIG).unwrap();
    config.dynamic.do_not_fail_on_forbidden = true;
    evaluator.on_config_changed(&config).unwrap();

    let mut request = make_request();
    let decision = evaluator
        .evaluate(&principal, "indices:data/read/search", &mut request, &EvaluationContext::default())
        .unwrap();
    assert!(decision.is_allowed());
    assert_eq!(decision.config_version(), 2);
    match &request {
        ActionRequest::Single(spec) => assert_eq!(spec.indices, vec!["logs-2024-01"]),
        _ => unreachable!(),
    }
}

#[test]
fn tenant_permissions_through_public_surface() {
    let evaluator = engine();
    let principal = Principal::new("bob")
        .with_backend_roles(["accounting"])
        .with_requested_tenant("finance");

    let mut request = ActionRequest::Opaque;
    let decision = evaluator
        .evaluate(&principal, "indexguard:tenant:write/report", &mut request, &EvaluationContext::default())
        .unwrap();
    assert!(decision.is_allowed());

    let roles = evaluator.map_roles(&principal, None).unwrap();
    let tenants = evaluator.map_tenants(&principal, &roles).unwrap();
    assert_eq!(tenants.get("finance"), Some(&true));

    let privileges = evaluator
        .tenant_application_privileges(
            &principal,
            None,
            &["indexguard:tenant:read/report".to_string()],
        )
        .unwrap();
    assert_eq!(privileges["indexguard:tenant:read/report"], true);
}

#[test]
fn uninitialized_engine_is_an_error_not_a_deny() {
    let evaluator = PrivilegeEvaluator::new(Arc::new(Catalog));
    let result = evaluator.evaluate(
        &Principal::new("x"),
        "indices:data/read/search",
        &mut ActionRequest::Opaque,
        &EvaluationContext::default(),
    );
    assert!(matches!(result, Err(AuthzError::NotInitialized)));
}

#[test]
fn concurrent_evaluation_during_reload() {
    let evaluator = Arc::new(engine());

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let evaluator = Arc::clone(&evaluator);
            scope.spawn(move || {
                let principal = Principal::new("jane").with_backend_roles(["analyst"]);
                for _ in 0..200 {
                    let mut request = ActionRequest::Single(IndexSpec::indices(["logs-2024-01"]));
                    let decision = evaluator
                        .evaluate(
                            &principal,
                            "indices:data/read/search",
                            &mut request,
                            &EvaluationContext::default(),
                        )
                        .unwrap();
                    // every reader sees a complete snapshot, old or new
                    assert!(decision.is_allowed());
                }
            });
        }

        let publisher = Arc::clone(&evaluator);
        scope.spawn(move || {
            for flip in 0..20 {
                let mut config: ConfigSnapshot = serde_yaml::from_str(CONFIG).unwrap();
                config.dynamic.do_not_fail_on_forbidden = flip % 2 == 0;
                publisher.on_config_changed(&config).unwrap();
            }
        });
    });
}
