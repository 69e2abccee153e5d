//! Beacon authorization-policy management mode.
//!
//! Redeploys the beacon with `manage-authorization-policies` and checks the
//! policies present in the bookinfo namespace.

use meshcheck_scenario::ScenarioOutcome;

use crate::helpers::cluster::*;
use crate::helpers::features::*;

const POLICY_QUERY: &str = "kubectl get authorizationpolicies.security.istio.io";

/// Managed mode off -> the namespace has no authorization policies.
#[tokio::test(start_paused = true)]
async fn test_e2e_unmanaged_beacon_creates_no_policies() {
    let cluster = MockCluster::healthy();
    cluster.runner.on_ok(POLICY_QUERY, r#"{"items": []}"#);

    let mut steps = mesh_background();
    steps.extend([
        given("istio-beacon-k8s has manage-authorization-policies set to false"),
        then("istio-beacon-k8s has not created authorization policies"),
    ]);
    let f = feature("Managed mode", vec![scenario("unmanaged", steps)]);

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Passed);
    let query = &cluster.runner.calls_matching(POLICY_QUERY)[0];
    assert_eq!(
        query.args,
        vec![
            "get",
            "authorizationpolicies.security.istio.io",
            "-n",
            BOOKINFO,
            "-o",
            "json"
        ]
    );
}

/// Managed mode on -> policies exist; "not created" fails.
#[tokio::test(start_paused = true)]
async fn test_e2e_managed_beacon_creates_policies() {
    let cluster = MockCluster::healthy();
    cluster.runner.on_ok(
        POLICY_QUERY,
        r#"{"items": [{"metadata": {"name": "productpage-to-details"}}]}"#,
    );

    let managed = given("istio-beacon-k8s has manage-authorization-policies set to true");
    let mut created = mesh_background();
    created.extend([
        managed.clone(),
        then("istio-beacon-k8s has created authorization policies"),
    ]);
    let mut not_created = mesh_background();
    not_created.extend([
        managed,
        then("istio-beacon-k8s has not created authorization policies"),
    ]);
    let f = feature(
        "Managed mode",
        vec![
            scenario("created", created),
            scenario("not created", not_created),
        ],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Passed);
    match &report.scenarios[1].outcome {
        ScenarioOutcome::Failed { error, .. } => {
            assert!(error.contains("productpage-to-details"), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

/// The managed-mode redeploy carries only that option, not the scenario's
/// accumulated beacon settings.
#[tokio::test(start_paused = true)]
async fn test_e2e_managed_mode_ignores_accumulated_beacon_config() {
    let cluster = MockCluster::healthy();
    cluster.runner.on_ok(POLICY_QUERY, r#"{"items": []}"#);

    let mut steps = mesh_background();
    steps.extend([
        given("istio-beacon-k8s has model-on-mesh set to true"),
        given("istio-beacon-k8s has manage-authorization-policies set to false"),
    ]);
    let f = feature("Managed mode", vec![scenario("config isolation", steps)]);

    let report = cluster.feature_runner().run_feature(&f, module()).await;
    assert!(report.is_success(), "{report:?}");

    let beacon = cluster.applies_for(&format!("istio-beacon-{BOOKINFO}"));
    assert_eq!(beacon.len(), 3);
    assert_eq!(beacon[0].env_value("TF_VAR_config"), None);
    assert_eq!(
        beacon[1].env_value("TF_VAR_config"),
        Some(r#"{"model-on-mesh":"true"}"#)
    );
    assert_eq!(
        beacon[2].env_value("TF_VAR_config"),
        Some(r#"{"manage-authorization-policies":"false"}"#)
    );
}

/// A failing policy query is treated as "no policies".
#[tokio::test(start_paused = true)]
async fn test_e2e_policy_query_failure_reads_as_empty() {
    let cluster = MockCluster::healthy();
    cluster.runner.on_fail(
        POLICY_QUERY,
        1,
        "error: the server doesn't have a resource type \"authorizationpolicies\"",
    );

    let f = feature(
        "Query failure",
        vec![
            scenario(
                "not created",
                vec![then("istio-beacon-k8s has not created authorization policies")],
            ),
            scenario(
                "created",
                vec![then("istio-beacon-k8s has created authorization policies")],
            ),
        ],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Passed);
    assert!(report.scenarios[1].outcome.is_failure());
}
