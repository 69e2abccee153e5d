//! Step dispatch across a feature run.
//!
//! Covers unresolvable steps, stop-at-first-failure, per-scenario state reset,
//! and isolation between scenarios of one feature.

use meshcheck_scenario::{ScenarioOutcome, StepError};

use crate::helpers::cluster::*;
use crate::helpers::features::*;

/// `check` reports every step without a definition, without running anything.
#[test]
fn test_e2e_check_lists_undefined_steps() {
    let cluster = MockCluster::healthy();
    let f = feature(
        "Typos",
        vec![
            scenario(
                "one",
                vec![
                    given("a juju model with istio-k8s deployed"),
                    when("productpage teleports to details"),
                ],
            ),
            scenario("two", vec![then("all charms are purple")]),
        ],
    );

    let errors = cluster.feature_runner().check(&f);

    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(e, StepError::Undefined { .. })));
    assert!(cluster.runner.calls().is_empty());
}

/// A keyword mismatch is undefined too: `Given` text is not found under `Then`.
#[test]
fn test_e2e_keyword_scopes_resolution() {
    let cluster = MockCluster::healthy();
    let f = feature(
        "Keywords",
        vec![scenario(
            "wrong keyword",
            vec![then("a juju model for bookinfo services")],
        )],
    );

    let errors = cluster.feature_runner().check(&f);

    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].to_string(),
        "undefined step: Then a juju model for bookinfo services"
    );
}

/// First failing step ends the scenario; later steps never run.
#[tokio::test(start_paused = true)]
async fn test_e2e_undefined_step_stops_scenario() {
    let cluster = MockCluster::healthy();
    let f = feature(
        "Stop",
        vec![scenario(
            "stops",
            vec![
                given("a juju model for bookinfo services"),
                when("productpage teleports to details"),
                given("a juju model with istio-k8s deployed"),
            ],
        )],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    let s = &report.scenarios[0];
    assert_eq!(s.steps_run, 2);
    assert_eq!(s.steps_total, 3);
    assert_eq!(
        s.outcome,
        ScenarioOutcome::Failed {
            step: "When productpage teleports to details".to_owned(),
            error: "undefined step: When productpage teleports to details".to_owned(),
        }
    );
    assert!(cluster.runner.calls_matching("terraform").is_empty());
}

/// Provisioning failure fails that scenario only; the next one still runs.
#[tokio::test(start_paused = true)]
async fn test_e2e_failed_scenario_does_not_stop_feature() {
    let cluster = MockCluster::healthy();
    cluster.runner.on_fail(
        &format!("terraform apply -state={STATE_DIR}/istio-{ISTIO_SYSTEM}.tfstate"),
        1,
        "Error: Unable to create application",
    );

    let f = feature(
        "Isolation",
        vec![
            scenario("broken", vec![given("a juju model with istio-k8s deployed")]),
            scenario("fine", vec![then("all charms are active")]),
        ],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    match &report.scenarios[0].outcome {
        ScenarioOutcome::Failed { error, .. } => {
            assert!(error.contains("Unable to create application"), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(report.scenarios[1].outcome, ScenarioOutcome::Passed);
    assert_eq!((report.passed(), report.failed()), (1, 1));
}

/// A probe result from one scenario is not visible to the next.
#[tokio::test(start_paused = true)]
async fn test_e2e_last_request_is_scenario_scoped() {
    let cluster = MockCluster::healthy();
    cluster.runner.on_ok(
        "juju exec http://details:9080/details/0",
        &probe_stdout(DETAILS_BODY, 200),
    );

    let f = feature(
        "Scope",
        vec![
            scenario(
                "sends",
                vec![
                    when("productpage calls the details service"),
                    then("the request succeeds"),
                ],
            ),
            scenario("reads", vec![then("the request succeeds")]),
        ],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Passed);
    match &report.scenarios[1].outcome {
        ScenarioOutcome::Failed { error, .. } => {
            assert_eq!(error, "assertion failed: no request result found");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_ne!(report.scenarios[0].run_id, report.scenarios[1].run_id);
}

/// Config for an unknown charm is rejected instead of silently ignored.
#[tokio::test(start_paused = true)]
async fn test_e2e_unknown_charm_config_fails() {
    let cluster = MockCluster::healthy();
    let f = feature(
        "Config",
        vec![scenario(
            "unknown charm",
            vec![given("prometheus-k8s has retention set to 1d")],
        )],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    match &report.scenarios[0].outcome {
        ScenarioOutcome::Failed { error, .. } => {
            assert!(error.contains("prometheus-k8s"), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(cluster.runner.calls().is_empty());
}

/// Scaling applies the unit count and then waits for convergence.
#[tokio::test(start_paused = true)]
async fn test_e2e_scale_then_settle() {
    let cluster = MockCluster::healthy();
    let f = feature(
        "Scale",
        vec![scenario(
            "scale",
            vec![when("you scale reviews to 3 units")],
        )],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert!(report.is_success(), "{report:?}");
    let apply = &cluster.applies_for(&format!("bookinfo-{BOOKINFO}"))[0];
    assert_eq!(apply.env_value("TF_VAR_reviews"), Some(r#"{"units":3}"#));
    assert!(!cluster
        .runner
        .calls_matching(&format!("juju status --model {BOOKINFO}"))
        .is_empty());
}

/// Repeated config steps on one charm extend its options within a scenario;
/// the next scenario starts from an empty set.
#[tokio::test(start_paused = true)]
async fn test_e2e_charm_config_accumulates_then_resets() {
    let cluster = MockCluster::healthy();

    let mut first = mesh_background();
    first.extend([
        given("istio-beacon-k8s has a set to 1"),
        given("istio-beacon-k8s has b set to 2"),
    ]);
    let mut second = mesh_background();
    second.push(given("istio-beacon-k8s has c set to 3"));
    let f = feature(
        "Config accumulation",
        vec![scenario("accumulates", first), scenario("starts empty", second)],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;
    assert!(report.is_success(), "{report:?}");

    let beacon = cluster.applies_for(&format!("istio-beacon-{BOOKINFO}"));
    let configs: Vec<Option<&str>> = beacon
        .iter()
        .map(|apply| apply.env_value("TF_VAR_config"))
        .collect();
    assert_eq!(
        configs,
        vec![
            None,
            Some(r#"{"a":"1"}"#),
            Some(r#"{"a":"1","b":"2"}"#),
            None,
            Some(r#"{"c":"3"}"#),
        ]
    );
}
