//! Ingress gateway exposure and external requests.

use meshcheck_scenario::ScenarioOutcome;

use crate::helpers::cluster::*;
use crate::helpers::features::*;

const SERVICES: &str = r#"{"items": [
    {"status": {}},
    {"status": {"loadBalancer": {"ingress": [{"ip": "10.64.140.43"}]}}}
]}"#;

fn ingress_steps() -> Vec<meshcheck_scenario::Step> {
    let mut steps = mesh_background();
    steps.extend([
        given("istio-ingress-k8s is deployed"),
        given("productpage is exposed via ingress"),
        when("external client requests GET /productpage on the ingress gateway"),
        then("the request succeeds"),
    ]);
    steps
}

/// Gateway address + model prefix -> request from the test host.
#[tokio::test(start_paused = true)]
async fn test_e2e_external_request_through_gateway() {
    let cluster = MockCluster::healthy();
    let url = format!("http://10.64.140.43/{BOOKINFO}-productpage/productpage");
    cluster
        .runner
        .on_ok(&format!("kubectl get services -n {BOOKINFO}"), SERVICES)
        .on_ok(&format!("curl {url}"), &probe_stdout("<html>", 200));

    let f = feature("Ingress", vec![scenario("external", ingress_steps())]);
    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Passed, "{report:?}");

    let relate = &cluster.runner.calls_matching("juju relate")[0];
    assert_eq!(
        relate.args,
        vec![
            "relate",
            "--model",
            BOOKINFO,
            "productpage:ingress",
            "istio-ingress-k8s:ingress"
        ]
    );
    let probe = &cluster.probes_to(&url)[0];
    assert_eq!(probe.program, "curl");
}

/// No load balancer address -> the request step fails before probing.
#[tokio::test(start_paused = true)]
async fn test_e2e_missing_gateway_address_fails_step() {
    let cluster = MockCluster::healthy();
    cluster
        .runner
        .on_ok(&format!("kubectl get services -n {BOOKINFO}"), r#"{"items": []}"#);

    let f = feature("Ingress", vec![scenario("no address", ingress_steps())]);
    let report = cluster.feature_runner().run_feature(&f, module()).await;

    match &report.scenarios[0].outcome {
        ScenarioOutcome::Failed { step, .. } => {
            assert_eq!(
                step,
                "When external client requests GET /productpage on the ingress gateway"
            );
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(cluster.runner.calls_matching("curl").is_empty());
}

/// Exposing productpage without a deployed ingress is a state error.
#[tokio::test(start_paused = true)]
async fn test_e2e_expose_without_ingress_fails() {
    let cluster = MockCluster::healthy();
    let f = feature(
        "Ingress",
        vec![scenario(
            "missing ingress",
            vec![given("productpage is exposed via ingress")],
        )],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    match &report.scenarios[0].outcome {
        ScenarioOutcome::Failed { error, .. } => {
            assert_eq!(error, "missing state: ingress app not deployed");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(cluster.runner.calls_matching("juju relate").is_empty());
}
