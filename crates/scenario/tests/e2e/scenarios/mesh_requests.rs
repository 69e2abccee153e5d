//! In-mesh requests between bookinfo services.
//!
//! Deploys the control plane and bookinfo with beacon integration, then probes
//! from the productpage leader unit and checks the recorded outcome.

use meshcheck_scenario::ScenarioOutcome;

use crate::helpers::cluster::*;
use crate::helpers::features::*;

const DETAILS_URL: &str = "http://details/details/0";

/// Allowed request -> exit 0 with `HTTP_CODE:200`.
#[tokio::test(start_paused = true)]
async fn test_e2e_productpage_reaches_details() {
    let cluster = MockCluster::healthy();
    cluster
        .runner
        .on_ok(&format!("juju exec {DETAILS_URL}"), &probe_stdout(DETAILS_BODY, 200));

    let mut steps = mesh_background();
    steps.push(when("productpage requests GET /details/0 on details"));
    steps.push(then("the request succeeds"));
    let f = feature("Service mesh", vec![scenario("allowed request", steps)]);

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert!(report.is_success(), "{report:?}");
    assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Passed);
    assert_eq!(report.scenarios[0].steps_run, 5);

    let probe = &cluster.probes_to(DETAILS_URL)[0];
    assert_eq!(probe.program, "juju");
    assert_eq!(
        &probe.args[..6],
        &["exec", "--model", BOOKINFO, "--unit", "productpage/0", "--"]
    );
}

/// Denied request -> exit 0 with `HTTP_CODE:403`; "succeeds" must fail.
#[tokio::test(start_paused = true)]
async fn test_e2e_denied_request_is_forbidden_not_successful() {
    let cluster = MockCluster::healthy();
    cluster
        .runner
        .on_ok(&format!("juju exec {DETAILS_URL}"), &probe_stdout("RBAC: access denied", 403));

    let request = when("productpage requests GET /details/0 on details");
    let mut forbidden = mesh_background();
    forbidden.extend([request.clone(), then("the request is forbidden")]);
    let mut succeeds = mesh_background();
    succeeds.extend([request, then("the request succeeds")]);
    let f = feature(
        "Authorization",
        vec![
            scenario("denied request is forbidden", forbidden),
            scenario("denied request does not succeed", succeeds),
        ],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Passed);
    match &report.scenarios[1].outcome {
        ScenarioOutcome::Failed { step, error } => {
            assert_eq!(step, "Then the request succeeds");
            assert!(error.contains("200"), "{error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!report.is_success());
}

/// Probe command exiting 1 -> "rejected" holds without an HTTP marker.
#[tokio::test(start_paused = true)]
async fn test_e2e_rejected_request_matches_exit_code_one() {
    let cluster = MockCluster::healthy();
    cluster
        .runner
        .on_fail(&format!("juju exec {DETAILS_URL}"), 1, "connection reset by peer");

    let mut steps = mesh_background();
    steps.extend([
        when("productpage requests GET /details/0 on details"),
        then("the request is rejected"),
    ]);
    let f = feature("Rejection", vec![scenario("rejected", steps)]);

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Passed);
}

/// Fixed details call -> response body carries book fields.
#[tokio::test(start_paused = true)]
async fn test_e2e_details_returns_book_information() {
    let cluster = MockCluster::healthy();
    cluster.runner.on_ok(
        "juju exec http://details:9080/details/0",
        &probe_stdout(DETAILS_BODY, 200),
    );

    let mut steps = mesh_background();
    steps.extend([
        when("productpage calls the details service"),
        then("the request succeeds"),
        then("details returns valid book information"),
    ]);
    let f = feature("Details", vec![scenario("book info", steps)]);

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert_eq!(report.scenarios[0].outcome, ScenarioOutcome::Passed);
}

/// Beacon integration wires the beacon outputs into the bookinfo deployment.
#[tokio::test(start_paused = true)]
async fn test_e2e_mesh_deploy_passes_beacon_outputs_to_bookinfo() {
    let cluster = MockCluster::healthy();
    let f = feature("Deploy", vec![scenario("deploy", mesh_background())]);

    let report = cluster.feature_runner().run_feature(&f, module()).await;
    assert!(report.is_success(), "{report:?}");

    let istio = cluster.applies_for(&format!("istio-{ISTIO_SYSTEM}"));
    assert_eq!(istio.len(), 1);
    assert_eq!(istio[0].env_value("TF_VAR_model"), Some(ISTIO_SYSTEM));

    let bookinfo = cluster.applies_for(&format!("bookinfo-{BOOKINFO}"));
    assert_eq!(bookinfo.len(), 1);
    assert_eq!(bookinfo[0].env_value("TF_VAR_beacon_app_name"), Some("istio-beacon-k8s"));
    assert_eq!(
        bookinfo[0].env_value("TF_VAR_beacon_service_mesh_endpoint"),
        Some("service-mesh")
    );
}

/// Mesh flag is case-insensitive; anything else deploys bookinfo alone.
#[tokio::test(start_paused = true)]
async fn test_e2e_mesh_flag_controls_beacon_deploy() {
    let cluster = MockCluster::healthy();
    let f = feature(
        "Mesh flag",
        vec![
            scenario(
                "without mesh",
                vec![when("you deploy the bookinfo services without mesh")],
            ),
            scenario(
                "with mesh",
                vec![when("you deploy the bookinfo services WITH ISTIO-BEACON-K8S INTEGRATION")],
            ),
        ],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;
    assert!(report.is_success(), "{report:?}");

    let beacon = cluster.applies_for(&format!("istio-beacon-{BOOKINFO}"));
    assert_eq!(beacon.len(), 1);
    let bookinfo = cluster.applies_for(&format!("bookinfo-{BOOKINFO}"));
    assert_eq!(bookinfo.len(), 2);
    assert_eq!(bookinfo[0].env_value("TF_VAR_beacon_app_name"), None);
    assert_eq!(bookinfo[1].env_value("TF_VAR_beacon_app_name"), Some("istio-beacon-k8s"));
}
