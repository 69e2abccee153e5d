//! Expected-failure tagging.

use meshcheck_scenario::ScenarioOutcome;

use crate::helpers::cluster::*;
use crate::helpers::features::*;

/// Tagged failing scenario -> xfailed, and the run still succeeds.
#[tokio::test(start_paused = true)]
async fn test_e2e_xfail_scenario_failure_is_expected() {
    let cluster = MockCluster::healthy();
    let f = feature(
        "Known issues",
        vec![tagged(
            scenario("no request yet", vec![then("the request succeeds")]),
            "@xfail:requests are not recorded yet",
        )],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    match &report.scenarios[0].outcome {
        ScenarioOutcome::XFailed { reason, step, .. } => {
            assert_eq!(reason, "requests are not recorded yet");
            assert_eq!(step, "Then the request succeeds");
        }
        other => panic!("expected xfail, got {other:?}"),
    }
    assert!(report.is_success());
    assert_eq!(report.xfailed(), 1);
}

/// Feature-level tag is inherited; a passing scenario becomes xpassed.
#[tokio::test(start_paused = true)]
async fn test_e2e_feature_xfail_tag_is_inherited() {
    let cluster = MockCluster::healthy();
    let mut f = feature(
        "Known issues",
        vec![
            scenario("passes", vec![then("all charms are active")]),
            scenario("fails", vec![then("the request is forbidden")]),
        ],
    );
    f.tags.push("xfail".to_owned());

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert_eq!(
        report.scenarios[0].outcome,
        ScenarioOutcome::XPassed {
            reason: String::new()
        }
    );
    assert_eq!(report.scenarios[1].outcome.label(), "xfailed");
    assert!(report.is_success());
    assert_eq!((report.xpassed(), report.xfailed()), (1, 1));
}

/// Untagged scenarios are unaffected by other scenarios' tags.
#[tokio::test(start_paused = true)]
async fn test_e2e_xfail_tag_is_per_scenario() {
    let cluster = MockCluster::healthy();
    let f = feature(
        "Mixed",
        vec![
            tagged(
                scenario("expected", vec![then("the request succeeds")]),
                "xfail:flaky",
            ),
            scenario("unexpected", vec![then("the request succeeds")]),
        ],
    );

    let report = cluster.feature_runner().run_feature(&f, module()).await;

    assert_eq!(report.scenarios[0].outcome.label(), "xfailed");
    assert_eq!(report.scenarios[1].outcome.label(), "failed");
    assert!(!report.is_success());
}
