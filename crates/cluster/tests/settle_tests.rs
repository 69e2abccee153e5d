//! 수렴 대기 통합 테스트
//!
//! 롤아웃 중 흔들리는 모델이 세 단계를 통과하는 전체 흐름을 검증합니다.

use std::sync::Arc;

use meshcheck_cluster::{ClusterError, ConvergencePoller, JujuCli, WaitPhase};
use meshcheck_core::config::ConvergenceConfig;
use meshcheck_core::process::MockRunner;
use meshcheck_core::types::Environment;

fn status(app: &str, workload: &str, agent: &str) -> String {
    format!(
        r#"{{"applications": {{"{app}": {{
            "application-status": {{"current": "{workload}"}},
            "units": {{"{app}/0": {{
                "workload-status": {{"current": "{workload}"}},
                "juju-status": {{"current": "{agent}"}}
            }}}}
        }}}}}}"#
    )
}

fn poller(runner: &Arc<MockRunner>) -> ConvergencePoller {
    ConvergencePoller::new(
        JujuCli::new(runner.clone(), "juju"),
        ConvergenceConfig::default(),
    )
}

#[tokio::test(start_paused = true)]
async fn flapping_rollout_eventually_settles() {
    let runner = Arc::new(MockRunner::new());
    let maintenance = status("istio-k8s", "maintenance", "executing");
    let active_busy = status("istio-k8s", "active", "executing");
    let settled = status("istio-k8s", "active", "idle");
    for sample in [
        &maintenance,
        &active_busy,
        &active_busy,
        &maintenance,
        &active_busy,
        &active_busy,
        &active_busy,
        &active_busy,
        &active_busy,
    ] {
        runner.on_ok("juju status", sample);
    }
    runner.on_ok("juju status", &settled);

    let env = Environment::new("istio-system-3c9d");
    poller(&runner).settle(&[&env]).await.unwrap();

    // bulk: 9 samples (streak broken once), gate: 3, idle: 3
    assert_eq!(runner.calls().len(), 9 + 3 + 3);
}

#[tokio::test(start_paused = true)]
async fn blocked_model_times_out_in_bulk_phase() {
    let runner = Arc::new(MockRunner::new());
    runner.on_ok("juju status", &status("details", "blocked", "idle"));

    let env = Environment::new("bookinfo-1");
    let err = poller(&runner).settle(&[&env]).await.unwrap_err();

    match err {
        ClusterError::ConvergenceTimeout {
            model,
            phase,
            timeout_secs,
            ..
        } => {
            assert_eq!(model, "bookinfo-1");
            assert_eq!(phase, WaitPhase::BulkSettle);
            assert_eq!(timeout_secs, 20 * 60);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn error_after_bulk_settle_is_detected_in_agent_phase() {
    let runner = Arc::new(MockRunner::new());
    let settled = status("details", "active", "executing");
    // bulk 5 + gate 3 samples active, then the unit errors
    for _ in 0..8 {
        runner.on_ok("juju status", &settled);
    }
    runner.on_ok("juju status", &status("details", "error", "idle"));

    let env = Environment::new("bookinfo-2");
    let err = poller(&runner).settle(&[&env]).await.unwrap_err();
    assert!(matches!(
        err,
        ClusterError::ConvergenceErrorDetected {
            phase: WaitPhase::AgentIdle,
            ..
        }
    ));
}
