//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `meshcheck_`
//! - 영역: `tool_`, `convergence_`, `probe_`, `query_`, `scenario_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use meshcheck_core::metrics;
//! use metrics::counter;
//!
//! counter!(metrics::PROBES_TOTAL, metrics::LABEL_RESULT => "success").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 도구 단계 레이블 키 (init, apply, output)
pub const LABEL_PHASE: &str = "phase";

/// 결과 레이블 키 (success, failure, timeout, error)
pub const LABEL_RESULT: &str = "result";

/// 리소스 종류 레이블 키 (istio, istio-beacon, istio-ingress, bookinfo)
pub const LABEL_KIND: &str = "kind";

/// 프로브 위치 레이블 키 (unit, external)
pub const LABEL_LOCATION: &str = "location";

/// 시나리오 결과 레이블 키 (passed, failed, xfailed, xpassed)
pub const LABEL_OUTCOME: &str = "outcome";

// ─── 프로비저닝 도구 메트릭 ─────────────────────────────────────────

/// Tool: 외부 도구 호출 수 (counter, labels: phase, result)
pub const TOOL_INVOCATIONS_TOTAL: &str = "meshcheck_tool_invocations_total";

/// Tool: 외부 도구 호출 소요 시간 (histogram, 초, label: phase)
pub const TOOL_INVOCATION_DURATION_SECONDS: &str = "meshcheck_tool_invocation_duration_seconds";

// ─── 수렴 대기 메트릭 ──────────────────────────────────────────────

/// Convergence: 대기 단계 실행 수 (counter, labels: phase, result)
pub const CONVERGENCE_WAITS_TOTAL: &str = "meshcheck_convergence_waits_total";

/// Convergence: 상태 샘플 수 (counter)
pub const CONVERGENCE_SAMPLES_TOTAL: &str = "meshcheck_convergence_samples_total";

/// Convergence: 대기 단계 소요 시간 (histogram, 초, label: phase)
pub const CONVERGENCE_WAIT_DURATION_SECONDS: &str = "meshcheck_convergence_wait_duration_seconds";

// ─── 프로브 메트릭 ─────────────────────────────────────────────────

/// Probe: 실행된 프로브 수 (counter, labels: location, result)
pub const PROBES_TOTAL: &str = "meshcheck_probes_total";

/// Probe: 스텝 레이어 재시도 수 (counter)
pub const PROBE_RETRIES_TOTAL: &str = "meshcheck_probe_retries_total";

// ─── 클러스터 조회 메트릭 ───────────────────────────────────────────

/// Query: 빈 결과로 대체된 조회 실패 수 (counter)
pub const QUERY_SOFT_FAILURES_TOTAL: &str = "meshcheck_query_soft_failures_total";

// ─── 시나리오 메트릭 ────────────────────────────────────────────────

/// Scenario: 실행된 시나리오 수 (counter, label: outcome)
pub const SCENARIOS_TOTAL: &str = "meshcheck_scenarios_total";

/// Scenario: 실행된 스텝 수 (counter, label: result)
pub const SCENARIO_STEPS_TOTAL: &str = "meshcheck_scenario_steps_total";

// ─── 히스토그램 버킷 정의 ────────────────────────────────────────────

/// 외부 도구 호출 및 수렴 대기 시간 히스토그램 버킷 (초)
///
/// 1s ~ 20min 범위 (apply와 bulk settle 포함)
pub const LONG_OPERATION_BUCKETS: [f64; 9] =
    [1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1200.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더가 설치되지 않은 경우에도 안전하게 호출할 수 있습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        TOOL_INVOCATIONS_TOTAL,
        "Total number of provisioning tool invocations by phase and result"
    );
    describe_histogram!(
        TOOL_INVOCATION_DURATION_SECONDS,
        "Provisioning tool invocation latency in seconds"
    );

    describe_counter!(
        CONVERGENCE_WAITS_TOTAL,
        "Total number of convergence wait phases by phase and result"
    );
    describe_counter!(
        CONVERGENCE_SAMPLES_TOTAL,
        "Total number of environment status samples taken"
    );
    describe_histogram!(
        CONVERGENCE_WAIT_DURATION_SECONDS,
        "Time spent in a convergence wait phase in seconds"
    );

    describe_counter!(
        PROBES_TOTAL,
        "Total number of synthetic HTTP probes by location and transport result"
    );
    describe_counter!(
        PROBE_RETRIES_TOTAL,
        "Total number of probes re-issued after a transport failure"
    );

    describe_counter!(
        QUERY_SOFT_FAILURES_TOTAL,
        "Total number of cluster queries that failed and were treated as empty"
    );

    describe_counter!(SCENARIOS_TOTAL, "Total number of scenarios run by outcome");
    describe_counter!(
        SCENARIO_STEPS_TOTAL,
        "Total number of scenario steps executed by result"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        TOOL_INVOCATIONS_TOTAL,
        TOOL_INVOCATION_DURATION_SECONDS,
        CONVERGENCE_WAITS_TOTAL,
        CONVERGENCE_SAMPLES_TOTAL,
        CONVERGENCE_WAIT_DURATION_SECONDS,
        PROBES_TOTAL,
        PROBE_RETRIES_TOTAL,
        QUERY_SOFT_FAILURES_TOTAL,
        SCENARIOS_TOTAL,
        SCENARIO_STEPS_TOTAL,
    ];

    #[test]
    fn all_metrics_start_with_meshcheck_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("meshcheck_"),
                "Metric '{}' does not start with 'meshcheck_' prefix",
                name
            );
        }
    }

    #[test]
    fn metric_suffixes_follow_convention() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.ends_with("_total") || name.ends_with("_seconds"),
                "Metric '{}' must end with _total or _seconds",
                name
            );
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        for label in [
            LABEL_PHASE,
            LABEL_RESULT,
            LABEL_KIND,
            LABEL_LOCATION,
            LABEL_OUTCOME,
        ] {
            assert_eq!(label.to_lowercase(), label);
        }
    }

    #[test]
    fn long_operation_buckets_are_sorted() {
        let buckets = LONG_OPERATION_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }
}
