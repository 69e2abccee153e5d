//! 수렴 대기 (Convergence Poller)
//!
//! 환경마다 세 단계를 순서대로 통과해야 "settled"로 판정합니다.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ BulkSettle   │──►│ HealthGate   │──►│ AgentIdle    │
//! │ all_active   │   │ all_active   │   │ agents idle  │
//! │ 5 successes  │   │ fail on error│   │ fail on error│
//! │ 20 min       │   │ 5 min        │   │ 5 min        │
//! └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! 한 번의 샘플은 "새 스냅샷 조회 → 에러 조건 검사 → 준비 조건 검사 → 대기" 순서입니다.
//! 스냅샷 조회 자체도 단계 마감 시각을 넘기지 못하며, 넘기면 타임아웃으로 끝납니다.
//! 에러 조건이 성립하면 남은 재시도 없이 즉시 실패하고, 준비 조건은 연속으로
//! `successes`번 성립해야 합니다. 중간에 한 번이라도 실패하면 연속 횟수는 0으로 돌아갑니다.

use std::fmt;
use std::time::Duration;

use meshcheck_core::config::ConvergenceConfig;
use meshcheck_core::metrics as m;
use meshcheck_core::process::ProcessError;
use meshcheck_core::types::Environment;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ClusterError;
use crate::juju::JujuCli;
use crate::status::{ModelStatus, StatusPredicate, all_active, all_agents_idle, any_error};

/// 수렴 대기 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitPhase {
    /// 초기 롤아웃 중 흔들림을 허용하며 전체 active를 기다림
    BulkSettle,
    /// active를 다시 확인하되 에러는 즉시 실패
    HealthGate,
    /// 유닛 에이전트까지 idle이 될 때까지 기다림
    AgentIdle,
}

impl WaitPhase {
    /// 단계 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BulkSettle => "bulk settle",
            Self::HealthGate => "health gate",
            Self::AgentIdle => "agent idle",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::BulkSettle => "bulk_settle",
            Self::HealthGate => "health_gate",
            Self::AgentIdle => "agent_idle",
        }
    }
}

impl fmt::Display for WaitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 한 단계의 대기 정책
#[derive(Debug, Clone, Copy)]
pub struct SettlePolicy {
    /// 단계
    pub phase: WaitPhase,
    /// 준비 조건
    pub ready: StatusPredicate,
    /// 에러 조건 (성립 시 즉시 실패)
    pub error: Option<StatusPredicate>,
    /// 샘플 간 대기 시간
    pub delay: Duration,
    /// 요구하는 연속 성공 횟수
    pub successes: u32,
    /// 단계 타임아웃
    pub timeout: Duration,
}

impl SettlePolicy {
    /// 설정에서 세 단계 정책을 순서대로 만듭니다.
    pub fn phases(config: &ConvergenceConfig) -> [SettlePolicy; 3] {
        Self::phases_with_bulk_timeout(config, config.bulk_timeout())
    }

    /// 1단계 타임아웃만 바꾼 세 단계 정책을 만듭니다.
    pub fn phases_with_bulk_timeout(
        config: &ConvergenceConfig,
        bulk_timeout: Duration,
    ) -> [SettlePolicy; 3] {
        let delay = config.delay();
        [
            SettlePolicy {
                phase: WaitPhase::BulkSettle,
                ready: all_active,
                error: None,
                delay,
                successes: config.bulk_successes,
                timeout: bulk_timeout,
            },
            SettlePolicy {
                phase: WaitPhase::HealthGate,
                ready: all_active,
                error: Some(any_error),
                delay,
                successes: config.gate_successes,
                timeout: config.gate_timeout(),
            },
            SettlePolicy {
                phase: WaitPhase::AgentIdle,
                ready: all_agents_idle,
                error: Some(any_error),
                delay,
                successes: config.gate_successes,
                timeout: config.gate_timeout(),
            },
        ]
    }
}

/// 한 번의 대기 호출 대상 (환경 + 정책)
#[derive(Debug, Clone, Copy)]
pub struct ConvergenceTarget<'a> {
    /// 대상 환경
    pub env: &'a Environment,
    /// 대기 정책
    pub policy: SettlePolicy,
}

/// 환경 상태를 반복 샘플링하는 대기기
#[derive(Debug, Clone)]
pub struct ConvergencePoller {
    juju: JujuCli,
    config: ConvergenceConfig,
}

impl ConvergencePoller {
    /// 새 대기기를 생성합니다.
    pub fn new(juju: JujuCli, config: ConvergenceConfig) -> Self {
        Self { juju, config }
    }

    /// 대기 정책 설정
    pub fn config(&self) -> &ConvergenceConfig {
        &self.config
    }

    /// 각 환경에 대해 세 단계를 순서대로 통과할 때까지 기다립니다.
    pub async fn settle(&self, envs: &[&Environment]) -> Result<(), ClusterError> {
        self.settle_with_bulk_timeout(envs, self.config.bulk_timeout())
            .await
    }

    /// 1단계 타임아웃을 바꿔 [`settle`](Self::settle)을 수행합니다.
    pub async fn settle_with_bulk_timeout(
        &self,
        envs: &[&Environment],
        bulk_timeout: Duration,
    ) -> Result<(), ClusterError> {
        for env in envs {
            info!(model = env.name(), "waiting for model to settle");
            for policy in SettlePolicy::phases_with_bulk_timeout(&self.config, bulk_timeout) {
                self.wait(&ConvergenceTarget { env, policy }).await?;
            }
            info!(model = env.name(), "model settled");
        }
        Ok(())
    }

    /// 한 단계의 조건이 성립할 때까지 샘플링합니다.
    ///
    /// # Errors
    ///
    /// - `ConvergenceErrorDetected`: 에러 조건이 성립함 (남은 재시도 없이 즉시)
    /// - `ConvergenceTimeout`: 타임아웃까지 연속 성공 횟수를 채우지 못했거나
    ///   상태 조회가 마감 시각까지 끝나지 않음
    /// - `Process`: 상태 조회 명령을 시작하지 못함
    ///
    /// 상태 조회 명령의 일시적 실패(0이 아닌 종료 코드, 잘못된 JSON)는
    /// 준비되지 않은 샘플로 취급합니다.
    pub async fn wait(&self, target: &ConvergenceTarget<'_>) -> Result<ModelStatus, ClusterError> {
        let policy = &target.policy;
        let model = target.env.name();
        let started = Instant::now();
        let mut consecutive = 0u32;
        let mut last_status: String;

        debug!(
            model,
            phase = %policy.phase,
            successes = policy.successes,
            timeout_secs = policy.timeout.as_secs(),
            "convergence wait started"
        );

        let deadline = started + policy.timeout;
        loop {
            metrics::counter!(m::CONVERGENCE_SAMPLES_TOTAL).increment(1);

            match tokio::time::timeout_at(deadline, self.juju.status(target.env)).await {
                Err(_) => {
                    warn!(model, phase = %policy.phase, "status sample still running at phase deadline");
                    last_status = "status query did not return before the phase deadline".to_owned();
                    break;
                }
                Ok(Err(ClusterError::Process(ProcessError::Spawn { program, reason }))) => {
                    finish(policy.phase, "error", started);
                    return Err(ProcessError::Spawn { program, reason }.into());
                }
                Ok(Err(e)) => {
                    warn!(model, phase = %policy.phase, error = %e, "status sample failed");
                    consecutive = 0;
                    last_status = e.to_string();
                }
                Ok(Ok(status)) => {
                    if policy.error.is_some_and(|is_error| is_error(&status)) {
                        let detail = status.errors().join("; ");
                        finish(policy.phase, "error", started);
                        return Err(ClusterError::ConvergenceErrorDetected {
                            model: model.to_owned(),
                            phase: policy.phase,
                            detail,
                        });
                    }

                    if (policy.ready)(&status) {
                        consecutive += 1;
                        debug!(model, phase = %policy.phase, consecutive, "ready sample");
                        if consecutive >= policy.successes {
                            info!(
                                model,
                                phase = %policy.phase,
                                elapsed_secs = started.elapsed().as_secs(),
                                "convergence phase complete"
                            );
                            finish(policy.phase, "success", started);
                            return Ok(status);
                        }
                    } else {
                        if consecutive > 0 {
                            debug!(model, phase = %policy.phase, "ready streak broken");
                        }
                        consecutive = 0;
                    }
                    last_status = status.summary();
                }
            }

            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(policy.delay).await;
            if Instant::now() >= deadline {
                break;
            }
        }

        finish(policy.phase, "timeout", started);
        Err(ClusterError::ConvergenceTimeout {
            model: model.to_owned(),
            phase: policy.phase,
            timeout_secs: policy.timeout.as_secs(),
            last_status,
        })
    }
}

fn finish(phase: WaitPhase, result: &'static str, started: Instant) {
    metrics::counter!(
        m::CONVERGENCE_WAITS_TOTAL,
        m::LABEL_PHASE => phase.label(),
        m::LABEL_RESULT => result
    )
    .increment(1);
    metrics::histogram!(m::CONVERGENCE_WAIT_DURATION_SECONDS, m::LABEL_PHASE => phase.label())
        .record(started.elapsed().as_secs_f64());
}
