//! 클러스터 에러 타입
//!
//! [`ClusterError`]는 수렴 대기, juju CLI 호출, 클러스터 조회에서 발생하는 에러를 표현합니다.
//! 조회 실패(`Query`)는 정책 목록 조회 경로에서 로컬로 복구되고,
//! 나머지는 `MeshcheckError`로 변환되어 시나리오를 중단시킵니다.

use meshcheck_core::error::MeshcheckError;
use meshcheck_core::process::ProcessError;

use crate::poller::WaitPhase;

/// 클러스터 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// 단계의 조건이 타임아웃 전에 성립하지 않음
    #[error("model '{model}' did not reach {phase} within {timeout_secs}s (last status: {last_status})")]
    ConvergenceTimeout {
        /// 대상 모델
        model: String,
        /// 대기 단계
        phase: WaitPhase,
        /// 적용된 타임아웃 (초)
        timeout_secs: u64,
        /// 마지막으로 관측한 상태 요약
        last_status: String,
    },

    /// 대기 중 명시적인 에러 상태를 관측함
    #[error("error detected in model '{model}' during {phase}: {detail}")]
    ConvergenceErrorDetected {
        /// 대상 모델
        model: String,
        /// 대기 단계
        phase: WaitPhase,
        /// 에러 상태인 애플리케이션/유닛 목록
        detail: String,
    },

    /// 상태 조회 실패 (CLI 실패 또는 JSON 파싱 실패)
    #[error("failed to read status of model '{model}': {reason}")]
    Status {
        /// 대상 모델
        model: String,
        /// 실패 사유
        reason: String,
    },

    /// juju/kubectl 명령이 0이 아닌 종료 코드로 끝남
    #[error("'{command}' failed with exit code {exit_code}: {}", stderr.trim())]
    Command {
        /// 실행한 명령
        command: String,
        /// 종료 코드
        exit_code: i32,
        /// 표준 에러
        stderr: String,
    },

    /// 리소스 목록 조회 실패
    #[error("failed to list {resource} in namespace '{namespace}': {reason}")]
    Query {
        /// 리소스 종류 (plural.group)
        resource: String,
        /// 네임스페이스
        namespace: String,
        /// 실패 사유
        reason: String,
    },

    /// 로드밸런서 주소가 할당된 서비스가 없음
    #[error("no load balancer address found in namespace '{namespace}'")]
    NoGatewayAddress {
        /// 네임스페이스
        namespace: String,
    },

    /// 프로세스 실행 실패
    #[error(transparent)]
    Process(#[from] ProcessError),
}

impl From<ClusterError> for MeshcheckError {
    fn from(err: ClusterError) -> Self {
        match err {
            ClusterError::ConvergenceTimeout { .. }
            | ClusterError::ConvergenceErrorDetected { .. }
            | ClusterError::Status { .. } => MeshcheckError::Convergence(err.to_string()),
            ClusterError::Command { .. } => MeshcheckError::Tool(err.to_string()),
            ClusterError::Query { .. } | ClusterError::NoGatewayAddress { .. } => {
                MeshcheckError::Query(err.to_string())
            }
            ClusterError::Process(e) => MeshcheckError::Process(e),
        }
    }
}
